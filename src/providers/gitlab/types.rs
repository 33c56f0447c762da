use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a configured project: `namespace/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectRef {
    pub namespace: String,
    pub name: String,
}

impl ProjectRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Cache and display key (e.g., "group/project")
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitLabNamespace {
    pub id: i64,
    pub name: String,
}

/// A GitLab project as returned by `GET /projects`.
///
/// A project with `id == -1` is a placeholder for a reference that could not
/// be resolved; it still carries the namespace and name so it can be labeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitLabProject {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub web_url: String,
    pub namespace: GitLabNamespace,
}

impl GitLabProject {
    pub const UNRESOLVED_ID: i64 = -1;

    pub fn placeholder(project_ref: &ProjectRef) -> Self {
        Self {
            id: Self::UNRESOLVED_ID,
            name: project_ref.name.clone(),
            description: None,
            web_url: String::new(),
            namespace: GitLabNamespace {
                id: Self::UNRESOLVED_ID,
                name: project_ref.namespace.clone(),
            },
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == Self::UNRESOLVED_ID
    }

    pub fn project_ref(&self) -> ProjectRef {
        ProjectRef::new(&self.namespace.name, &self.name)
    }

    pub fn name_with_namespace(&self) -> String {
        self.project_ref().key()
    }
}

/// Pipeline status. Statuses this dashboard has no badge for map to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Failed,
    Running,
    Pending,
    Canceled,
    Skipped,
    #[serde(other)]
    Unknown,
}

impl PipelineStatus {
    pub const ALL: [Self; 7] = [
        Self::Success,
        Self::Failed,
        Self::Running,
        Self::Pending,
        Self::Canceled,
        Self::Skipped,
        Self::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Running => "running",
            Self::Pending => "pending",
            Self::Canceled => "canceled",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitLabUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A GitLab CI/CD pipeline run as returned by `GET /projects/:id/pipelines`.
///
/// Running and pending pipelines have no duration or finish time yet, so all
/// timing fields are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitLabPipeline {
    pub id: i64,
    pub status: PipelineStatus,
    /// Git reference that triggered the pipeline (e.g., "main", "features/x")
    #[serde(rename = "ref")]
    pub ref_: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Total pipeline duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub user: Option<GitLabUser>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl GitLabPipeline {
    /// Display name of the user who triggered the pipeline, if known.
    pub fn user_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|u| u.name.as_str())
            .filter(|name| !name.is_empty())
    }
}
