use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::providers::gitlab::{BranchSelector, ProjectRef};
use crate::refresher::WatchedProject;

pub const DEFAULT_PROTOCOL: &str = "https";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_VERSION: u32 = 4;
pub const DEFAULT_REFRESH_SECS: u64 = 30;
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:1111";
pub const DEFAULT_HISTORY: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WEB_DIR: &str = "/web";

const CANDIDATES: [&str; 4] = [
    "pipeboard.toml",
    "pipeboard.json",
    "pipeboard.yaml",
    "pipeboard.yml",
];

/// Configuration file structure.
///
/// Every value is optional: command-line flags and environment variables take
/// precedence, and built-in defaults fill whatever is left.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub gitlab: GitLabConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Projects to watch, appended after any CSV project lists
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabConfig {
    /// GitLab personal access token
    pub token: Option<String>,

    /// `http` or `https`
    pub protocol: Option<String>,

    /// GitLab host, optionally with a port
    pub host: Option<String>,

    /// REST API version
    pub api_version: Option<u32>,

    /// Per-request timeout in seconds
    pub timeout: Option<u64>,

    /// Accept self-signed certificates
    pub insecure: Option<bool>,

    /// List every visible project, not only memberships
    pub all_projects: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DashboardConfig {
    /// Refresh interval in seconds
    pub refresh: Option<u64>,

    /// Address of the JSON endpoint
    pub listen: Option<String>,

    /// Stop after this many dashboards
    pub count: Option<u64>,

    /// Pipelines shown per branch
    pub history: Option<usize>,

    /// Static front-end served under `/web/`
    pub web_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    pub namespace: String,
    pub name: String,
    /// Branch names or `*` patterns, first match wins
    #[serde(default)]
    pub branches: Vec<String>,
}

impl ProjectConfig {
    pub fn to_watched(&self) -> crate::error::Result<WatchedProject> {
        let selectors = self
            .branches
            .iter()
            .map(|branch| BranchSelector::parse(branch))
            .collect::<crate::error::Result<Vec<_>>>()?;

        Ok(WatchedProject::new(
            ProjectRef::new(&self.namespace, &self.name),
            selectors,
        ))
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path (must exist)
    /// 2. `./pipeboard.{toml,json,yaml,yml}`
    /// 3. `<config dir>/pipeboard/pipeboard.{toml,json,yaml,yml}`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let mut dirs = vec![PathBuf::from(".")];
        if let Some(config_dir) = dirs::config_dir() {
            dirs.push(config_dir.join("pipeboard"));
        }

        match dirs.iter().find_map(|dir| find_in(dir)) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    pub fn watched_projects(&self) -> Result<Vec<WatchedProject>> {
        self.projects
            .iter()
            .map(|project| {
                project.to_watched().with_context(|| {
                    format!("Invalid project {}/{}", project.namespace, project.name)
                })
            })
            .collect()
    }
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|candidate| dir.join(candidate))
        .find(|path| path.is_file())
}
