use std::collections::HashMap;

use log::{debug, info, warn};

use crate::error::{PipeboardError, Result};
use crate::providers::PipelineProvider;

use super::types::{GitLabProject, ProjectRef};

/// Outcome of resolving a project reference.
///
/// Always carries a usable project: on failure it is a placeholder with
/// `id == -1`, so callers can still label the failing row.
#[derive(Debug)]
pub struct Resolution {
    pub project: GitLabProject,
    pub error: Option<PipeboardError>,
}

impl Resolution {
    fn resolved(project: GitLabProject) -> Self {
        Self {
            project,
            error: None,
        }
    }

    fn unresolved(project_ref: &ProjectRef, error: PipeboardError) -> Self {
        Self {
            project: GitLabProject::placeholder(project_ref),
            error: Some(error),
        }
    }
}

/// Project metadata cache keyed by `namespace/name`.
///
/// Filled from a full project listing. A miss triggers a complete refill that
/// replaces every entry; a failed listing leaves the previous contents alone.
#[derive(Debug, Default)]
pub struct ProjectCache {
    projects: HashMap<String, GitLabProject>,
}

impl ProjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, project_ref: &ProjectRef) -> Option<&GitLabProject> {
        self.projects.get(&project_ref.key())
    }

    /// Resolves a project reference, refilling the cache on a miss.
    ///
    /// # Errors
    ///
    /// The returned `Resolution` carries:
    /// - the listing failure when the refill could not be fetched
    /// - `ProjectNotFound` when the refreshed listing does not contain it
    pub async fn resolve<P>(&mut self, provider: &P, project_ref: &ProjectRef) -> Resolution
    where
        P: PipelineProvider,
    {
        if let Some(project) = self.get(project_ref) {
            debug!("Cache hit for project {project_ref}");
            return Resolution::resolved(project.clone());
        }

        if let Err(err) = self.refill(provider).await {
            warn!("Failed to list projects while resolving {project_ref}: {err}");
            return Resolution::unresolved(project_ref, err);
        }

        match self.get(project_ref) {
            Some(project) => Resolution::resolved(project.clone()),
            None => Resolution::unresolved(
                project_ref,
                PipeboardError::ProjectNotFound(project_ref.key()),
            ),
        }
    }

    /// Replaces the whole cache with a fresh listing.
    pub async fn refill<P>(&mut self, provider: &P) -> Result<usize>
    where
        P: PipelineProvider,
    {
        let projects = provider.list_projects().await?;

        self.projects = projects
            .into_iter()
            .map(|project| (project.name_with_namespace(), project))
            .collect();

        info!("Cached {} projects", self.projects.len());

        Ok(self.projects.len())
    }
}
