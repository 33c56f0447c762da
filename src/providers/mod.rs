pub mod gitlab;

#[cfg(test)]
pub mod testing;

use std::future::Future;

use crate::error::Result;

use gitlab::{BranchSelector, GitLabPipeline, GitLabProject};

/// Read-only access to a project-hosting API.
///
/// The refresher and the project cache only talk to the remote side through
/// this trait.
pub trait PipelineProvider: Send + Sync {
    /// Every project visible to the configured credentials.
    fn list_projects(&self) -> impl Future<Output = Result<Vec<GitLabProject>>> + Send;

    /// Recent pipelines of a project, newest first. `selectors` may be used as
    /// a server-side hint but the result is not guaranteed to be filtered.
    fn get_pipelines(
        &self,
        project_id: i64,
        selectors: &[BranchSelector],
    ) -> impl Future<Output = Result<Vec<GitLabPipeline>>> + Send;
}
