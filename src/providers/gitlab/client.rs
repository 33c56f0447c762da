mod core;
mod pipelines;
mod projects;

pub use self::core::{GitLabClient, GitLabSettings};

use crate::error::Result;
use crate::providers::PipelineProvider;

use super::branches::BranchSelector;
use super::types::{GitLabPipeline, GitLabProject};

impl PipelineProvider for GitLabClient {
    async fn list_projects(&self) -> Result<Vec<GitLabProject>> {
        GitLabClient::list_projects(self).await
    }

    async fn get_pipelines(
        &self,
        project_id: i64,
        selectors: &[BranchSelector],
    ) -> Result<Vec<GitLabPipeline>> {
        self.fetch_pipelines(project_id, selectors).await
    }
}
