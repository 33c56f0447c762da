use super::core::{GitLabClient, PAGE_SIZE};
use crate::error::Result;
use crate::providers::gitlab::branches::BranchSelector;
use crate::providers::gitlab::types::GitLabPipeline;

impl GitLabClient {
    /// Fetch the most recent pipelines of a project, newest first.
    ///
    /// `selectors` are only a hint: a single literal selector is forwarded as
    /// the `ref` filter, everything else fetches unfiltered. Callers must still
    /// filter locally.
    pub async fn fetch_pipelines(
        &self,
        project_id: i64,
        selectors: &[BranchSelector],
    ) -> Result<Vec<GitLabPipeline>> {
        let mut query = vec![
            ("per_page", PAGE_SIZE.to_string()),
            ("order_by", "id".to_string()),
            ("sort", "desc".to_string()),
        ];

        if let [BranchSelector::Literal(branch)] = selectors {
            query.push(("ref", branch.clone()));
        }

        self.get_json(&format!("projects/{project_id}/pipelines"), &query)
            .await
    }
}
