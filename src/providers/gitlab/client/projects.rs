use log::debug;

use super::core::{GitLabClient, PAGE_SIZE};
use crate::error::Result;
use crate::providers::gitlab::types::GitLabProject;

impl GitLabClient {
    /// Fetch the projects of the token's user, following `X-Next-Page` until
    /// the listing is exhausted.
    ///
    /// Only projects the user is a member of are listed unless the client was
    /// built with `all_projects`. Either way the `simple` representation is
    /// requested, which carries every field the dashboard reads.
    pub async fn list_projects(&self) -> Result<Vec<GitLabProject>> {
        let mut all_projects = Vec::new();
        let mut page: u32 = 1;

        loop {
            let query = projects_query(page, self.all_projects);

            let (projects, next_page): (Vec<GitLabProject>, _) =
                self.get_page("projects", &query).await?;

            debug!("Fetched {} projects from page {page}", projects.len());
            all_projects.extend(projects);

            match next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(all_projects)
    }
}

fn projects_query(page: u32, all_projects: bool) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("per_page", PAGE_SIZE.to_string()),
        ("page", page.to_string()),
        ("simple", "true".to_string()),
    ];
    if !all_projects {
        query.push(("membership", "true".to_string()));
    }
    query
}
