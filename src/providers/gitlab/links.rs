use super::types::{GitLabPipeline, GitLabProject};

/// Builds a clickable web URL for a pipeline of a project.
///
/// # Arguments
///
/// * `project_url` - Project web URL (e.g., <https://gitlab.com/group/project>)
/// * `pipeline_id` - Numeric pipeline ID
///
/// # Returns
///
/// Clickable URL to the pipeline (e.g., <https://gitlab.com/group/project/pipelines/123>)
pub fn pipeline_url(project_url: &str, pipeline_id: i64) -> String {
    format!("{}/pipelines/{pipeline_id}", project_url.trim_end_matches('/'))
}

/// Fills in `web_url` for pipelines the API returned without one.
pub fn attach_pipeline_urls(project: &GitLabProject, pipelines: &mut [GitLabPipeline]) {
    if project.is_placeholder() || project.web_url.is_empty() {
        return;
    }
    for pipeline in pipelines.iter_mut().filter(|p| p.web_url.is_none()) {
        pipeline.web_url = Some(pipeline_url(&project.web_url, pipeline.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::{pipeline, project};
    use crate::providers::gitlab::types::PipelineStatus;

    #[test]
    fn test_pipeline_url() {
        let url = pipeline_url("https://gitlab.com/group/project", 123456);
        assert_eq!(url, "https://gitlab.com/group/project/pipelines/123456");
    }

    #[test]
    fn test_pipeline_url_trailing_slash() {
        let url = pipeline_url("https://gitlab.com/group/project/", 7);
        assert_eq!(url, "https://gitlab.com/group/project/pipelines/7");
    }

    #[test]
    fn test_attach_keeps_existing_urls() {
        let project = project(1, "group", "project");
        let mut existing = pipeline(2, "master", PipelineStatus::Success);
        existing.web_url = Some("https://elsewhere/2".to_string());
        let mut pipelines = vec![pipeline(1, "master", PipelineStatus::Success), existing];

        attach_pipeline_urls(&project, &mut pipelines);

        assert_eq!(
            pipelines[0].web_url.as_deref(),
            Some("https://gitlab.example.com/group/project/pipelines/1")
        );
        assert_eq!(pipelines[1].web_url.as_deref(), Some("https://elsewhere/2"));
    }
}
