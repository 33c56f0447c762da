use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{PipeboardError, Result};

use super::gitlab::{
    BranchSelector, GitLabNamespace, GitLabPipeline, GitLabProject, GitLabUser, PipelineStatus,
};
use super::PipelineProvider;

pub fn project(id: i64, namespace: &str, name: &str) -> GitLabProject {
    GitLabProject {
        id,
        name: name.to_string(),
        description: None,
        web_url: format!("https://gitlab.example.com/{namespace}/{name}"),
        namespace: GitLabNamespace {
            id: 1,
            name: namespace.to_string(),
        },
    }
}

pub fn pipeline(id: i64, branch: &str, status: PipelineStatus) -> GitLabPipeline {
    GitLabPipeline {
        id,
        status,
        ref_: branch.to_string(),
        created_at: None,
        updated_at: None,
        started_at: None,
        finished_at: None,
        duration: Some(60.0),
        user: Some(GitLabUser {
            id: Some(1),
            name: "Jane Doe".to_string(),
            username: "jdoe".to_string(),
            web_url: None,
            avatar_url: None,
        }),
        web_url: None,
    }
}

/// In-memory provider that records how often it is called.
#[derive(Default)]
pub struct FakeProvider {
    projects: Mutex<Vec<GitLabProject>>,
    pipelines: Mutex<HashMap<i64, Vec<GitLabPipeline>>>,
    failing_projects: Mutex<HashSet<i64>>,
    fail_listing: AtomicBool,
    list_calls: AtomicUsize,
    pipeline_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(projects: Vec<GitLabProject>) -> Self {
        Self {
            projects: Mutex::new(projects),
            ..Self::default()
        }
    }

    pub fn with_pipelines(self, project_id: i64, pipelines: Vec<GitLabPipeline>) -> Self {
        self.pipelines
            .lock()
            .unwrap()
            .insert(project_id, pipelines);
        self
    }

    pub fn set_projects(&self, projects: Vec<GitLabProject>) {
        *self.projects.lock().unwrap() = projects;
    }

    pub fn set_listing_fails(&self, fails: bool) {
        self.fail_listing.store(fails, Ordering::SeqCst);
    }

    pub fn fail_pipelines_for(&self, project_id: i64) {
        self.failing_projects.lock().unwrap().insert(project_id);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn pipeline_calls(&self) -> usize {
        self.pipeline_calls.load(Ordering::SeqCst)
    }
}

impl PipelineProvider for FakeProvider {
    async fn list_projects(&self) -> Result<Vec<GitLabProject>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(PipeboardError::Api {
                status: 503,
                message: "503 Service Unavailable".to_string(),
            });
        }
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn get_pipelines(
        &self,
        project_id: i64,
        _selectors: &[BranchSelector],
    ) -> Result<Vec<GitLabPipeline>> {
        self.pipeline_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_projects.lock().unwrap().contains(&project_id) {
            return Err(PipeboardError::Api {
                status: 500,
                message: "500 Internal Server Error".to_string(),
            });
        }
        Ok(self
            .pipelines
            .lock()
            .unwrap()
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }
}
