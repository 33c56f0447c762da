use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::error::PipeboardError;
use crate::providers::gitlab::{BranchBucket, GitLabProject};

/// State of one configured project after a refresh cycle.
///
/// Serializes as the project fields followed by `branches` and `error`.
/// `error` and `branches` are exclusive: an erroring project has no branches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSnapshot {
    #[serde(flatten)]
    pub project: GitLabProject,
    #[serde(rename = "branches")]
    pub buckets: Vec<BranchBucket>,
    pub error: Option<String>,
}

impl ProjectSnapshot {
    pub fn ok(project: GitLabProject, buckets: Vec<BranchBucket>) -> Self {
        Self {
            project,
            buckets,
            error: None,
        }
    }

    pub fn failed(project: GitLabProject, error: &PipeboardError) -> Self {
        Self {
            project,
            buckets: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything one refresh cycle produced, in configured project order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// 1-based refresh cycle number, 0 before the first cycle completed
    pub cycle: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub projects: Vec<ProjectSnapshot>,
}

impl Dashboard {
    pub fn empty() -> Self {
        Self {
            cycle: 0,
            updated_at: None,
            projects: Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cycle > 0
    }
}

/// Read side of the published dashboard.
///
/// Each publication replaces the whole `Arc<Dashboard>`, so a reader holds
/// either the previous dashboard or the new one, never a mix. Reading never
/// waits for a refresh in progress.
#[derive(Debug, Clone)]
pub struct DashboardHandle {
    receiver: watch::Receiver<Arc<Dashboard>>,
}

impl DashboardHandle {
    pub(crate) fn channel() -> (watch::Sender<Arc<Dashboard>>, Self) {
        let (sender, receiver) = watch::channel(Arc::new(Dashboard::empty()));
        (sender, Self { receiver })
    }

    /// The latest published dashboard.
    pub fn current(&self) -> Arc<Dashboard> {
        Arc::clone(&self.receiver.borrow())
    }

    /// Waits for a dashboard this handle has not seen yet.
    ///
    /// Returns `None` once the refresher has stopped and the last dashboard
    /// was already seen.
    pub async fn next(&mut self) -> Option<Arc<Dashboard>> {
        self.receiver.changed().await.ok()?;
        Some(Arc::clone(&self.receiver.borrow_and_update()))
    }
}
