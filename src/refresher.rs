use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::{watch, Notify};

use crate::dashboard::{Dashboard, DashboardHandle, ProjectSnapshot};
use crate::error::{PipeboardError, Result};
use crate::providers::gitlab::{
    attach_pipeline_urls, filter_pipelines, BranchSelector, ProjectCache, ProjectRef, Resolution,
};
use crate::providers::PipelineProvider;

/// A project to watch and the branches to show for it.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchedProject {
    pub project_ref: ProjectRef,
    pub selectors: Vec<BranchSelector>,
}

impl WatchedProject {
    pub fn new(project_ref: ProjectRef, selectors: Vec<BranchSelector>) -> Self {
        Self {
            project_ref,
            selectors,
        }
    }
}

/// Cooperative stop request for the refresh loop.
///
/// Clones share state. The loop checks it between cycles and wakes from its
/// inter-cycle sleep when it fires; an in-flight fetch is left to finish.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Resolves once `stop` has been called.
    pub async fn stopped(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }

    /// Sleeps for `duration` unless stopped first. Returns whether the signal
    /// fired.
    pub async fn sleep(&self, duration: Duration) -> bool {
        let notified = self.notify.notified();
        if self.is_stopped() {
            return true;
        }
        tokio::select! {
            () = tokio::time::sleep(duration) => self.is_stopped(),
            () = notified => true,
        }
    }
}

/// Owns the project cache and drives refresh cycles.
///
/// The refresher is the only writer of both the cache and the published
/// dashboard; readers go through a [`DashboardHandle`].
pub struct Refresher<P> {
    provider: P,
    cache: ProjectCache,
    projects: Vec<WatchedProject>,
    publisher: watch::Sender<Arc<Dashboard>>,
    cycle: u64,
}

impl<P> Refresher<P>
where
    P: PipelineProvider,
{
    /// Creates a refresher and the handle readers use to observe it.
    ///
    /// # Errors
    ///
    /// Returns `Config` when no project is configured.
    pub fn new(provider: P, projects: Vec<WatchedProject>) -> Result<(Self, DashboardHandle)> {
        if projects.is_empty() {
            return Err(PipeboardError::Config("missing input".to_string()));
        }

        let (publisher, handle) = DashboardHandle::channel();

        Ok((
            Self {
                provider,
                cache: ProjectCache::new(),
                projects,
                publisher,
                cycle: 0,
            },
            handle,
        ))
    }

    /// Runs one refresh cycle over every configured project.
    ///
    /// Failures stay with the project they belong to: a missing project or a
    /// failed pipeline fetch produces an error snapshot, never an early return.
    /// Projects are resolved one after the other (the cache has a single
    /// writer), then their pipelines are fetched concurrently. The result is in
    /// configured order.
    pub async fn refresh_once(&mut self) -> Vec<ProjectSnapshot> {
        if self.cache.is_empty() {
            debug!("Project cache is empty, listing all projects");
        }

        let mut resolutions = Vec::with_capacity(self.projects.len());
        for watched in &self.projects {
            resolutions.push(self.cache.resolve(&self.provider, &watched.project_ref).await);
        }

        let provider = &self.provider;
        let fetches = self
            .projects
            .iter()
            .zip(resolutions)
            .map(|(watched, resolution)| Self::snapshot(provider, watched, resolution));

        futures::future::join_all(fetches).await
    }

    async fn snapshot(
        provider: &P,
        watched: &WatchedProject,
        resolution: Resolution,
    ) -> ProjectSnapshot {
        let Resolution { project, error } = resolution;

        if let Some(err) = error {
            if err.is_transport() {
                warn!("Failed to resolve project {}: {err}", watched.project_ref);
            } else {
                info!("Skipping project {}: {err}", watched.project_ref);
            }
            return ProjectSnapshot::failed(project, &err);
        }

        match provider.get_pipelines(project.id, &watched.selectors).await {
            Ok(mut pipelines) => {
                debug!(
                    "Fetched {} pipelines for {}",
                    pipelines.len(),
                    watched.project_ref
                );
                attach_pipeline_urls(&project, &mut pipelines);
                let buckets = filter_pipelines(pipelines, &watched.selectors);
                ProjectSnapshot::ok(project, buckets)
            }
            Err(err) => {
                warn!(
                    "Failed to fetch pipelines for {}: {err}",
                    watched.project_ref
                );
                ProjectSnapshot::failed(project, &err)
            }
        }
    }

    /// Publishes a finished cycle as one atomic replacement of the dashboard.
    pub fn publish(&mut self, projects: Vec<ProjectSnapshot>) -> Arc<Dashboard> {
        self.cycle += 1;

        let dashboard = Arc::new(Dashboard {
            cycle: self.cycle,
            updated_at: Some(Utc::now()),
            projects,
        });

        self.publisher.send_replace(Arc::clone(&dashboard));
        dashboard
    }

    /// Refreshes immediately, then every `interval`, until `stop` fires or
    /// `max_cycles` dashboards have been published.
    ///
    /// Readers see the channel close when this returns.
    pub async fn run(mut self, interval: Duration, max_cycles: Option<u64>, stop: StopSignal) {
        info!(
            "Watching {} projects, refreshing every {}s",
            self.projects.len(),
            interval.as_secs()
        );

        loop {
            if stop.is_stopped() {
                info!("Refresh loop stopped");
                break;
            }

            let projects = self.refresh_once().await;
            let failed = projects.iter().filter(|p| p.is_failed()).count();
            let dashboard = self.publish(projects);

            info!(
                "Refresh cycle {} published ({} projects, {failed} failed, {} cached)",
                dashboard.cycle,
                dashboard.projects.len(),
                self.cache.len()
            );

            if max_cycles.is_some_and(|max| self.cycle >= max) {
                info!("Reached {} refresh cycles, stopping", self.cycle);
                break;
            }

            if stop.sleep(interval).await {
                info!("Refresh loop stopped");
                break;
            }
        }
    }
}
