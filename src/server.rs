use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use log::info;
use serde::{Serialize, Serializer};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::dashboard::{Dashboard, DashboardHandle};
use crate::refresher::StopSignal;

/// The project list of a published dashboard, serialized without copying it.
struct ProjectsView(Arc<Dashboard>);

impl Serialize for ProjectsView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.projects.serialize(serializer)
    }
}

struct DashboardView(Arc<Dashboard>);

impl Serialize for DashboardView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

/// Routes:
/// - `GET /` the project list of the latest dashboard
/// - `GET /dashboard` the latest dashboard with its cycle number and build time
/// - `GET /health` liveness probe
/// - `GET /web/*` static files from `web_dir` (the browser front-end)
pub fn router(handle: DashboardHandle, web_dir: &Path) -> Router {
    Router::new()
        .route("/", get(projects))
        .route("/dashboard", get(dashboard))
        .route("/health", get(|| async { "ok" }))
        .nest_service("/web", ServeDir::new(web_dir))
        .with_state(handle)
}

async fn projects(State(handle): State<DashboardHandle>) -> Json<ProjectsView> {
    Json(ProjectsView(handle.current()))
}

async fn dashboard(State(handle): State<DashboardHandle>) -> Json<DashboardView> {
    Json(DashboardView(handle.current()))
}

pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to listen on {addr}"))
}

/// Serves `app` until `stop` fires.
pub async fn serve(listener: TcpListener, app: Router, stop: StopSignal) -> Result<()> {
    info!("Serving dashboard JSON on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { stop.stopped().await })
        .await
        .context("HTTP server failed")
}
