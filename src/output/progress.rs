use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::dashboard::Dashboard;

use super::styling::{bright_green, bright_yellow};

/// Spinner shown while the first refresh cycle runs.
pub struct RefreshProgress {
    pb: ProgressBar,
}

impl RefreshProgress {
    pub fn start(project_count: usize) -> Self {
        let pb = create_spinner(
            bright_yellow(format!("Fetching pipelines for {project_count} projects")).to_string(),
        );
        Self { pb }
    }

    pub fn finish(self, dashboard: &Dashboard) {
        let failed = dashboard.projects.iter().filter(|p| p.is_failed()).count();
        self.pb.finish_with_message(
            bright_green(format!(
                "Fetched {} projects ({failed} failed) ✓",
                dashboard.projects.len()
            ))
            .to_string(),
        );
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
