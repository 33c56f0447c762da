use std::fmt::Write;

use chrono::Local;
use comfy_table::Cell;
use log::debug;

use crate::dashboard::{Dashboard, DashboardHandle, ProjectSnapshot};
use crate::providers::gitlab::{BranchBucket, PipelineStatus};

use super::progress::RefreshProgress;
use super::styling::{branch_label, bright, dim, status_badge};
use super::tables::{create_cyan_header, create_table, error_cell};

/// Renders a dashboard as text: status legend, one row per branch, and the
/// time the dashboard was built.
///
/// `history` caps the number of badges shown per branch; the dashboard itself
/// keeps every pipeline the API returned.
pub fn render_dashboard(dashboard: &Dashboard, history: usize) -> String {
    let mut output = String::new();

    render_legend(&mut output);

    if !dashboard.is_ready() {
        let _ = writeln!(output, "{}", dim("Waiting for the first refresh..."));
        return output;
    }

    let mut table = create_table();
    table.set_header(create_cyan_header(&[
        "Project",
        "Branch",
        "Latest",
        "Triggered by",
        "History",
    ]));

    for snapshot in &dashboard.projects {
        add_project_rows(&mut table, snapshot, history);
    }

    let _ = writeln!(output, "{table}");

    if let Some(updated_at) = dashboard.updated_at {
        let _ = writeln!(
            output,
            "\n{} {}",
            bright("Updated:"),
            updated_at.with_timezone(&Local).format("%b %e %H:%M:%S")
        );
    }

    output
}

fn render_legend(output: &mut String) {
    let _ = writeln!(output, "{}", bright("Legend:").underlined());
    let statuses = PipelineStatus::ALL
        .into_iter()
        .filter(|status| *status != PipelineStatus::Unknown);
    for status in statuses {
        let _ = writeln!(output, "\t{:<10} {}", status.as_str(), status_badge(status));
    }
    let _ = writeln!(output);
}

fn add_project_rows(table: &mut comfy_table::Table, snapshot: &ProjectSnapshot, history: usize) {
    let project_name = snapshot.project.name_with_namespace();

    if let Some(error) = &snapshot.error {
        table.add_row(vec![
            Cell::new(&project_name),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
            error_cell(error),
        ]);
        return;
    }

    for bucket in &snapshot.buckets {
        table.add_row(bucket_row(&project_name, bucket, history));
    }
}

fn bucket_row(project_name: &str, bucket: &BranchBucket, history: usize) -> Vec<Cell> {
    let branch = Cell::new(branch_label(&bucket.label));

    let Some(latest) = bucket.pipelines.first() else {
        return vec![
            Cell::new(project_name),
            branch,
            Cell::new(status_badge(PipelineStatus::Unknown)),
            Cell::new("-"),
            Cell::new(dim("<no pipelines>")),
        ];
    };

    let older = bucket
        .pipelines
        .iter()
        .skip(1)
        .take(history.saturating_sub(1))
        .map(|pipeline| status_badge(pipeline.status).to_string())
        .collect::<String>();

    vec![
        Cell::new(project_name),
        branch,
        Cell::new(status_badge(latest.status)),
        Cell::new(latest.user_name().unwrap_or("-")),
        Cell::new(older),
    ]
}

/// Redraws the terminal every time a new dashboard is published.
///
/// Returns once the refresher has stopped and its last dashboard was drawn.
pub async fn run_terminal(mut handle: DashboardHandle, history: usize, project_count: usize) {
    let term = console::Term::stdout();
    let mut progress = Some(RefreshProgress::start(project_count));

    while let Some(dashboard) = handle.next().await {
        if let Some(progress) = progress.take() {
            progress.finish(&dashboard);
        }
        if let Err(err) = term.clear_screen() {
            debug!("Failed to clear terminal: {err}");
        }
        println!("{}", render_dashboard(&dashboard, history));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipeboardError;
    use crate::providers::gitlab::{filter_pipelines, BranchSelector, GitLabProject, ProjectRef};
    use crate::providers::testing::{pipeline, project};
    use chrono::Utc;

    fn dashboard() -> Dashboard {
        let selectors = BranchSelector::parse_list("master develop features/*").unwrap();
        let pipelines = vec![
            pipeline(6, "master", PipelineStatus::Failed),
            pipeline(5, "features/x", PipelineStatus::Running),
            pipeline(4, "master", PipelineStatus::Success),
            pipeline(3, "master", PipelineStatus::Canceled),
            pipeline(2, "master", PipelineStatus::Skipped),
        ];

        Dashboard {
            cycle: 1,
            updated_at: Some(Utc::now()),
            projects: vec![
                ProjectSnapshot::ok(
                    project(1, "our-namespace", "cool-project"),
                    filter_pipelines(pipelines, &selectors),
                ),
                ProjectSnapshot::failed(
                    GitLabProject::placeholder(&ProjectRef::new("your-namespace", "dead-project")),
                    &PipeboardError::ProjectNotFound("your-namespace/dead-project".to_string()),
                ),
            ],
        }
    }

    #[test]
    fn test_render_rows_per_branch() {
        console::set_colors_enabled(false);
        let output = render_dashboard(&dashboard(), 3);

        assert!(output.contains("Legend:"));
        assert!(output.contains("success    "));
        assert!(output.contains("our-namespace/cool-project"));
        assert!(output.contains("features/x"));
        assert!(output.contains("Jane Doe"));
        assert!(output.contains("<no pipelines>"));
        assert!(output.contains("Project your-namespace/dead-project does not exist"));
        assert!(output.contains("Updated:"));
    }

    #[test]
    fn test_history_limits_badges() {
        console::set_colors_enabled(false);
        let snapshot = &dashboard().projects[0];
        let master = snapshot
            .buckets
            .iter()
            .find(|b| b.label == "master")
            .unwrap();

        let row = bucket_row("p", master, 3);
        assert_eq!(row[4].content(), " S  C ");

        let row = bucket_row("p", master, 1);
        assert_eq!(row[2].content(), " F ");
        assert_eq!(row[4].content(), "");
    }

    #[test]
    fn test_legend_lists_concrete_statuses_only() {
        console::set_colors_enabled(false);
        let mut legend = String::new();
        render_legend(&mut legend);

        assert_eq!(legend.lines().filter(|line| line.starts_with('\t')).count(), 6);
        for status in ["success", "failed", "running", "pending", "canceled", "skipped"] {
            assert!(legend.contains(status), "legend is missing {status}");
        }
        assert!(!legend.contains("unknown"));
    }

    #[test]
    fn test_render_before_first_refresh() {
        console::set_colors_enabled(false);
        let output = render_dashboard(&Dashboard::empty(), 5);
        assert!(output.contains("Waiting for the first refresh"));
        assert!(!output.contains("Updated:"));
    }
}
