use console::{style, StyledObject};

use crate::providers::gitlab::PipelineStatus;

const BRANCH_LABEL_WIDTH: usize = 16;

/// Styling helpers for terminal output
pub fn bright(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright()
}

pub fn dim(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn bright_yellow(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn bright_green(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn magenta_bold(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

/// One-letter badge for a pipeline status, on a status-colored background.
pub fn status_badge(status: PipelineStatus) -> StyledObject<&'static str> {
    match status {
        PipelineStatus::Success => style(" S ").on_green().bold(),
        PipelineStatus::Failed => style(" F ").on_red().bold(),
        PipelineStatus::Running => style(" R ").on_blue(),
        PipelineStatus::Pending => style(" P ").on_yellow().black(),
        PipelineStatus::Canceled => style(" C ").on_black(),
        PipelineStatus::Skipped => style(" s ").on_black().bright(),
        PipelineStatus::Unknown => style(" U ").on_black().red().bright(),
    }
}

/// Branch label shortened to 16 characters, highlighted for long-lived
/// branches.
pub fn branch_label(branch: &str) -> StyledObject<String> {
    let label = if branch.chars().count() > BRANCH_LABEL_WIDTH {
        let head: String = branch.chars().take(BRANCH_LABEL_WIDTH).collect();
        format!("{head}...")
    } else {
        branch.to_string()
    };

    match branch {
        "master" | "main" | "release" => style(label).yellow().bright().bold(),
        "dev" | "develop" => style(label).blue().bright().bold(),
        _ => style(label),
    }
}
