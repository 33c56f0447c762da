use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipeboardError {
    #[error("Project {0} does not exist")]
    ProjectNotFound(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipeboardError {
    /// True for failures talking to the remote API, as opposed to a missing
    /// project or a configuration problem.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Network(_) | Self::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, PipeboardError>;
