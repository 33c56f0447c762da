use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use log::{debug, info};
use url::Url;

use crate::error::{PipeboardError, Result};
use crate::providers::gitlab::{BranchSelector, ProjectRef};
use crate::refresher::WatchedProject;

/// Where a project list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSource {
    Http(Url),
    File(PathBuf),
}

impl ProjectSource {
    /// `http://` and `https://` are fetched; `file:/path` and plain paths are
    /// read from disk.
    pub fn parse(source: &str) -> Result<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            let url = Url::parse(source)
                .map_err(|e| PipeboardError::Config(format!("Invalid project list URL: {e}")))?;
            return Ok(Self::Http(url));
        }

        let path = source.strip_prefix("file:").unwrap_or(source);
        Ok(Self::File(PathBuf::from(path)))
    }

    pub async fn load(&self, http: &reqwest::Client) -> Result<Vec<WatchedProject>> {
        match self {
            Self::Http(url) => {
                debug!("Fetching project list from {url}");
                let body = http
                    .get(url.clone())
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                parse_csv(body.as_bytes())
            }
            Self::File(path) => {
                debug!("Reading project list from {}", path.display());
                parse_csv(File::open(path)?)
            }
        }
    }
}

/// Parses a `namespace,project,branches` CSV project list.
///
/// The first row is a header and is skipped. `branches` holds
/// whitespace-separated selectors. Every row must have exactly three fields.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<WatchedProject>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut projects = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = index + 1;

        if record.len() != 3 || record[0].is_empty() || record[1].is_empty() {
            return Err(PipeboardError::Config(format!("line {line} is not valid")));
        }
        if index == 0 {
            continue;
        }

        let selectors = BranchSelector::parse_list(&record[2])?;
        projects.push(WatchedProject::new(
            ProjectRef::new(&record[0], &record[1]),
            selectors,
        ));
    }

    Ok(projects)
}

/// Collects watched projects from every source in order, then from the inline
/// CSV text (the `GITLAB_PROJECTS_CSV` environment variable).
pub async fn load_projects(
    sources: &[String],
    inline_csv: Option<&str>,
    http: &reqwest::Client,
) -> Result<Vec<WatchedProject>> {
    let mut projects = Vec::new();

    for source in sources {
        let loaded = ProjectSource::parse(source)?.load(http).await?;
        info!("Loaded {} projects from {source}", loaded.len());
        projects.extend(loaded);
    }

    if let Some(csv) = inline_csv {
        let loaded = parse_csv(csv.as_bytes())?;
        info!("Loaded {} projects from environment", loaded.len());
        projects.extend(loaded);
    }

    Ok(projects)
}
