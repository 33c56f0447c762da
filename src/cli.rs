use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info};

use crate::auth::Token;
use crate::config::{
    Config, DEFAULT_API_VERSION, DEFAULT_HISTORY, DEFAULT_HOST, DEFAULT_LISTEN_ADDR,
    DEFAULT_PROTOCOL, DEFAULT_REFRESH_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_WEB_DIR,
};
use crate::inputs;
use crate::output;
use crate::providers::gitlab::{GitLabClient, GitLabSettings};
use crate::refresher::{Refresher, StopSignal};
use crate::server;

const CSV_HELP: &str = r#"CSV:
    Pass project lists as arguments (paths, file:/ paths or http(s) URLs)
    or put the CSV itself into GITLAB_PROJECTS_CSV.

CSV example:
    namespace,project,branches
    "our-namespace","cool-project","master dev features/*"
    "my-namespace","swag-project","develop features/*"
    "your-namespace","dead-project","master""#;

#[derive(Parser)]
#[command(name = "pipeboard")]
#[command(author, version, about = "Dashboard for your pipelines running in GitLab", long_about = None)]
#[command(after_help = CSV_HELP)]
pub struct Cli {
    /// Project lists (CSV files, file:/ paths or http(s) URLs)
    sources: Vec<String>,

    /// GitLab access token (mandatory)
    #[arg(short, long, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitLab protocol [default: https]
    #[arg(long, env = "GITLAB_PROTOCOL")]
    protocol: Option<String>,

    /// GitLab host [default: 127.0.0.1]
    #[arg(long, env = "GITLAB_HOST")]
    host: Option<String>,

    /// GitLab API version [default: 4]
    #[arg(long, env = "GITLAB_API_VERSION")]
    api_version: Option<u32>,

    /// Refresh interval in seconds [default: 30]
    #[arg(short, long, env = "REFRESH_INTERVAL", value_parser = clap::value_parser!(u64).range(1..))]
    refresh: Option<u64>,

    /// Serve the dashboard JSON on this address [default: 0.0.0.0:1111]
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Stop after this many dashboards; zero or negative runs forever
    #[arg(long, env = "COUNT", allow_negative_numbers = true)]
    count: Option<i64>,

    /// Pipelines shown per branch [default: 5]
    #[arg(long, env = "HISTORY")]
    history: Option<usize>,

    /// Per-request timeout in seconds [default: 30]
    #[arg(long, env = "GITLAB_TIMEOUT")]
    timeout: Option<u64>,

    /// Accept invalid TLS certificates from the GitLab host
    #[arg(long)]
    insecure: bool,

    /// Resolve projects among every visible project, not only memberships
    #[arg(long)]
    all_projects: bool,

    /// Static front-end served under /web/ [default: /web]
    #[arg(long, env = "WEB_DIR")]
    web_dir: Option<PathBuf>,

    /// Configuration file (toml, json or yaml)
    #[arg(short, long, env = "PIPEBOARD_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "GITLAB_PROJECTS_CSV", hide = true)]
    projects_csv: Option<String>,
}

/// Runtime settings after merging flags, environment, config file and
/// defaults, in that order of precedence.
#[derive(Debug, Clone)]
pub struct Settings {
    pub gitlab: GitLabSettings,
    pub refresh: Duration,
    pub listen: String,
    pub count: Option<u64>,
    pub history: usize,
    pub web_dir: PathBuf,
}

impl Cli {
    pub fn settings(&self, config: &Config) -> Result<Settings> {
        let file = &config.gitlab;

        let token = self
            .token
            .clone()
            .or_else(|| file.token.clone())
            .map(Token::from)
            .filter(|token| !token.is_blank())
            .context("token is not set (re-run with -h)")?;

        let protocol = self
            .protocol
            .clone()
            .or_else(|| file.protocol.clone())
            .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string());
        if protocol != "http" && protocol != "https" {
            bail!("unsupported protocol {protocol:?}, expected http or https");
        }

        let host = self
            .host
            .clone()
            .or_else(|| file.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let dashboard = &config.dashboard;

        let count = self
            .count
            .map(|count| u64::try_from(count).unwrap_or(0))
            .or(dashboard.count)
            .filter(|count| *count > 0);

        Ok(Settings {
            gitlab: GitLabSettings {
                base_url: format!("{protocol}://{host}"),
                api_version: self
                    .api_version
                    .or(file.api_version)
                    .unwrap_or(DEFAULT_API_VERSION),
                token,
                timeout: Duration::from_secs(
                    self.timeout.or(file.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS),
                ),
                insecure: self.insecure || file.insecure.unwrap_or(false),
                all_projects: self.all_projects || file.all_projects.unwrap_or(false),
            },
            refresh: Duration::from_secs(
                self.refresh
                    .or(dashboard.refresh)
                    .unwrap_or(DEFAULT_REFRESH_SECS)
                    .max(1),
            ),
            listen: self
                .listen
                .clone()
                .or_else(|| dashboard.listen.clone())
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            count,
            history: self
                .history
                .or(dashboard.history)
                .unwrap_or(DEFAULT_HISTORY),
            web_dir: self
                .web_dir
                .clone()
                .or_else(|| dashboard.web_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WEB_DIR)),
        })
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let settings = self.settings(&config)?;

        let http = reqwest::Client::builder()
            .timeout(settings.gitlab.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let mut projects =
            inputs::load_projects(&self.sources, self.projects_csv.as_deref(), &http)
                .await
                .context("Failed to load project list")?;
        projects.extend(config.watched_projects()?);

        let project_count = projects.len();
        let client = GitLabClient::new(&settings.gitlab)?;
        info!("Watching {project_count} projects on {}", client.api_url());

        let (refresher, handle) = Refresher::new(client, projects)?;

        let listener = server::bind(&settings.listen).await?;
        let stop = StopSignal::new();

        let ctrl_c_stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, finishing current refresh");
                ctrl_c_stop.stop();
            }
        });

        let app = server::router(handle.clone(), &settings.web_dir);
        let server_task = tokio::spawn(server::serve(listener, app, stop.clone()));
        let refresh_task = tokio::spawn(refresher.run(settings.refresh, settings.count, stop.clone()));

        output::run_terminal(handle, settings.history, project_count).await;

        stop.stop();
        refresh_task.await.context("Refresh task panicked")?;
        match server_task.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!("{err:#}"),
            Err(err) => error!("HTTP server task panicked: {err}"),
        }

        Ok(())
    }
}
