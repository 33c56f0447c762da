use std::time::Duration;

use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth::Token;
use crate::error::{PipeboardError, Result};

pub(super) const PAGE_SIZE: usize = 100;
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Connection settings for a GitLab instance.
#[derive(Debug, Clone)]
pub struct GitLabSettings {
    /// Instance base URL (e.g., <https://gitlab.example.com>)
    pub base_url: String,
    /// REST API version used in the `api/v{N}/` prefix
    pub api_version: u32,
    pub token: Token,
    pub timeout: Duration,
    /// Skip TLS certificate verification (self-signed instances)
    pub insecure: bool,
    /// List every visible project instead of only those the token's user is a
    /// member of
    pub all_projects: bool,
}

pub struct GitLabClient {
    client: Client,
    api_url: Url,
    token: Token,
    pub(super) all_projects: bool,
}

impl GitLabClient {
    pub fn new(settings: &GitLabSettings) -> Result<Self> {
        if settings.token.is_blank() {
            return Err(PipeboardError::Config("token is not set".to_string()));
        }

        let client = Client::builder()
            .user_agent(concat!("pipeboard/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.insecure)
            .build()
            .map_err(|e| PipeboardError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(&settings.base_url)
            .map_err(|e| PipeboardError::Config(format!("Invalid base URL: {e}")))?
            .join(&format!("api/v{}/", settings.api_version))
            .map_err(|e| PipeboardError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token: settings.token.clone(),
            all_projects: settings.all_projects,
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Issue an authenticated GET and decode the JSON body.
    ///
    /// Returns the decoded body together with the `X-Next-Page` header, if the
    /// endpoint is paginated and another page exists.
    pub(super) async fn get_page<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(T, Option<u32>)>
    where
        T: DeserializeOwned,
    {
        let url = self
            .api_url
            .join(path)
            .map_err(|e| PipeboardError::Config(format!("Invalid API path {path}: {e}")))?;

        debug!("GET {url} {query:?}");

        let response = self
            .client
            .get(url)
            .header("Private-Token", self.token.as_str())
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(api_error(status.as_u16(), &body));
        }

        let next_page = response
            .headers()
            .get(NEXT_PAGE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u32>().ok());

        Ok((response.json().await?, next_page))
    }

    pub(super) async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get_page(path, query).await.map(|(body, _)| body)
    }
}

/// Build the error for a non-2xx response.
///
/// GitLab reports failures as `{"error": "..."}` or `{"message": "..."}`;
/// anything else is surfaced as `"<status> <body>"`.
pub(super) fn api_error(status: u16, body: &str) -> PipeboardError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "message"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_owned))
        })
        .unwrap_or_else(|| format!("{status} {}", body.trim()));

    PipeboardError::Api { status, message }
}
