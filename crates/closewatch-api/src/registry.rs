// Plugin registry page fetcher
//
// Deliberately dumb: one GET per call, no retries, no caching. The status cache
// one level up decides how often we bother the registry at all.
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

pub const DEFAULT_REGISTRY_URL: &str = "https://wordpress.org";

const DEFAULT_USER_AGENT: &str = "closewatch/0.1.0";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("registry returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("registry returned an empty body")]
    EmptyBody,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else {
            FetchError::Transport(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Client for the public plugin pages of the registry
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_REGISTRY_URL)
    }

    /// Point the client at a mirror (or a mock server in tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_options(
            base_url,
            DEFAULT_USER_AGENT,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_options(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Canonical page URL for a slug. The slug has to be path-safe already.
    pub fn page_url(&self, slug: &str) -> String {
        format!("{}/plugins/{}/", self.base_url, slug)
    }

    /// Fetch the raw HTML of a plugin page
    pub async fn fetch(&self, slug: &str) -> Result<String> {
        let url = self.page_url(slug);
        debug!("Fetching registry page {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        Ok(body)
    }
}

impl Default for RegistryClient {
    fn default() -> Self {
        Self::new()
    }
}
