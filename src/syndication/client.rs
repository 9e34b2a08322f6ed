use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::config::Config;
use crate::constants::{BROWSER_ACCEPT, BROWSER_USER_AGENT, TIMELINE_PATH};

/// Source of raw timeline pages, one per account handle.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Fetch the timeline page for `handle`.
    ///
    /// Returns `None` on any failure. Failures are routine for an unofficial
    /// endpoint and never abort a run.
    async fn fetch_timeline(&self, handle: &str) -> Option<String>;
}

/// HTTP client for the syndication timeline endpoint.
pub struct SyndicationClient {
    client: reqwest::Client,
    base_url: String,
}

impl SyndicationClient {
    /// Build a client from the configured base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));

        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(config.fetch_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.syndication_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the timeline page for `handle`.
    #[must_use]
    pub fn timeline_url(&self, handle: &str) -> String {
        format!(
            "{}{TIMELINE_PATH}{}",
            self.base_url,
            urlencoding::encode(handle)
        )
    }
}

#[async_trait]
impl TimelineSource for SyndicationClient {
    async fn fetch_timeline(&self, handle: &str) -> Option<String> {
        let url = self.timeline_url(handle);
        debug!(handle = %handle, url = %url, "Fetching timeline");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(handle = %handle, error = %e, "Timeline request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(handle = %handle, status = %status, "Timeline request returned error status");
            return None;
        }

        match response.bytes().await {
            Ok(body) => Some(String::from_utf8_lossy(&body).into_owned()),
            Err(e) => {
                warn!(handle = %handle, error = %e, "Failed to read timeline body");
                None
            }
        }
    }
}
