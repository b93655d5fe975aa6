//! HTTP client for the published message CSV.
//!
//! Wraps `reqwest` with a request timeout, bounded retries on transient
//! failures, and load-time schema validation via [`parse_dataset`].

use std::time::{Duration, Instant};

use cchc_core::{AppConfig, Dataset, DEFAULT_USER_AGENT};
use reqwest::{Client, Url};

use crate::error::SourceError;
use crate::parse::parse_dataset;
use crate::retry::retry_with_backoff;

/// Client for one dataset URL.
///
/// Use [`DatasetClient::from_config`] in binaries or [`DatasetClient::new`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct DatasetClient {
    client: Client,
    url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl DatasetClient {
    /// Creates a client for `url` with the given timeout and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] if `url` is not an absolute
    /// `http`/`https` URL, or [`SourceError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, SourceError> {
        let parsed = Url::parse(url).map_err(|e| SourceError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::InvalidUrl {
                url: url.to_owned(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let user_agent = if user_agent.trim().is_empty() {
            DEFAULT_USER_AGENT
        } else {
            user_agent
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            url: parsed,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from the `CCHC_DATASET_URL` / `CCHC_FETCH_*` settings.
    ///
    /// # Errors
    ///
    /// Same as [`DatasetClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        Self::new(
            &config.dataset_url,
            config.fetch_timeout_secs,
            &config.user_agent,
            config.fetch_max_retries,
            config.fetch_retry_backoff_ms,
        )
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Downloads the raw CSV body, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] on network failure, timeout, or a
    /// non-2xx status once retries are exhausted.
    pub async fn fetch_csv(&self) -> Result<Vec<u8>, SourceError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || self.request_bytes()).await
    }

    /// Downloads and decodes the dataset.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] if the document cannot be fetched.
    /// - [`SourceError::Parse`] if the body is not valid CSV.
    /// - [`SourceError::SchemaMismatch`] if a required column is missing or
    ///   mistyped.
    pub async fn load(&self) -> Result<Dataset, SourceError> {
        let started = Instant::now();
        tracing::info!(url = %self.url, "fetching dataset");

        let body = self.fetch_csv().await?;
        let dataset = parse_dataset(&body)?;

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            url = %self.url,
            bytes = body.len(),
            rows = dataset.len(),
            elapsed_ms,
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Sends one GET request and asserts a 2xx status.
    async fn request_bytes(&self) -> Result<Vec<u8>, SourceError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
