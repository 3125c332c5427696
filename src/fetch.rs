//! Rate-limited HTTP fetching.
//!
//! Every request is preceded by a randomized politeness delay and uses the
//! headers, timeout and TLS policy from [`RunConfig`]. Response bodies are
//! always decoded with the configured encoding because the site's declared
//! charset cannot be trusted.
//!
//! The fetcher never retries and never treats a non-200 status as an error:
//! callers receive the status alongside the decoded body and decide for
//! themselves.

use crate::config::RunConfig;
use encoding_rs::Encoding;
use rand::{Rng, rng};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, instrument};

/// Errors raised while building the client or performing a request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid header {name:?}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("unknown response encoding {0:?}")]
    UnknownEncoding(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Window the politeness delay is drawn from before each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDelay {
    min: Duration,
    max: Duration,
}

impl RequestDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// No delay at all. Intended for tests against local mock servers.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    fn pick(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(rng().random_range(min_ms..=max_ms))
    }
}

impl Default for RequestDelay {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_secs(4))
    }
}

/// A fetched page: HTTP status plus the body decoded with the configured encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub text: String,
    /// Address the body was served from, after any redirects.
    pub final_url: String,
}

impl FetchedPage {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// HTTP client configured from a [`RunConfig`].
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    encoding: &'static Encoding,
    delay: RequestDelay,
}

impl Fetcher {
    /// Build a fetcher from validated run parameters.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the headers, timeout, encoding label and
    ///   certificate policy.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnknownEncoding`] if the encoding label is not
    /// recognized, [`FetchError::InvalidHeader`] if a configured header is not
    /// a legal HTTP header, and [`FetchError::Client`] if the TLS backend
    /// cannot be initialized.
    pub fn new(config: &RunConfig) -> Result<Self, FetchError> {
        let encoding = Encoding::for_label(config.encoding().trim().as_bytes())
            .ok_or_else(|| FetchError::UnknownEncoding(config.encoding().to_string()))?;

        let client = Client::builder()
            .default_headers(header_map(config)?)
            .timeout(Duration::from_secs(config.timeout()))
            .danger_accept_invalid_certs(!config.verify_certificate())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            encoding,
            delay: RequestDelay::default(),
        })
    }

    /// Replace the politeness delay window.
    pub fn with_delay(mut self, delay: RequestDelay) -> Self {
        self.delay = delay;
        self
    }

    /// Sleep for the politeness delay, then GET `url`.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute address to request.
    ///
    /// # Returns
    ///
    /// The status code, the body decoded with the configured encoding and the
    /// final URL after redirects. Non-200 statuses are returned, not raised.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Request`] on transport failures: DNS, refused
    /// connections, TLS errors, timeouts, or a body that cannot be read.
    #[instrument(level = "debug", skip(self))]
    pub async fn make_request(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let pause = self.delay.pick();
        debug!(?pause, "Waiting before request");
        sleep(pause).await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let (text, had_errors) = self.encoding.decode_without_bom_handling(&bytes);
        debug!(
            status,
            bytes = bytes.len(),
            encoding = self.encoding.name(),
            had_errors,
            %final_url,
            "Received response"
        );
        Ok(FetchedPage {
            status,
            text: text.into_owned(),
            final_url,
        })
    }
}

fn header_map(config: &RunConfig) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    for (name, value) in config.headers() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| FetchError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
            name: name.clone(),
            message: e.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}
