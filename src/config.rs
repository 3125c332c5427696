//! Run configuration loading and validation.
//!
//! The configuration is a JSON document describing which listing pages to
//! harvest, how many articles to collect and how to talk to the site:
//!
//! ```json
//! {
//!   "seed_urls": ["https://amurmedia.ru/news/"],
//!   "total_articles": 10,
//!   "headers": {"User-Agent": "Mozilla/5.0"},
//!   "encoding": "utf-8",
//!   "timeout": 10,
//!   "should_verify_certificate": true,
//!   "headless_mode": true
//! }
//! ```
//!
//! Loading happens in two phases. The file is first parsed into a generic
//! [`serde_json::Value`] so malformed JSON is reported before any field
//! check, then every field is validated in a fixed order, and only then is the
//! document deserialized into [`RunConfig`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

/// Maximum number of articles a single run may request.
pub const NUM_ARTICLES_UPPER_LIMIT: u64 = 150;
/// Smallest accepted request timeout, in seconds.
pub const TIMEOUT_LOWER_LIMIT: u64 = 1;
/// Largest accepted request timeout, in seconds.
pub const TIMEOUT_UPPER_LIMIT: u64 = 60;

static SEED_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://").expect("seed url pattern is valid"));

/// Every way a configuration file can be rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// `seed_urls` is not a non-empty list of http(s) URLs.
    #[error("seed_urls must be a non-empty list of http(s) URLs")]
    InvalidSeedUrl,

    /// `total_articles` is an integer outside `1..=NUM_ARTICLES_UPPER_LIMIT`.
    #[error("total_articles must be between 1 and {NUM_ARTICLES_UPPER_LIMIT}")]
    ArticleCountOutOfRange,

    /// `total_articles` is not an integer at all.
    #[error("total_articles must be an integer")]
    InvalidArticleCount,

    #[error("headers must be an object of string values")]
    InvalidHeaders,

    #[error("encoding must be a string")]
    InvalidEncoding,

    #[error("timeout must be an integer between {TIMEOUT_LOWER_LIMIT} and {TIMEOUT_UPPER_LIMIT}")]
    InvalidTimeout,

    #[error("should_verify_certificate and headless_mode must be booleans")]
    InvalidVerifyFlag,
}

/// Validated, immutable run parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    seed_urls: Vec<String>,
    total_articles: usize,
    headers: HashMap<String, String>,
    encoding: String,
    timeout: u64,
    should_verify_certificate: bool,
    headless_mode: bool,
}

impl RunConfig {
    /// Read, validate and build a configuration from a JSON file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Validate and build a configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_json::from_str(content)?;
        validate(&document)?;
        let config: RunConfig = serde_json::from_value(document)?;
        debug!(
            seeds = config.seed_urls.len(),
            total_articles = config.total_articles,
            timeout = config.timeout,
            "Configuration validated"
        );
        Ok(config)
    }

    pub fn seed_urls(&self) -> &[String] {
        &self.seed_urls
    }

    /// Number of article links the discoverer should collect.
    pub fn num_articles(&self) -> usize {
        self.total_articles
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Encoding label every response body is decoded with.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Request timeout in seconds.
    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn verify_certificate(&self) -> bool {
        self.should_verify_certificate
    }

    /// Carried for compatibility with browser-driven runs; plain HTTP fetching ignores it.
    pub fn headless_mode(&self) -> bool {
        self.headless_mode
    }
}

fn validate(document: &Value) -> Result<(), ConfigError> {
    match document.get("seed_urls").and_then(Value::as_array) {
        Some(urls) if !urls.is_empty() => {
            let all_valid = urls
                .iter()
                .all(|url| url.as_str().is_some_and(|s| SEED_URL_RE.is_match(s)));
            if !all_valid {
                return Err(ConfigError::InvalidSeedUrl);
            }
        }
        _ => return Err(ConfigError::InvalidSeedUrl),
    }

    // JSON booleans are never numbers here, so `true` lands in the type error branch.
    let total = document.get("total_articles");
    match total.and_then(integer_value) {
        Some(n) if (1..=NUM_ARTICLES_UPPER_LIMIT as i128).contains(&n) => {}
        Some(_) => return Err(ConfigError::ArticleCountOutOfRange),
        None => return Err(ConfigError::InvalidArticleCount),
    }

    let headers_ok = document
        .get("headers")
        .and_then(Value::as_object)
        .is_some_and(|map| map.values().all(Value::is_string));
    if !headers_ok {
        return Err(ConfigError::InvalidHeaders);
    }

    if !document.get("encoding").is_some_and(Value::is_string) {
        return Err(ConfigError::InvalidEncoding);
    }

    let timeout_range = TIMEOUT_LOWER_LIMIT as i128..=TIMEOUT_UPPER_LIMIT as i128;
    match document.get("timeout").and_then(integer_value) {
        Some(t) if timeout_range.contains(&t) => {}
        _ => return Err(ConfigError::InvalidTimeout),
    }

    let verify = document.get("should_verify_certificate").is_some_and(Value::is_boolean);
    let headless = document.get("headless_mode").is_some_and(Value::is_boolean);
    if !verify || !headless {
        return Err(ConfigError::InvalidVerifyFlag);
    }

    Ok(())
}

/// Integer value of a JSON number, widened so huge values still compare as out of range.
fn integer_value(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}
