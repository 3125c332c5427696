//! Article link discovery.
//!
//! The crawler walks the configured seed listing pages and collects links to
//! individual articles. Links are kept in discovery order, never repeat, and
//! collection stops the moment the configured article count is reached.
//!
//! Relative links are resolved against the address the listing was actually
//! served from, so a seed that redirects (for example `http://` to
//! `https://`) still yields links under the article prefix.
//!
//! The [`DiscoveryPolicy`] is chosen in code with [`Crawler::with_policy`];
//! it is not read from `scraper_config.json`, and the binary always runs with
//! the default [`DiscoveryPolicy::UntilExhausted`].

use crate::config::RunConfig;
use crate::fetch::Fetcher;
use crate::scrapers::{ARTICLE_LINK_SELECTOR, ARTICLE_URL_PREFIX};
use scraper::{ElementRef, Html};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Placeholder returned for article anchors without an `href`.
pub const URL_NOT_FOUND: &str = "url not found";

/// How many times the seed pages are walked.
///
/// Set with [`Crawler::with_policy`]. There is no configuration key for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryPolicy {
    /// Visit every seed exactly once.
    SinglePass,
    /// Keep walking the seeds until the target is met or a whole pass finds
    /// nothing new.
    #[default]
    UntilExhausted,
}

/// Collects article URLs from the seed listing pages.
#[derive(Debug)]
pub struct Crawler<'a> {
    config: &'a RunConfig,
    fetcher: &'a Fetcher,
    policy: DiscoveryPolicy,
    urls: Vec<String>,
}

impl<'a> Crawler<'a> {
    pub fn new(config: &'a RunConfig, fetcher: &'a Fetcher) -> Self {
        Self {
            config,
            fetcher,
            policy: DiscoveryPolicy::default(),
            urls: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: DiscoveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The configured seed listing pages.
    pub fn get_search_urls(&self) -> &[String] {
        self.config.seed_urls()
    }

    /// Article URLs discovered so far, in discovery order.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }

    fn target_reached(&self) -> bool {
        self.urls.len() >= self.config.num_articles()
    }

    /// Harvest article links according to the discovery policy.
    ///
    /// Seeds are requested in order. Listings that fail at the transport level
    /// or answer with a non-200 status are logged and skipped, so this never
    /// fails; an unreachable site simply yields no URLs.
    ///
    /// # Returns
    ///
    /// Nothing directly. The discovered URLs, at most the configured article
    /// count, are available afterwards via [`Crawler::urls`] or
    /// [`Crawler::into_urls`].
    #[instrument(level = "info", skip_all, fields(target_articles = self.config.num_articles(), policy = ?self.policy))]
    pub async fn find_articles(&mut self) {
        let mut pass = 0usize;
        while !self.target_reached() {
            pass += 1;
            let before = self.urls.len();
            self.crawl_seeds().await;
            let added = self.urls.len() - before;
            debug!(pass, added, total = self.urls.len(), "Finished pass over seeds");

            if self.policy == DiscoveryPolicy::SinglePass || added == 0 {
                break;
            }
        }

        info!(
            count = self.urls.len(),
            passes = pass,
            "Discovered article URLs"
        );
    }

    async fn crawl_seeds(&mut self) {
        let config = self.config;
        for seed_url in config.seed_urls() {
            if self.target_reached() {
                return;
            }

            let page = match self.fetcher.make_request(seed_url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(%seed_url, error = %e, "Listing page request failed; skipping");
                    continue;
                }
            };
            if !page.is_ok() {
                warn!(%seed_url, status = page.status, "Listing page returned non-200; skipping");
                continue;
            }

            let before = self.urls.len();
            self.harvest_links(&page.final_url, &page.text);
            debug!(%seed_url, added = self.urls.len() - before, "Harvested listing page");
        }
    }

    /// Add every new article link found in a listing page, stopping at the target.
    ///
    /// `page_url` is the address the listing was served from and is the base
    /// for relative links.
    fn harvest_links(&mut self, page_url: &str, html: &str) {
        let document = Html::parse_document(html);
        let base = Url::parse(page_url).ok();

        for anchor in document.select(&ARTICLE_LINK_SELECTOR) {
            if self.target_reached() {
                return;
            }
            let url = resolve(extract_url(anchor), base.as_ref());
            if url.starts_with(ARTICLE_URL_PREFIX) && !self.urls.contains(&url) {
                self.urls.push(url);
            }
        }
    }
}

/// The anchor's `href`, or [`URL_NOT_FOUND`] when it has none.
fn extract_url(anchor: ElementRef<'_>) -> &str {
    anchor.value().attr("href").unwrap_or(URL_NOT_FOUND)
}

/// Resolve relative links against the listing page; anything else passes through.
fn resolve(href: &str, base: Option<&Url>) -> String {
    if href == URL_NOT_FOUND {
        return href.to_string();
    }
    match (Url::parse(href), base) {
        (Ok(absolute), _) => absolute.to_string(),
        (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
        _ => href.to_string(),
    }
}
