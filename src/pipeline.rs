//! Discover, parse and persist in one sequential run.
//!
//! [`run`] is what the binary calls after loading the configuration and
//! preparing the assets directory. Article failures are logged and skipped;
//! only output errors end the run early.

use crate::config::RunConfig;
use crate::fetch::Fetcher;
use crate::outputs::{OutputError, meta::to_meta, raw::to_raw};
use crate::scrapers::crawler::Crawler;
use crate::scrapers::parser::{HtmlParser, ParseError};
use crate::utils::truncate_for_log;
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub saved: usize,
    pub failed: usize,
}

/// Discover article URLs from the seeds, then parse and save each one.
///
/// # Arguments
///
/// * `config` - Validated run parameters (seeds and article target).
/// * `fetcher` - Client used for listing and article requests.
/// * `assets` - Existing output directory, normally freshly prepared.
///
/// # Returns
///
/// How many URLs were discovered, saved and skipped.
///
/// # Errors
///
/// Returns an [`OutputError`] if an article file cannot be written. Failed
/// listing or article requests are not errors.
#[instrument(level = "info", skip_all, fields(assets = %assets.display()))]
pub async fn run(
    config: &RunConfig,
    fetcher: &Fetcher,
    assets: &Path,
) -> Result<RunSummary, OutputError> {
    let mut crawler = Crawler::new(config, fetcher);
    info!(
        seeds = crawler.get_search_urls().len(),
        target_articles = config.num_articles(),
        "Starting discovery"
    );
    crawler.find_articles().await;
    let urls = crawler.into_urls();

    save_articles(&urls, fetcher, assets).await
}

/// Parse each URL and write its raw text and metadata files.
///
/// Article ids follow the position in `urls`, starting at 1, so an id whose
/// page failed leaves a gap instead of shifting later articles.
///
/// # Errors
///
/// Returns an [`OutputError`] on the first file that cannot be written.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn save_articles(
    urls: &[String],
    fetcher: &Fetcher,
    assets: &Path,
) -> Result<RunSummary, OutputError> {
    let mut summary = RunSummary {
        discovered: urls.len(),
        ..RunSummary::default()
    };

    for (i, url) in urls.iter().enumerate() {
        let article_id = i + 1;
        let article = match HtmlParser::new(url.as_str(), article_id, fetcher).parse().await {
            Ok(article) => article,
            Err(ParseError::HttpStatus(status)) => {
                warn!(%url, status, "Article page returned non-200; skipping");
                summary.failed += 1;
                continue;
            }
            Err(e) => {
                error!(%url, error = %e, "Failed to parse article; skipping");
                summary.failed += 1;
                continue;
            }
        };

        to_raw(&article, assets).await?;
        to_meta(&article, assets).await?;
        summary.saved += 1;
        info!(
            id = article_id,
            title = %truncate_for_log(&article.title, 80),
            "Saved article"
        );
    }

    Ok(summary)
}
