//! # Amur News Scraper
//!
//! Harvests news articles from [amurmedia.ru](https://amurmedia.ru) listing
//! pages and stores each article's text and metadata on disk.
//!
//! ## Usage
//!
//! ```sh
//! RUST_LOG=info amur_news_scraper
//! ```
//!
//! The run is driven entirely by `scraper_config.json` in the working
//! directory; results land in `tmp/articles`.
//!
//! ## Architecture
//!
//! The application follows a sequential pipeline:
//! 1. **Configuration**: load and validate the run parameters
//! 2. **Preparation**: wipe and recreate the assets directory
//! 3. **Discovery**: collect article URLs from the seed listing pages
//! 4. **Parsing**: fetch each article and extract its text and metadata
//! 5. **Output**: write a raw text file and a metadata file per article
//!
//! Requests are made one at a time, each after a short randomized pause.

use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use amur_news_scraper::config::RunConfig;
use amur_news_scraper::fetch::Fetcher;
use amur_news_scraper::pipeline;
use amur_news_scraper::utils::prepare_environment;

/// Configuration file read at startup.
const CRAWLER_CONFIG_PATH: &str = "scraper_config.json";
/// Directory the parsed articles are written to.
const ASSETS_PATH: &str = "tmp/articles";

#[tokio::main(flavor = "current_thread")]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("amur_news_scraper starting up");

    // ---- Configuration: fail fast before touching disk or network ----
    let config = match RunConfig::load(CRAWLER_CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            error!(path = CRAWLER_CONFIG_PATH, error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    debug!(headless_mode = config.headless_mode(), "Headless mode flag is not used by the HTTP fetcher");
    let fetcher = Fetcher::new(&config)?;

    let assets = Path::new(ASSETS_PATH);
    if let Err(e) = prepare_environment(assets).await {
        error!(path = ASSETS_PATH, error = %e, "Could not prepare assets directory");
        return Err(e.into());
    }

    // ---- Discovery, parsing and output ----
    let summary = pipeline::run(&config, &fetcher, assets).await?;

    let elapsed = start_time.elapsed();
    info!(
        discovered = summary.discovered,
        saved = summary.saved,
        failed = summary.failed,
        secs = elapsed.as_secs(),
        "Execution complete"
    );

    Ok(())
}
