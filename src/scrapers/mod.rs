//! Scraping for [amurmedia.ru](https://amurmedia.ru).
//!
//! Scraping follows a two-phase pattern:
//!
//! 1. **Discovery**: [`crawler::Crawler`] walks the seed listing pages and
//!    collects article URLs
//! 2. **Parsing**: [`parser::HtmlParser`] fetches each article and extracts its
//!    text and metadata, with [`dates`] turning the site's date strings into
//!    timestamps
//!
//! # Page markers
//!
//! | Marker | Meaning |
//! |--------|---------|
//! | `a.news-for-copy` | article link on a listing page |
//! | `div.page-content.io-article-body` | article body |
//! | `a.fn-rubric-a` | rubric (topic) label |
//! | `div.fn-rubric-link`, `p.pldate` | publication date, current and legacy layouts |

use once_cell::sync::Lazy;
use scraper::Selector;

pub mod crawler;
pub mod dates;
pub mod parser;

/// Prefix every genuine article URL starts with.
pub const ARTICLE_URL_PREFIX: &str = "https://amurmedia.ru/news/";

/// Anchors on listing pages that point at articles.
pub static ARTICLE_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.news-for-copy").expect("valid selector"));
