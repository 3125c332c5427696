//! Data models for harvested articles.
//!
//! - [`Article`]: one parsed news article, filled by the parser and handed to
//!   the output sink unchanged
//! - [`ArticleMeta`]: the serialized metadata view of an [`Article`]

use chrono::NaiveDateTime;
use serde::Serialize;

/// Placeholder stored when a page carries no author.
pub const AUTHOR_NOT_FOUND: &str = "NOT FOUND";

/// Layout of the `date` field in metadata files.
pub const META_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A news article identified by its harvest position and source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// 1-based position of the article in discovery order.
    pub article_id: usize,
    /// The page the article was parsed from.
    pub url: String,
    pub title: String,
    /// Author names, or `[AUTHOR_NOT_FOUND]` when the page omits them.
    pub author: Vec<String>,
    /// Rubric labels assigned by the site.
    pub topics: Vec<String>,
    /// Publication timestamp, `None` until the parser fills it.
    pub date: Option<NaiveDateTime>,
    /// Body paragraphs joined with newlines.
    pub text: String,
}

impl Article {
    /// An empty article, ready to be filled by the parser.
    pub fn new(url: impl Into<String>, article_id: usize) -> Self {
        Self {
            article_id,
            url: url.into(),
            title: String::new(),
            author: Vec::new(),
            topics: Vec::new(),
            date: None,
            text: String::new(),
        }
    }

    pub fn meta(&self) -> ArticleMeta<'_> {
        ArticleMeta {
            id: self.article_id,
            url: &self.url,
            title: &self.title,
            author: &self.author,
            topics: &self.topics,
            date: self.date.map(|d| d.format(META_DATE_FORMAT).to_string()),
        }
    }
}

/// Structured metadata persisted next to the raw text.
#[derive(Debug, Serialize)]
pub struct ArticleMeta<'a> {
    pub id: usize,
    pub url: &'a str,
    pub title: &'a str,
    pub author: &'a [String],
    pub topics: &'a [String],
    pub date: Option<String>,
}
