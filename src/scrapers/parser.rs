//! Article page parsing.
//!
//! Pulls the body text, title, author, rubric and publication date out of a
//! single amurmedia.ru article page.

use crate::fetch::{FetchError, Fetcher};
use crate::models::{AUTHOR_NOT_FOUND, Article};
use crate::scrapers::dates::{DateError, normalize};
use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, instrument};

static CONTENT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.page-content.io-article-body").expect("valid selector"));
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid selector"));
static AUTHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="Author"]"#).expect("valid selector"));
static RUBRIC_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.fn-rubric-a").expect("valid selector"));
static RUBRIC_DATE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.fn-rubric-link").expect("valid selector"));
static LEGACY_DATE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.pldate").expect("valid selector"));

/// Why a single article could not be parsed. None of these abort a run.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("article page returned HTTP {0}")]
    HttpStatus(u16),

    /// An element the page template always carries is missing.
    #[error("page structure mismatch: missing {0}")]
    MissingElement(&'static str),

    #[error(transparent)]
    Date(#[from] DateError),
}

/// Fetches and parses one article page.
#[derive(Debug)]
pub struct HtmlParser<'a> {
    full_url: String,
    article_id: usize,
    fetcher: &'a Fetcher,
}

impl<'a> HtmlParser<'a> {
    pub fn new(full_url: impl Into<String>, article_id: usize, fetcher: &'a Fetcher) -> Self {
        Self {
            full_url: full_url.into(),
            article_id,
            fetcher,
        }
    }

    /// Fetch the page and build the article, resolving relative dates against local now.
    #[instrument(level = "info", skip_all, fields(url = %self.full_url, id = self.article_id))]
    pub async fn parse(self) -> Result<Article, ParseError> {
        let page = self.fetcher.make_request(&self.full_url).await?;
        if !page.is_ok() {
            return Err(ParseError::HttpStatus(page.status));
        }
        let article = parse_document(
            Article::new(self.full_url, self.article_id),
            &page.text,
            Local::now().naive_local(),
        )?;
        debug!(
            title = %article.title,
            chars = article.text.chars().count(),
            "Parsed article"
        );
        Ok(article)
    }
}

/// Fill `article` from the page HTML. `now` anchors dates that omit the day or year.
pub fn parse_document(
    mut article: Article,
    html: &str,
    now: NaiveDateTime,
) -> Result<Article, ParseError> {
    let document = Html::parse_document(html);
    article.text = article_text(&document)?;
    fill_meta_information(&mut article, &document, now)?;
    Ok(article)
}

/// Paragraphs of the content block, minus the trailing footer paragraph.
fn article_text(document: &Html) -> Result<String, ParseError> {
    let content = document
        .select(&CONTENT_SELECTOR)
        .next()
        .ok_or(ParseError::MissingElement("article body"))?;

    let mut paragraphs: Vec<String> = content.select(&PARAGRAPH_SELECTOR).map(text_of).collect();
    paragraphs.pop();
    Ok(paragraphs.join("\n"))
}

fn fill_meta_information(
    article: &mut Article,
    document: &Html,
    now: NaiveDateTime,
) -> Result<(), ParseError> {
    article.title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(text_of)
        .ok_or(ParseError::MissingElement("title"))?;

    let author = document
        .select(&AUTHOR_SELECTOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(AUTHOR_NOT_FOUND);
    article.author = vec![author.to_string()];

    let topic = document
        .select(&RUBRIC_SELECTOR)
        .next()
        .map(text_of)
        .ok_or(ParseError::MissingElement("rubric"))?;
    article.topics.push(topic);

    let raw_date = document
        .select(&RUBRIC_DATE_SELECTOR)
        .next()
        .or_else(|| document.select(&LEGACY_DATE_SELECTOR).next())
        .map(text_of)
        .ok_or(ParseError::MissingElement("publication date"))?;
    article.date = Some(normalize(&raw_date, now)?);

    Ok(())
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::{test_config, test_fetcher};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const URL: &str = "https://amurmedia.ru/news/1150000/";

    fn page(author: Option<&str>, date_block: &str, paragraphs: &[&str]) -> String {
        let author_meta = author
            .map(|a| format!(r#"<meta name="Author" content="{a}">"#))
            .unwrap_or_default();
        let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
        format!(
            r#"<html><head><title>Мост через Зею откроют летом</title>{author_meta}</head>
            <body>
              <a class="fn-rubric-a" href="/news/society/">Общество</a>
              {date_block}
              <div class="page-content io-article-body">{body}</div>
            </body></html>"#
        )
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn parse(html: &str) -> Result<Article, ParseError> {
        parse_document(Article::new(URL, 3), html, now())
    }

    #[test]
    fn test_full_page() {
        let html = page(
            Some("Иван Петров"),
            r#"<div class="fn-rubric-link">10 марта, 14:30</div>"#,
            &["Первый абзац.", "Второй абзац.", "Фото: пресс-служба"],
        );
        let article = parse(&html).unwrap();

        assert_eq!(article.article_id, 3);
        assert_eq!(article.url, URL);
        assert_eq!(article.title, "Мост через Зею откроют летом");
        assert_eq!(article.author, vec!["Иван Петров".to_string()]);
        assert_eq!(article.topics, vec!["Общество".to_string()]);
        assert_eq!(
            article.date,
            NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(14, 30, 0)
        );
        assert_eq!(article.text, "Первый абзац.\nВторой абзац.");
    }

    #[test]
    fn test_last_paragraph_is_excluded() {
        let html = page(
            None,
            r#"<div class="fn-rubric-link">14:30</div>"#,
            &["a", "b", "c", "footer"],
        );
        let article = parse(&html).unwrap();
        assert_eq!(article.text, "a\nb\nc");
        assert!(!article.text.contains("footer"));
    }

    #[test]
    fn test_single_paragraph_yields_empty_text() {
        let html = page(None, r#"<div class="fn-rubric-link">14:30</div>"#, &["only"]);
        assert_eq!(parse(&html).unwrap().text, "");
    }

    #[test]
    fn test_empty_author_is_sentinel() {
        let html = page(
            Some(""),
            r#"<div class="fn-rubric-link">15.03.2024</div>"#,
            &["a", "b"],
        );
        assert_eq!(parse(&html).unwrap().author, vec![AUTHOR_NOT_FOUND.to_string()]);
    }

    #[test]
    fn test_absent_author_is_sentinel() {
        let html = page(None, r#"<div class="fn-rubric-link">15.03.2024</div>"#, &["a", "b"]);
        assert_eq!(parse(&html).unwrap().author, vec!["NOT FOUND".to_string()]);
    }

    #[test]
    fn test_legacy_date_block_fallback() {
        let html = page(None, r#"<p class="pldate"> 15.03.2024 </p>"#, &["a", "b"]);
        let article = parse(&html).unwrap();
        assert_eq!(
            article.date,
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn test_rubric_date_preferred_over_legacy() {
        let html = page(
            None,
            r#"<div class="fn-rubric-link">14:30</div><p class="pldate">15.03.2024</p>"#,
            &["a", "b"],
        );
        let article = parse(&html).unwrap();
        assert_eq!(article.date, now().date().and_hms_opt(14, 30, 0));
    }

    #[test]
    fn test_missing_content_block() {
        let html = r#"<html><head><title>t</title></head><body>
            <a class="fn-rubric-a">x</a><div class="fn-rubric-link">14:30</div></body></html>"#;
        assert!(matches!(
            parse(html),
            Err(ParseError::MissingElement("article body"))
        ));
    }

    #[test]
    fn test_missing_date_block() {
        let html = page(None, "", &["a", "b"]);
        assert!(matches!(
            parse(&html),
            Err(ParseError::MissingElement("publication date"))
        ));
    }

    #[test]
    fn test_missing_rubric() {
        let html = r#"<html><head><title>t</title></head><body>
            <div class="fn-rubric-link">14:30</div>
            <div class="page-content io-article-body"><p>a</p><p>b</p></div></body></html>"#;
        assert!(matches!(
            parse(html),
            Err(ParseError::MissingElement("rubric"))
        ));
    }

    #[test]
    fn test_unrecognized_date_is_date_error() {
        let html = page(None, r#"<div class="fn-rubric-link">вчера</div>"#, &["a", "b"]);
        assert!(matches!(
            parse(&html),
            Err(ParseError::Date(DateError::Unrecognized(_)))
        ));
    }

    #[tokio::test]
    async fn test_parse_fetches_page() {
        let server = MockServer::start().await;
        let html = page(
            Some("Анна"),
            r#"<div class="fn-rubric-link">15.03.2024</div>"#,
            &["Текст новости.", "Подпись"],
        );
        Mock::given(method("GET"))
            .and(path("/news/42/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;

        let config = test_config(&[server.uri()], 1, "utf-8");
        let fetcher = test_fetcher(&config);
        let url = format!("{}/news/42/", server.uri());
        let article = HtmlParser::new(url.clone(), 1, &fetcher).parse().await.unwrap();

        assert_eq!(article.url, url);
        assert_eq!(article.article_id, 1);
        assert_eq!(article.author, vec!["Анна".to_string()]);
        assert_eq!(article.text, "Текст новости.");
    }

    #[tokio::test]
    async fn test_parse_non_200_is_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/404/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let config = test_config(&[server.uri()], 1, "utf-8");
        let fetcher = test_fetcher(&config);
        let err = HtmlParser::new(format!("{}/news/404/", server.uri()), 1, &fetcher)
            .parse()
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::HttpStatus(404)));
    }
}
