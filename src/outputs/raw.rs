//! Plain-text article bodies.

use crate::models::Article;
use crate::outputs::OutputError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Path of the raw text file for `article` inside `dir`.
pub fn raw_path(dir: &Path, article: &Article) -> PathBuf {
    dir.join(format!("{}_raw.txt", article.article_id))
}

/// Write the article body to `{dir}/{id}_raw.txt`.
///
/// # Arguments
///
/// * `article` - The parsed article; its id names the file.
/// * `dir` - Existing output directory.
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Returns [`OutputError::Io`] if the file cannot be written, for example
/// when `dir` does not exist.
#[instrument(level = "info", skip_all, fields(id = article.article_id))]
pub async fn to_raw(article: &Article, dir: &Path) -> Result<PathBuf, OutputError> {
    let path = raw_path(dir, article);
    fs::write(&path, &article.text)
        .await
        .map_err(|source| OutputError::Io {
            path: path.display().to_string(),
            source,
        })?;
    info!(path = %path.display(), "Wrote raw text");
    Ok(path)
}
