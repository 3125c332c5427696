//! JSON article metadata.

use crate::models::Article;
use crate::outputs::OutputError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Path of the metadata file for `article` inside `dir`.
pub fn meta_path(dir: &Path, article: &Article) -> PathBuf {
    dir.join(format!("{}_meta.json", article.article_id))
}

/// Write id, url, title, author, topics and date to `{dir}/{id}_meta.json`.
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
/// Returns [`OutputError::Serialize`] if the metadata cannot be encoded and
/// [`OutputError::Io`] if the file cannot be written.
#[instrument(level = "info", skip_all, fields(id = article.article_id))]
pub async fn to_meta(article: &Article, dir: &Path) -> Result<PathBuf, OutputError> {
    let json = serde_json::to_string_pretty(&article.meta())?;
    let path = meta_path(dir, article);
    fs::write(&path, json)
        .await
        .map_err(|source| OutputError::Io {
            path: path.display().to_string(),
            source,
        })?;
    info!(path = %path.display(), "Wrote metadata");
    Ok(path)
}
