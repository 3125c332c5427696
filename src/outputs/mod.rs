//! Persisting parsed articles.
//!
//! Each article produces two files in the assets directory:
//!
//! - [`raw`]: the article body as plain text
//! - [`meta`]: the article metadata as JSON
//!
//! # Output Structure
//!
//! ```text
//! tmp/articles/
//! ├── 1_raw.txt
//! ├── 1_meta.json
//! ├── 2_raw.txt
//! └── 2_meta.json
//! ```

use thiserror::Error;

pub mod meta;
pub mod raw;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}
