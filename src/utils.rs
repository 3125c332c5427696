//! Utility functions for log formatting and output directory preparation.

use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters with an ellipsis and a count of
/// the dropped bytes appended. Cuts always land on a character boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Delete `path` if it exists and recreate it empty.
///
/// This is destructive: anything left over from a previous run is removed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn prepare_environment(path: &Path) -> io::Result<()> {
    if fs::try_exists(path).await? {
        fs::remove_dir_all(path).await?;
        info!("Removed previous output directory");
    }
    fs::create_dir_all(path).await?;
    info!("Output directory ready");
    Ok(())
}
