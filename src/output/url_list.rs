//! The plain list of selected URLs

use super::paths::sanitize_segment;
use super::writer::OutputError;
use std::path::{Path, PathBuf};
use url::Url;

/// File name of the URL list inside its bucket directory
pub const URL_LIST_FILE: &str = "selected_urls.txt";

/// Bucket used when the first URL has no path segment
const DEFAULT_BUCKET: &str = "default";

/// Names the directory a URL list is filed under
///
/// This is the first path segment of the first URL, e.g. `en` for
/// `https://docs.example.com/en/guide`.
pub fn url_list_bucket(urls: &[String]) -> String {
    urls.first()
        .and_then(|url| Url::parse(url).ok())
        .and_then(|url| {
            url.path_segments()?
                .find(|s| !s.is_empty() && *s != "." && *s != "..")
                .map(sanitize_segment)
        })
        .unwrap_or_else(|| DEFAULT_BUCKET.to_string())
}

/// Writes `urls`, one per line, to `{urls_dir}/{bucket}/selected_urls.txt`
///
/// Returns the path written.
pub fn store_urls(urls: &[String], urls_dir: &Path) -> Result<PathBuf, OutputError> {
    let dir = urls_dir.join(url_list_bucket(urls));
    let path = dir.join(URL_LIST_FILE);

    let io_error = |source| OutputError::Io {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(&dir).map_err(io_error)?;

    let mut content = urls.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(&path, content).map_err(io_error)?;

    tracing::info!("Stored {} URLs in {}", urls.len(), path.display());
    Ok(path)
}
