//! Per-format output files

use super::convert::Converter;
use super::paths::resolve_output_path;
use crate::config::OutputConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors writing an output file
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl OutputError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } => path,
        }
    }
}

/// A format a page can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Markdown,
    Html,
    Text,
}

impl OutputKind {
    /// File suffix, including the dot
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Markdown => ".md",
            Self::Html => ".html",
            Self::Text => ".txt",
        }
    }

    /// Produces the file content for this format from fetched HTML
    pub fn render(self, html: &str, converter: &dyn Converter) -> String {
        match self {
            Self::Markdown => converter.convert(html),
            Self::Html => html.to_string(),
            Self::Text => converter.to_text(html),
        }
    }
}

/// Where and in which formats pages are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    pub root: PathBuf,
    pub markdown: bool,
    pub html: bool,
    pub text: bool,
    pub flatten: bool,
}

impl OutputOptions {
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            root: config.content_dir.clone(),
            markdown: config.markdown,
            html: config.html,
            text: config.text,
            flatten: config.flatten,
        }
    }

    /// Enabled formats, in a fixed order
    pub fn kinds(&self) -> Vec<OutputKind> {
        [
            (self.markdown, OutputKind::Markdown),
            (self.html, OutputKind::Html),
            (self.text, OutputKind::Text),
        ]
        .into_iter()
        .filter_map(|(enabled, kind)| enabled.then_some(kind))
        .collect()
    }

    /// Full output path of `url` in the given format
    ///
    /// An unparseable URL is treated as the path itself.
    pub fn path_for(&self, url: &str, kind: OutputKind) -> PathBuf {
        let url_path = Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| url.to_string());
        self.root
            .join(resolve_output_path(&url_path, self.flatten, kind.suffix()))
    }
}

/// Writes `content` to `path`, creating parent directories
pub async fn write_output(path: &Path, content: &str) -> Result<(), OutputError> {
    let io_error = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    tokio::fs::write(path, content).await.map_err(io_error)?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
