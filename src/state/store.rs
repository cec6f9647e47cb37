//! JSON persistence for [`PageState`]

use super::PageState;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading or writing the state file
#[derive(Debug, Error)]
pub enum StateError {
    #[error("State file {} is not accessible: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("State file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Loads and saves the page state file
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the previous state, or an empty one
    ///
    /// A missing file is a first run. An unreadable or corrupt file is
    /// logged and treated the same way.
    pub fn load(&self) -> PageState {
        match self.try_load() {
            Ok(state) => {
                tracing::debug!(
                    "Loaded {} page hashes from {}",
                    state.len(),
                    self.path.display()
                );
                state
            }
            Err(e) => {
                tracing::warn!("{}; starting with empty state", e);
                PageState::new()
            }
        }
    }

    /// Loads the previous state, reporting unreadable or corrupt files
    pub fn try_load(&self) -> Result<PageState, StateError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PageState::new()),
            Err(source) => {
                return Err(StateError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|source| StateError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the state file with `state`
    ///
    /// The JSON is written to a sibling temporary file which is then renamed
    /// over the target, so readers never observe a partial file.
    pub fn save(&self, state: &PageState) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let tmp = self.temp_path();
        std::fs::write(&tmp, json).map_err(|source| self.io_error(source))?;
        if let Err(source) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(self.io_error(source));
        }

        tracing::debug!("Saved {} page hashes to {}", state.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "page_state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StateError {
        StateError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
