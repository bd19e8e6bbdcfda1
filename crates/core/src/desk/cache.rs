//! JSON file cache of the desk state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::{DeskState, DeskView};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cache file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keeps a copy of [`DeskState`] on disk between sessions.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached state. A missing file yields an empty state.
    pub fn load(&self) -> Result<DeskState, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No cache file, starting empty");
                return Ok(DeskState::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the state, replacing the previous file in one rename.
    pub fn save(&self, state: &DeskState) -> Result<(), CacheError> {
        let content = serde_json::to_string_pretty(state)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        atomic_write(&self.path, &content)
    }
}

fn atomic_write(path: &Path, content: &str) -> Result<(), CacheError> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Wraps a view so every render also refreshes the cache file.
pub(crate) struct CachingView {
    inner: Arc<dyn DeskView>,
    cache: LocalCache,
}

impl CachingView {
    pub(crate) fn new(inner: Arc<dyn DeskView>, cache: LocalCache) -> Self {
        Self { inner, cache }
    }
}

impl DeskView for CachingView {
    fn render(&self, state: &DeskState) {
        self.inner.render(state);
        if let Err(e) = self.cache.save(state) {
            warn!(path = %self.cache.path.display(), error = %e, "Failed to save desk cache");
        }
    }

    fn notify_failure(&self, message: &str) {
        self.inner.notify_failure(message);
    }
}
