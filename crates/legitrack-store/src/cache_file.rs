//! JSON file backing for the [`ChangeCache`].

use std::path::{Path, PathBuf};

use legitrack_core::ChangeCache;
use tracing::info;

use crate::StoreError;
use crate::fsutil::{read_json, write_json};

/// The change cache on disk: `{bill_id: {change_hash, last_checked}}`.
///
/// Every save rewrites the whole file.
#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache. A missing file is an empty cache, not an error.
    pub fn load(&self) -> Result<ChangeCache, StoreError> {
        let cache = read_json::<ChangeCache>(&self.path)?.unwrap_or_default();
        info!(entries = cache.len(), path = %self.path.display(), "loaded change cache");
        Ok(cache)
    }

    /// Overwrite the file with `cache`.
    pub fn save(&self, cache: &ChangeCache) -> Result<(), StoreError> {
        write_json(&self.path, cache)?;
        info!(entries = cache.len(), path = %self.path.display(), "cache written");
        Ok(())
    }
}
