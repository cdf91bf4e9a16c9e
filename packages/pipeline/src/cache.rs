//! Content-keyed memoization of loaded sources.
//!
//! Each slot remembers one loaded value and the digest of the bytes (plus
//! parse options) it came from. Loading different content replaces the
//! slot, which is how a new upload invalidates the previous one.

use std::fmt;
use std::sync::Arc;

use climate_map_boundaries_models::BoundarySet;
use climate_map_dataset_models::Dataset;
use sha2::{Digest, Sha256};

/// SHA-256 hex digest identifying a source and the options it was parsed
/// with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey(String);

impl ContentKey {
    /// Digest of `bytes` alone.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// Digest of `bytes` followed by a description of the parse options,
    /// so the same file read two ways gets two keys.
    #[must_use]
    pub fn with_options(bytes: &[u8], options: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hasher.update([0]);
        hasher.update(options.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// The hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0[..12.min(self.0.len())])
    }
}

/// A single-slot memo.
#[derive(Debug)]
pub struct Memo<T> {
    label: &'static str,
    slot: Option<(ContentKey, Arc<T>)>,
    hits: u64,
    misses: u64,
}

impl<T> Memo<T> {
    /// An empty memo; `label` names it in log output.
    #[must_use]
    pub const fn new(label: &'static str) -> Self {
        Self {
            label,
            slot: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cached value for `key`, or runs `load` and caches its
    /// result. Failed loads leave the memo untouched.
    ///
    /// # Errors
    ///
    /// Propagates the error from `load`.
    pub fn get_or_try_load<E>(
        &mut self,
        key: ContentKey,
        load: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        if let Some((cached, value)) = &self.slot
            && *cached == key
        {
            self.hits += 1;
            log::debug!("{} cache hit ({key})", self.label);
            return Ok(Arc::clone(value));
        }

        self.misses += 1;
        log::debug!("{} cache miss ({key})", self.label);

        let value = Arc::new(load()?);
        if self.slot.is_some() {
            log::info!("Replacing cached {} with {key}", self.label);
        }
        self.slot = Some((key, Arc::clone(&value)));
        Ok(value)
    }

    /// Key of the cached value, if any.
    #[must_use]
    pub fn current_key(&self) -> Option<&ContentKey> {
        self.slot.as_ref().map(|(key, _)| key)
    }

    /// Drops the cached value.
    pub fn invalidate(&mut self) {
        if self.slot.take().is_some() {
            log::debug!("{} cache invalidated", self.label);
        }
    }

    /// Lookups answered from the slot.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that ran the loader.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}

/// The datasets and boundaries memos used by a pipeline.
#[derive(Debug)]
pub struct LoadCache {
    /// Loaded tabular source.
    pub datasets: Memo<Dataset>,
    /// Loaded boundary archive.
    pub boundaries: Memo<BoundarySet>,
}

impl Default for LoadCache {
    fn default() -> Self {
        Self {
            datasets: Memo::new("dataset"),
            boundaries: Memo::new("boundaries"),
        }
    }
}

impl LoadCache {
    /// Clears both memos.
    pub fn invalidate(&mut self) {
        self.datasets.invalidate();
        self.boundaries.invalidate();
    }
}
