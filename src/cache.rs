//! Per-process memoization of gallery reads.
//!
//! Gallery data is a pure function of what is on disk, and the site is
//! redeployed whenever photos change, so every read operation is computed at
//! most once per [`MemoCache`] and then served from memory.
//!
//! # Design
//!
//! The cache is keyed by the full call signature ([`CacheKey`]: operation
//! plus arguments), so two operations never share an entry even when their
//! results happen to be equal.
//!
//! - **No eviction.** The owning process bounds the cache's lifetime.
//! - **No invalidation**, except the explicit [`MemoCache::clear`] hook used
//!   by tests and by long-running hosts that want to pick up new folders.
//! - **Errors are not cached.** A failed scan is retried on the next call.
//! - **No lock held while computing.** Two threads that miss on the same key
//!   both compute; the results are identical, and the last insert wins.

use crate::types::{GalleryCollection, GalleryKind, GallerySummary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Operation plus arguments identifying one memoized read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Summaries(GalleryKind),
    AllSummaries,
    Collection(GalleryKind, String),
    Slugs(GalleryKind),
    Featured(usize),
}

/// A memoized result. Payloads are shared, so hits are cheap to hand out.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Collections(Arc<Vec<GalleryCollection>>),
    Collection(Option<Arc<GalleryCollection>>),
    Slugs(Arc<Vec<String>>),
    Summaries(Arc<Vec<GallerySummary>>),
}

#[derive(Debug, Default)]
pub struct MemoCache {
    entries: Mutex<HashMap<CacheKey, CachedValue>>,
}

impl MemoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// `compute` runs without the cache lock held.
    pub fn get_or_try_insert<E>(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> Result<CachedValue, E>,
    ) -> Result<CachedValue, E> {
        if let Some(hit) = self.lock().get(&key).cloned() {
            debug!(?key, "gallery cache hit");
            return Ok(hit);
        }

        let value = compute()?;
        self.lock().insert(key, value.clone());
        Ok(value)
    }

    /// Look up a key without computing anything.
    pub fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        self.lock().get(key).cloned()
    }

    /// Drop every entry; the next read of each key rescans the file system.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The map holds only finished values, so a panic elsewhere cannot leave
    /// it half-written; recover from poisoning instead of propagating it.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CachedValue>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
