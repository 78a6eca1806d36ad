//! Run-scoped memoization of backend queries.
//!
//! One [`QueryCache`] lives for one run and is shared (behind an `Arc`) by
//! every [`HistoryAccessor`](crate::HistoryAccessor) taking part in it,
//! including accessors owned by different worker threads. Entries are never
//! evicted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::region::DiffRegion;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct OriginKey {
    path: String,
    line: u32,
    commit: String,
}

impl OriginKey {
    fn new(path: &str, line: u32, commit: &str) -> Self {
        Self {
            path: path.to_string(),
            line,
            commit: commit.to_string(),
        }
    }
}

/// Thread-safe cache of blame origins and diff regions.
///
/// Origins are keyed by the `(path, line, commit)` triple; a stored `None`
/// means the backend had no answer and will not be asked again.
///
/// # Examples
///
/// ```
/// use faultline_history::QueryCache;
///
/// let cache = QueryCache::new();
/// assert!(cache.origin("a.py", 3, "c0ffee").is_none());
/// cache.store_origin("a.py", 3, "c0ffee", Some("beef".into()));
/// assert_eq!(cache.origin("a.py", 3, "c0ffee"), Some(Some("beef".into())));
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct QueryCache {
    origins: RwLock<HashMap<OriginKey, Option<String>>>,
    regions: RwLock<HashMap<String, DiffRegion>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Snapshot of cache effectiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to go to the backend.
    pub misses: u64,
    /// Memoized blame origins.
    pub origins: usize,
    /// Memoized diff regions.
    pub regions: usize,
}

impl QueryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the memoized origin of `path:line` as of `commit`'s parent.
    pub fn origin(&self, path: &str, line: u32, commit: &str) -> Option<Option<String>> {
        let found = self
            .origins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&OriginKey::new(path, line, commit))
            .cloned();
        self.count(found.is_some());
        found
    }

    /// Memoize an origin.
    pub fn store_origin(&self, path: &str, line: u32, commit: &str, origin: Option<String>) {
        self.origins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(OriginKey::new(path, line, commit), origin);
    }

    /// Look up the memoized diff region of `commit`.
    pub fn region(&self, commit: &str) -> Option<DiffRegion> {
        let found = self
            .regions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(commit)
            .cloned();
        self.count(found.is_some());
        found
    }

    /// Memoize a diff region.
    pub fn store_region(&self, commit: &str, region: DiffRegion) {
        self.regions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(commit.to_string(), region);
    }

    /// Current hit/miss counters and sizes.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            origins: self
                .origins
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
            regions: self
                .regions
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
        }
    }

    fn count(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
