//! Catalog cache with a time-to-live
//!
//! A single cache slot owned by the resolver (no global state). Expiry is
//! checked lazily on read; there is no background sweeper. Readers share
//! the slot, invalidation takes the write lock for a pure local clear.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use super::Catalog;

/// Default cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    stored_at: Instant,
    catalog: Arc<Catalog>,
}

/// TTL-bounded cache slot for the loaded catalog.
pub struct CatalogCache {
    ttl: Duration,
    slot: RwLock<Option<CacheEntry>>,
}

impl CatalogCache {
    /// Create an empty cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached catalog unless the entry has expired.
    pub fn get(&self) -> Option<Arc<Catalog>> {
        let guard = self.slot.read().expect("catalog cache lock poisoned");
        let entry = guard.as_ref()?;

        let age = entry.stored_at.elapsed();
        if age > self.ttl {
            tracing::debug!(?age, "catalog cache entry expired");
            return None;
        }

        tracing::trace!(?age, "catalog cache hit");
        Some(Arc::clone(&entry.catalog))
    }

    /// Store a freshly loaded catalog.
    pub fn put(&self, catalog: Arc<Catalog>) {
        let mut guard = self.slot.write().expect("catalog cache lock poisoned");
        *guard = Some(CacheEntry {
            stored_at: Instant::now(),
            catalog,
        });
    }

    /// Remove the cached entry. Idempotent, never fails.
    pub fn clear(&self) {
        let mut guard = self.slot.write().expect("catalog cache lock poisoned");
        if guard.take().is_some() {
            tracing::debug!("catalog cache invalidated");
        }
    }
}
