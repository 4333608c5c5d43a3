use std::sync::Arc;

use anyhow::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::AggregateRating;
use crate::storage::{self, LocalStore, StorageKey};

/// Default freshness window: five minutes
pub const FRESHNESS_WINDOW_MS: i64 = 5 * 60 * 1000;

/// A computed general rating and when it was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub aggregate: AggregateRating,
    /// Unix epoch milliseconds
    pub computed_at: i64,
}

/// Locally cached general rating with a freshness window
pub struct RatingCache {
    store: Arc<dyn LocalStore>,
    freshness_window_ms: i64,
}

impl RatingCache {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self::with_window(store, FRESHNESS_WINDOW_MS)
    }

    pub fn with_window(store: Arc<dyn LocalStore>, freshness_window_ms: i64) -> Self {
        Self {
            store,
            freshness_window_ms,
        }
    }

    /// The stored entry, if present and parseable. Corrupt entries are cleared.
    pub fn read(&self) -> Option<CacheEntry> {
        let entry: CacheEntry = storage::read_json(self.store.as_ref(), StorageKey::GeneralRatings)?;

        if !entry.aggregate.is_in_scale() {
            warn!("Discarding cached general rating with out-of-range values");
            return self.discard();
        }
        if entry.computed_at < 0 {
            warn!("Discarding cached general rating with invalid timestamp {}", entry.computed_at);
            return self.discard();
        }

        Some(entry)
    }

    /// Fresh iff `0 <= now - computed_at < window`
    pub fn is_fresh(&self, entry: &CacheEntry, now: i64) -> bool {
        match now.checked_sub(entry.computed_at) {
            Some(age) if age >= 0 => age < self.freshness_window_ms,
            _ => false,
        }
    }

    /// The stored entry if still fresh. Entries stamped after `now` are cleared.
    pub fn read_fresh(&self, now: i64) -> Option<CacheEntry> {
        let entry = self.read()?;

        if entry.computed_at > now {
            warn!("Discarding cached general rating from the future ({} > {})", entry.computed_at, now);
            return self.discard();
        }

        if self.is_fresh(&entry, now) {
            Some(entry)
        } else {
            debug!("Cached general rating from {} is stale", entry.computed_at);
            None
        }
    }

    /// Store the aggregate as a single document
    pub fn write(&self, aggregate: AggregateRating, now: i64) -> Result<CacheEntry> {
        let entry = CacheEntry {
            aggregate,
            computed_at: now,
        };
        storage::write_json(self.store.as_ref(), StorageKey::GeneralRatings, &entry)?;

        debug!("Cached general rating at {}", now);
        Ok(entry)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(StorageKey::GeneralRatings)?;
        info!("Cleared cached general rating");
        Ok(())
    }

    fn discard(&self) -> Option<CacheEntry> {
        storage::discard(self.store.as_ref(), StorageKey::GeneralRatings);
        None
    }
}
