use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

use super::RemoteStore;
use crate::domain::{RatingRecord, RawRecord};

/// Process-local remote store with switchable failures
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    collections: Mutex<HashMap<String, Vec<RawRecord>>>,
    fail_fetches: AtomicBool,
    fail_appends: AtomicBool,
    fetch_count: AtomicUsize,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with arbitrary, possibly invalid, records
    pub fn insert_raw(&self, collection: &str, record: RawRecord) {
        if let Ok(mut collections) = self.collections.lock() {
            collections.entry(collection.to_string()).or_default().push(record);
        }
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn append_record(&self, collection: &str, record: &RatingRecord) -> Result<String> {
        if self.fail_appends.load(Ordering::SeqCst) {
            bail!("Simulated append failure");
        }

        let mut collections = self
            .collections
            .lock()
            .map_err(|_| anyhow!("Remote store lock poisoned"))?;
        let records = collections.entry(collection.to_string()).or_default();
        records.push(RawRecord::from(record));

        Ok(format!("rec-{}", records.len()))
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<RawRecord>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_fetches.load(Ordering::SeqCst) {
            bail!("Simulated fetch failure");
        }

        let collections = self
            .collections
            .lock()
            .map_err(|_| anyhow!("Remote store lock poisoned"))?;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }
}
