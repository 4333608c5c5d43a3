pub mod memory;
pub mod realtime_db;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{RatingRecord, RawRecord};

pub use memory::InMemoryRemote;
pub use realtime_db::RealtimeDbClient;

/// Hosted document store holding every submitted rating
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Append one record, returning the key assigned by the backend
    async fn append_record(&self, collection: &str, record: &RatingRecord) -> Result<String>;

    /// Every record in the collection, unvalidated
    async fn fetch_all(&self, collection: &str) -> Result<Vec<RawRecord>>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    async fn append_record(&self, collection: &str, record: &RatingRecord) -> Result<String> {
        self.as_ref().append_record(collection, record).await
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<RawRecord>> {
        self.as_ref().fetch_all(collection).await
    }
}
