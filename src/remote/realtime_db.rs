use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;

use super::RemoteStore;
use crate::config::RemoteSettings;
use crate::domain::{RatingRecord, RawRecord};
use crate::http::JsonClient;

/// Firebase Realtime Database REST client
pub struct RealtimeDbClient {
    client: JsonClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

impl RealtimeDbClient {
    pub fn new(settings: &RemoteSettings) -> Result<Self> {
        let client = JsonClient::new(&settings.user_agent, settings.timeout())?;

        Ok(Self {
            client,
            base_url: settings.database_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_collection_url(&self, collection: &str) -> String {
        format!("{}/{}.json", self.base_url, collection.trim_matches('/'))
    }
}

#[async_trait]
impl RemoteStore for RealtimeDbClient {
    async fn append_record(&self, collection: &str, record: &RatingRecord) -> Result<String> {
        let url = self.build_collection_url(collection);

        let response: PushResponse = self
            .client
            .post_json(&url, record)
            .await
            .with_context(|| format!("Failed to append rating to {}", collection))?;

        info!("Saved rating to {} with key {}", collection, response.name);
        Ok(response.name)
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<RawRecord>> {
        let url = self.build_collection_url(collection);

        let snapshot: Value = self
            .client
            .get_json(&url)
            .await
            .with_context(|| format!("Failed to fetch ratings from {}", collection))?;

        let records = records_from_snapshot(snapshot);
        info!("Fetched {} rating records from {}", records.len(), collection);
        Ok(records)
    }
}

/// Flatten a collection snapshot into its child records.
/// The backend answers `null` for an empty collection, an object keyed by push id,
/// or an array when every key is a small integer.
pub fn records_from_snapshot(snapshot: Value) -> Vec<RawRecord> {
    match snapshot {
        Value::Null => Vec::new(),
        Value::Object(children) => children.into_iter().map(|(_, v)| RawRecord::from(v)).collect(),
        Value::Array(children) => children
            .into_iter()
            .filter(|v| !v.is_null())
            .map(RawRecord::from)
            .collect(),
        other => {
            warn!("Unexpected collection snapshot: {}", other);
            Vec::new()
        }
    }
}
