use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::keys::StorageKey;

/// Durable per-device key-value store
pub trait LocalStore: Send + Sync {
    fn get(&self, key: StorageKey) -> Result<Option<String>>;

    fn set(&self, key: StorageKey, value: &str) -> Result<()>;

    fn remove(&self, key: StorageKey) -> Result<()>;
}

/// Load a JSON document. Unreadable or corrupt documents are removed and read as absent.
pub fn read_json<T: DeserializeOwned>(store: &dyn LocalStore, key: StorageKey) -> Option<T> {
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read {} from local store: {:#}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                "Discarding corrupt {} entry: {}. First 200 chars: {}",
                key,
                e,
                &text[..floor_char_boundary(&text, 200)]
            );
            discard(store, key);
            None
        }
    }
}

pub fn write_json<T: Serialize>(store: &dyn LocalStore, key: StorageKey, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize {}", key))?;
    store.set(key, &json)
}

/// Remove a key, logging instead of failing
pub fn discard(store: &dyn LocalStore, key: StorageKey) {
    if let Err(e) = store.remove(key) {
        warn!("Failed to remove {} from local store: {:#}", key, e);
    }
}

fn floor_char_boundary(text: &str, max: usize) -> usize {
    let mut end = text.len().min(max);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}
