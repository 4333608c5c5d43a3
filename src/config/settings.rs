use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::cache::FRESHNESS_WINDOW_MS;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub freshness_window_ms: i64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            freshness_window_ms: FRESHNESS_WINDOW_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub database_url: String,
    pub collection: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Wait before re-reading the collection after a submission
    pub refetch_delay_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            database_url: "https://youthinksonchd-default-rtdb.firebaseio.com".to_string(),
            collection: "ratings".to_string(),
            user_agent: format!("GeneralRating/{}", APP_VERSION),
            timeout_secs: 10,
            refetch_delay_ms: 1500,
        }
    }
}

impl RemoteSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refetch_delay(&self) -> Duration {
        Duration::from_millis(self.refetch_delay_ms)
    }
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: "general_rating.db".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VoteSettings {
    /// Bumping this resets every device's vote and cache once
    pub app_version: String,
}

impl Default for VoteSettings {
    fn default() -> Self {
        Self {
            app_version: APP_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub cache: CacheSettings,
    pub remote: RemoteSettings,
    pub store: StoreSettings,
    pub vote: VoteSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `GENERAL_RATING_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(url) = lookup("GENERAL_RATING_DATABASE_URL") {
            config.remote.database_url = url;
        }
        if let Some(collection) = lookup("GENERAL_RATING_COLLECTION") {
            config.remote.collection = collection;
        }
        if let Some(path) = lookup("GENERAL_RATING_STORE_PATH") {
            config.store.path = path;
        }
        if let Some(version) = lookup("GENERAL_RATING_APP_VERSION") {
            config.vote.app_version = version;
        }
        config.remote.timeout_secs = parse_or(
            &lookup,
            "GENERAL_RATING_FETCH_TIMEOUT_SECS",
            config.remote.timeout_secs,
        );

        config
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default {default}");
        default
    })
}
