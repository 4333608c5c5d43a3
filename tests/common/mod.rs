#![allow(dead_code)]

use general_rating::config::{AppConfig, RemoteSettings};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const COLLECTION_PATH: &str = "/ratings.json";

pub struct TestEnv {
    pub server: MockServer,
    pub store_dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            store_dir: TempDir::new().unwrap(),
        }
    }

    pub fn store_path(&self) -> String {
        self.store_dir.path().join("general_rating.db").to_string_lossy().into_owned()
    }

    pub fn remote_settings(&self) -> RemoteSettings {
        RemoteSettings {
            database_url: self.server.uri(),
            timeout_secs: 5,
            refetch_delay_ms: 0,
            ..RemoteSettings::default()
        }
    }

    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::new();
        config.remote = self.remote_settings();
        config.store.path = self.store_path();
        config
    }

    pub async fn mock_snapshot(&self, snapshot: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(COLLECTION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(snapshot))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_push(&self, key: &str) {
        Mock::given(method("POST"))
            .and(path(COLLECTION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": key })))
            .mount(&self.server)
            .await;
    }
}

pub fn rating_json(humble: u8, considerate: u8, kind: u8, smart: u8) -> serde_json::Value {
    serde_json::json!({
        "humble": humble,
        "considerate": considerate,
        "kind": kind,
        "smart": smart,
        "timestamp": 1_700_000_000_000_i64,
        "deviceId": "GeneralRating/test",
    })
}
