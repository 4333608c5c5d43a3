mod common;

use common::{COLLECTION_PATH, TestEnv, rating_json};
use general_rating::domain::{RatingRecord, TraitRatings};
use general_rating::remote::{RealtimeDbClient, RemoteStore};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_append_posts_record_and_returns_key() {
    let env = TestEnv::new().await;
    let settings = env.remote_settings();

    Mock::given(method("POST"))
        .and(path(COLLECTION_PATH))
        .and(header("user-agent", settings.user_agent.as_str()))
        .and(body_partial_json(json!({
            "humble": 80,
            "considerate": 20,
            "kind": 90,
            "smart": 10,
            "deviceId": "device-1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "-Nabc" })))
        .expect(1)
        .mount(&env.server)
        .await;

    let client = RealtimeDbClient::new(&settings).unwrap();
    let record = RatingRecord::new(TraitRatings::new(80, 20, 90, 10), 42, "device-1".to_string());

    let key = client.append_record("ratings", &record).await.unwrap();
    assert_eq!(key, "-Nabc");
}

#[tokio::test]
async fn test_fetch_empty_collection() {
    let env = TestEnv::new().await;
    env.mock_snapshot(serde_json::Value::Null).await;

    let client = RealtimeDbClient::new(&env.remote_settings()).unwrap();
    let records = client.fetch_all("ratings").await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_fetch_returns_every_child() {
    let env = TestEnv::new().await;
    env.mock_snapshot(json!({
        "-Na": rating_json(80, 20, 90, 10),
        "-Nb": rating_json(60, 40, 70, 30),
        "-Nc": {"humble": "garbage"},
    }))
    .await;

    let client = RealtimeDbClient::new(&env.remote_settings()).unwrap();
    let records = client.fetch_all("ratings").await.unwrap();

    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let env = TestEnv::new().await;
    Mock::given(method("GET"))
        .and(path(COLLECTION_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&env.server)
        .await;

    let client = RealtimeDbClient::new(&env.remote_settings()).unwrap();
    let err = client.fetch_all("ratings").await.unwrap_err();

    assert!(format!("{:#}", err).contains("Failed to fetch ratings from ratings"));
}
