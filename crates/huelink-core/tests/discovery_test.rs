#![allow(clippy::unwrap_used)]
// Light discovery against a mock bridge.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use huelink_api::{ClipClient, RetryPolicy, TransportConfig};
use huelink_core::{CoreError, Device, DeviceDiscovery};

async fn setup() -> (MockServer, ClipClient) {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        retry: RetryPolicy::none(),
        ..TransportConfig::default()
    };
    let key = SecretString::from("app-key".to_owned());
    let clip =
        ClipClient::from_application_key(Url::parse(&server.uri()).unwrap(), &key, &transport)
            .unwrap();
    (server, clip)
}

#[tokio::test]
async fn test_records_without_ids_are_skipped() {
    let (server, clip) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("lights.json");

    let listing = json!({
        "errors": [],
        "data": [
            { "id": "first", "type": "light" },
            { "type": "light" },
            { "id": "  ", "type": "light" },
            { "id": 42, "type": "light" },
            { "id": "last", "type": "light" }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .and(header("hue-application-key", "app-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&listing))
        .expect(1)
        .mount(&server)
        .await;

    let devices = DeviceDiscovery::new(&clip, &snapshot).list().await.unwrap();

    assert_eq!(
        devices,
        vec![
            Device { id: "first".into() },
            Device { id: "last".into() }
        ]
    );

    let written = std::fs::read_to_string(&snapshot).unwrap();
    assert!(written.contains('\n'), "snapshot should be pretty-printed");
    let written: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(written, listing);
}

#[tokio::test]
async fn test_empty_listing_is_not_an_error() {
    let (server, clip) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errors": [], "data": [] })))
        .mount(&server)
        .await;

    let devices = DeviceDiscovery::new(&clip, dir.path().join("lights.json"))
        .list()
        .await
        .unwrap();

    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_forbidden_is_auth_failure() {
    let (server, clip) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": [{ "description": "unauthorized user" }],
            "data": []
        })))
        .mount(&server)
        .await;

    let err = DeviceDiscovery::new(&clip, dir.path().join("lights.json"))
        .list()
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::AuthFailure { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_listing_without_data_is_api_error() {
    let (server, clip) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errors": [] })))
        .mount(&server)
        .await;

    let err = DeviceDiscovery::new(&clip, dir.path().join("lights.json"))
        .list()
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Api { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_unwritable_snapshot_does_not_fail_discovery() {
    let (server, clip) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the snapshot's parent directory should be.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "data": [{ "id": "only" }]
        })))
        .mount(&server)
        .await;

    let devices = DeviceDiscovery::new(&clip, blocker.join("lights.json"))
        .list()
        .await
        .unwrap();

    assert_eq!(devices.len(), 1);
}
