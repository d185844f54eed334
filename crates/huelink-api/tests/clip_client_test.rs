#![allow(clippy::unwrap_used)]
// Integration tests for `ClipClient` using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use huelink_api::clip_types::{
    Color, Dimming, LightUpdate, On, Powerup, PowerupMode, PowerupPreset, Xy,
};
use huelink_api::{ClipClient, Error, RetryPolicy, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ClipClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let transport = TransportConfig {
        retry: RetryPolicy::none(),
        ..TransportConfig::default()
    };
    let key = SecretString::from("app-key-123".to_owned());
    let client = ClipClient::from_application_key(base_url, &key, &transport).unwrap();
    (server, client)
}

fn sample_update() -> LightUpdate {
    let xy = Xy { x: 0.31272, y: 0.2903 };
    LightUpdate {
        on: On { on: true },
        dimming: Dimming { brightness: 100.0 },
        color: Color { xy },
        powerup: Powerup {
            preset: PowerupPreset::Custom,
            mode: PowerupMode::Color,
            xy,
        },
    }
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_lights_sends_application_key() {
    let (server, client) = setup().await;

    let body = json!({
        "errors": [],
        "data": [
            { "id": "a1", "type": "light" },
            { "id": "b2", "type": "light" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .and(header("hue-application-key", "app-key-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client.list_lights().await.unwrap();
    assert_eq!(raw, body);
}

#[tokio::test]
async fn test_list_lights_forbidden_is_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/light"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": [{ "description": "unauthorized user" }],
            "data": []
        })))
        .mount(&server)
        .await;

    let err = client.list_lights().await.unwrap_err();
    assert!(
        matches!(err, Error::Unauthorized { status: 403 }),
        "expected Unauthorized, got: {err:?}"
    );
}

// ── Updates ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_light_puts_full_state() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/a1"))
        .and(header("hue-application-key", "app-key-123"))
        .and(body_json(json!({
            "on": { "on": true },
            "dimming": { "brightness": 100.0 },
            "color": { "xy": { "x": 0.31272, "y": 0.2903 } },
            "powerup": { "preset": "custom", "mode": "color", "xy": { "x": 0.31272, "y": 0.2903 } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "rid": "a1", "rtype": "light" }],
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client.update_light("a1", &sample_update()).await.unwrap();
    assert_eq!(ack.updated.len(), 1);
    assert_eq!(ack.updated[0].rtype, "light");
}

#[tokio::test]
async fn test_update_light_error_envelope_is_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/a1"))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!({
            "data": [],
            "errors": [{ "description": "device (light) is \"soft off\", command (.color) may not have effect" }]
        })))
        .mount(&server)
        .await;

    let err = client.update_light("a1", &sample_update()).await.unwrap_err();
    match err {
        Error::Rejected { status, reasons } => {
            assert_eq!(status, 207);
            assert_eq!(reasons.len(), 1);
            assert!(reasons[0].contains("soft off"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_light_escapes_device_id() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/a%2Fb%3Fc%23d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "rid": "a/b?c#d", "rtype": "light" }],
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client.update_light("a/b?c#d", &sample_update()).await.unwrap();
    assert_eq!(ack.updated[0].rid, "a/b?c#d");
}

#[tokio::test]
async fn test_timed_out_update_is_not_resent() {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        timeout: Duration::from_millis(50),
        retry: RetryPolicy {
            max_retries: 5,
            delay: Duration::ZERO,
        },
        ..TransportConfig::default()
    };
    let key = SecretString::from("app-key-123".to_owned());
    let client =
        ClipClient::from_application_key(Url::parse(&server.uri()).unwrap(), &key, &transport)
            .unwrap();

    Mock::given(method("PUT"))
        .and(path("/clip/v2/resource/light/a1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [], "errors": [] }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client.update_light("a1", &sample_update()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(err.is_unreachable());
}
