// Async HTTP client for the CLIP v2 light resource.
//
// Base path: /clip/v2/resource/
// Auth: hue-application-key header

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

use super::types::{ClipResponse, LightUpdate, ResourceIdentifier, UpdateAck};
use crate::error::{Error, preview};
use crate::retry::RetryPolicy;
use crate::transport::TransportConfig;

/// Header carrying the application key (the v1 "username").
pub const APPLICATION_KEY_HEADER: &str = "hue-application-key";

/// Largest body a healthy update acknowledgment produces. Only consulted
/// when the body cannot be decoded as a CLIP envelope.
pub const MAX_ACK_BYTES: usize = 88;

/// Client for the bridge's CLIP v2 light endpoints.
pub struct ClipClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl ClipClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an application key and transport config.
    ///
    /// Injects `hue-application-key` as a default header on every request.
    pub fn from_application_key(
        base_url: Url,
        application_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(application_key.expose_secret())
            .map_err(|_| Error::InvalidApplicationKey)?;
        key_value.set_sensitive(true);
        headers.insert(APPLICATION_KEY_HEADER, key_value);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url,
            retry: transport.retry,
            cancel: CancellationToken::new(),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: Url, http: reqwest::Client, retry: RetryPolicy) -> Self {
        Self {
            http,
            base_url,
            retry,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop retrying failed connections once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// `clip/v2/resource/light/{id}`, with `id` escaped as one path segment.
    fn light_url(&self, id: &str) -> Result<Url, Error> {
        let mut url = self.url("clip/v2/resource/light")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id);
        Ok(url)
    }

    // ── Lights ───────────────────────────────────────────────────────

    /// `GET /clip/v2/resource/light`, returned as raw JSON.
    pub async fn list_lights(&self) -> Result<serde_json::Value, Error> {
        let url = self.url("clip/v2/resource/light")?;
        debug!("GET {url}");

        let resp = self
            .retry
            .send_cancellable(&self.cancel, || self.http.get(url.clone()))
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        trace!(%status, bytes = body.len(), "light listing received");

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(Error::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(Error::Clip {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    /// `PUT /clip/v2/resource/light/{id}` with the given state.
    pub async fn update_light(&self, id: &str, update: &LightUpdate) -> Result<UpdateAck, Error> {
        let url = self.light_url(id)?;
        debug!("PUT {url}");

        let resp = self
            .retry
            .send_cancellable(&self.cancel, || self.http.put(url.clone()).json(update))
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        trace!(%status, bytes = body.len(), "update acknowledgment received");

        validate_update_response(status, &body)
    }
}

/// Classify the bridge's answer to a light update.
///
/// Any explicit error in a JSON body is a rejection: a non-empty `errors`
/// array, an `error` object, or a v1-style `[{"error": ...}]` list. The
/// byte-length bound only applies when the body is not a CLIP envelope at
/// all, since an oversized undecodable body is almost always an error page.
pub fn validate_update_response(status: StatusCode, body: &str) -> Result<UpdateAck, Error> {
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(Error::Unauthorized {
            status: status.as_u16(),
        });
    }

    let decoded = serde_json::from_str::<Value>(body).ok();
    if let Some(value) = &decoded {
        let reasons = explicit_errors(value);
        if !reasons.is_empty() {
            return Err(Error::Rejected {
                status: status.as_u16(),
                reasons,
            });
        }
    }

    if !status.is_success() {
        let reason = if decoded.is_some() {
            format!("HTTP {status}")
        } else {
            preview(body).to_owned()
        };
        return Err(Error::Rejected {
            status: status.as_u16(),
            reasons: vec![reason],
        });
    }

    match decoded.map(serde_json::from_value::<ClipResponse<ResourceIdentifier>>) {
        Some(Ok(envelope)) => Ok(UpdateAck {
            updated: envelope.data,
        }),
        _ if body.len() > MAX_ACK_BYTES => Err(Error::Rejected {
            status: status.as_u16(),
            reasons: vec![format!(
                "oversized unstructured acknowledgment ({} bytes): {}",
                body.len(),
                preview(body)
            )],
        }),
        _ => Ok(UpdateAck::default()),
    }
}

/// Error descriptions carried by a decoded body, in any shape the bridge uses.
fn explicit_errors(value: &Value) -> Vec<String> {
    let describe = |entry: &Value| {
        entry
            .get("description")
            .and_then(Value::as_str)
            .map_or_else(|| entry.to_string(), str::to_owned)
    };

    match value {
        Value::Object(map) => {
            let mut reasons: Vec<String> = map
                .get("errors")
                .and_then(Value::as_array)
                .map(|errors| errors.iter().map(describe).collect())
                .unwrap_or_default();
            if let Some(error) = map.get("error").filter(|e| !e.is_null()) {
                reasons.push(describe(error));
            }
            reasons
        }
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("error"))
            .filter(|e| !e.is_null())
            .map(describe)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clean_ack_is_success() {
        let body = r#"{"data":[{"rid":"3f2a","rtype":"light"}],"errors":[]}"#;
        let ack = validate_update_response(StatusCode::OK, body).unwrap();
        assert_eq!(ack.updated.len(), 1);
        assert_eq!(ack.updated[0].rid, "3f2a");
    }

    #[test]
    fn error_entries_reject_even_when_short() {
        let body = r#"{"data":[],"errors":[{"description":"x"}]}"#;
        let err = validate_update_response(StatusCode::OK, body).unwrap_err();
        match err {
            Error::Rejected { reasons, .. } => assert_eq!(reasons, vec!["x".to_owned()]),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn error_entry_without_description_is_rejected() {
        let body = r#"{"errors":[{"code":1}]}"#;
        let err = validate_update_response(StatusCode::OK, body).unwrap_err();
        match err {
            Error::Rejected { reasons, .. } => {
                assert_eq!(reasons, vec![r#"{"code":1}"#.to_owned()]);
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn single_error_object_is_rejected() {
        let body = r#"{"error":{"description":"bad"}}"#;
        let err = validate_update_response(StatusCode::OK, body).unwrap_err();
        match err {
            Error::Rejected { reasons, .. } => assert_eq!(reasons, vec!["bad".to_owned()]),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn v1_error_list_is_rejected() {
        let body = r#"[{"error":{"type":3,"address":"/lights/1","description":"resource not available"}}]"#;
        let err = validate_update_response(StatusCode::OK, body).unwrap_err();
        match err {
            Error::Rejected { reasons, .. } => {
                assert_eq!(reasons, vec!["resource not available".to_owned()]);
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn v1_success_list_is_accepted() {
        let body = r#"[{"success":{"/lights/1/state/on":true}}]"#;
        assert!(validate_update_response(StatusCode::OK, body).is_ok());
    }

    #[test]
    fn large_structured_ack_is_not_rejected_by_size() {
        let ids: Vec<String> = (0..5)
            .map(|i| format!(r#"{{"rid":"0000000{i}-aaaa-bbbb-cccc-dddddddddddd","rtype":"light"}}"#))
            .collect();
        let body = format!(r#"{{"data":[{}],"errors":[]}}"#, ids.join(","));
        assert!(body.len() > MAX_ACK_BYTES);
        assert!(validate_update_response(StatusCode::OK, &body).is_ok());
    }

    #[test]
    fn oversized_unstructured_body_is_rejected() {
        let body = "<html>".repeat(20);
        let err = validate_update_response(StatusCode::OK, &body).unwrap_err();
        assert!(matches!(err, Error::Rejected { .. }));
    }

    #[test]
    fn short_unstructured_body_is_accepted() {
        assert!(validate_update_response(StatusCode::OK, "").is_ok());
    }

    #[test]
    fn forbidden_is_unauthorized() {
        let err = validate_update_response(StatusCode::FORBIDDEN, "{}").unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn server_error_is_rejected() {
        let body = r#"{"data":[],"errors":[]}"#;
        let err = validate_update_response(StatusCode::SERVICE_UNAVAILABLE, body).unwrap_err();
        assert!(matches!(err, Error::Rejected { status: 503, .. }));
    }
}
