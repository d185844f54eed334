// v1 pairing endpoint
//
// `POST /api` asks the bridge for a new application key. Until somebody
// presses the physical link button the bridge answers with error type 101;
// afterwards it answers once with the generated username and client key.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, preview};
use crate::retry::RetryPolicy;
use crate::transport::TransportConfig;

/// Error `type` the bridge reports while the link button has not been pressed.
pub const LINK_BUTTON_NOT_PRESSED: u16 = 101;

#[derive(Debug, Serialize)]
struct PairingRequest<'a> {
    devicetype: &'a str,
    generateclientkey: bool,
}

/// One record of a v1 reply: `{"success": {...}}` or `{"error": {...}}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LinkRecord {
    Success(GrantedKey),
    Error(BridgeError),
}

#[derive(Debug, Deserialize)]
struct BridgeError {
    #[serde(rename = "type")]
    kind: u16,
    #[serde(default)]
    address: String,
    #[serde(default)]
    description: String,
}

/// Credentials issued by the bridge after the link button was pressed.
#[derive(Clone, Deserialize)]
pub struct GrantedKey {
    pub username: String,
    pub clientkey: String,
}

impl fmt::Debug for GrantedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrantedKey")
            .field("username", &"[REDACTED]")
            .field("clientkey", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of a single pairing attempt that reached the bridge.
#[derive(Debug, Clone)]
pub enum LinkResponse {
    /// The bridge issued a new application key.
    Granted(GrantedKey),
    /// Nobody has pressed the link button yet.
    LinkButtonNotPressed,
}

/// Client for the bridge's v1 pairing endpoint.
pub struct LinkClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl LinkClient {
    /// Build from a bridge base URL (e.g. `https://192.168.1.20/`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            retry: transport.retry,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, retry: RetryPolicy) -> Self {
        Self {
            http,
            base_url,
            retry,
        }
    }

    /// The bridge base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ask the bridge for a new application key and client key.
    ///
    /// Returns [`LinkResponse::LinkButtonNotPressed`] while the bridge is
    /// waiting for physical confirmation. Every other error record, a reply
    /// with anything but exactly one record, or a non-JSON body is an error.
    pub async fn request_client_key(&self, devicetype: &str) -> Result<LinkResponse, Error> {
        let url = self.base_url.join("api")?;
        debug!("POST {url}");

        let body = PairingRequest {
            devicetype,
            generateclientkey: true,
        };
        let resp = self
            .retry
            .send(|| self.http.post(url.clone()).json(&body))
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(Error::UnexpectedResponse(format!(
                "HTTP {status}: {}",
                preview(&text)
            )));
        }

        parse_link_reply(&text)
    }
}

fn parse_link_reply(body: &str) -> Result<LinkResponse, Error> {
    let mut records: Vec<LinkRecord> =
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        })?;

    if records.len() != 1 {
        return Err(Error::UnexpectedResponse(format!(
            "expected exactly one record, got {}",
            records.len()
        )));
    }

    match records.remove(0) {
        LinkRecord::Success(key) => Ok(LinkResponse::Granted(key)),
        LinkRecord::Error(err) if err.kind == LINK_BUTTON_NOT_PRESSED => {
            Ok(LinkResponse::LinkButtonNotPressed)
        }
        LinkRecord::Error(err) => Err(Error::Bridge {
            kind: err.kind,
            address: err.address,
            description: err.description,
        }),
    }
}
