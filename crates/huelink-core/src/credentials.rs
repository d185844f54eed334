// ── Pairing credentials and their on-disk store ──
//
// The bridge issues an application key ("username") and a client key
// exactly once per pairing. They are persisted as pretty JSON and only
// ever replaced wholesale.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::storage::write_atomic;

/// Application key pair issued by the bridge. Both halves are non-empty.
#[derive(Clone)]
pub struct Credentials {
    username: SecretString,
    client_key: SecretString,
}

impl Credentials {
    /// Validate and wrap a freshly issued or freshly loaded key pair.
    pub fn new(username: String, client_key: String) -> Result<Self, String> {
        if username.trim().is_empty() {
            return Err("username is empty".into());
        }
        if client_key.trim().is_empty() {
            return Err("clientkey is empty".into());
        }
        Ok(Self {
            username: SecretString::from(username),
            client_key: SecretString::from(client_key),
        })
    }

    /// The application key sent as `hue-application-key`.
    pub fn username(&self) -> &SecretString {
        &self.username
    }

    /// The client key (used for the entertainment streaming API).
    pub fn client_key(&self) -> &SecretString {
        &self.client_key
    }
}

impl PartialEq for Credentials {
    fn eq(&self, other: &Self) -> bool {
        self.username.expose_secret() == other.username.expose_secret()
            && self.client_key.expose_secret() == other.client_key.expose_secret()
    }
}

impl Eq for Credentials {}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &"[REDACTED]")
            .field("client_key", &"[REDACTED]")
            .finish()
    }
}

// ── File format ─────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct StoredCredentials {
    username: String,
    clientkey: String,
}

#[derive(Deserialize)]
struct PairingReplyRecord {
    success: StoredCredentials,
}

/// Accepted shapes: our own `{username, clientkey}` object, or the raw
/// `[{"success": {...}}]` pairing reply older tools saved verbatim.
#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialFile {
    Native(StoredCredentials),
    PairingReply(Vec<PairingReplyRecord>),
}

// ── Store ───────────────────────────────────────────────────────────

/// Result of reading the credentials file.
#[derive(Debug, PartialEq, Eq)]
pub enum CredentialLookup {
    Found(Credentials),
    /// No file yet; pair first.
    NotFound,
    /// The file exists but is unusable; pair again and overwrite it.
    Corrupt { reason: String },
}

/// Credentials persisted in a single JSON file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read persisted credentials. Never fails: an unreadable file is
    /// reported as [`CredentialLookup::Corrupt`] so the caller re-pairs.
    pub fn load(&self) -> CredentialLookup {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored credentials");
                return CredentialLookup::NotFound;
            }
            Err(e) => {
                return CredentialLookup::Corrupt {
                    reason: format!("unreadable: {e}"),
                };
            }
        };

        let stored = match serde_json::from_str::<CredentialFile>(&contents) {
            Ok(CredentialFile::Native(stored)) => stored,
            Ok(CredentialFile::PairingReply(mut records)) if records.len() == 1 => {
                records.remove(0).success
            }
            Ok(CredentialFile::PairingReply(records)) => {
                return CredentialLookup::Corrupt {
                    reason: format!("expected one pairing record, found {}", records.len()),
                };
            }
            Err(_) => {
                return CredentialLookup::Corrupt {
                    reason: "not a credentials document (need username and clientkey)".into(),
                };
            }
        };

        match Credentials::new(stored.username, stored.clientkey) {
            Ok(creds) => CredentialLookup::Found(creds),
            Err(reason) => CredentialLookup::Corrupt { reason },
        }
    }

    /// Atomically replace the persisted credentials.
    pub fn save(&self, credentials: &Credentials) -> Result<(), CoreError> {
        let stored = StoredCredentials {
            username: credentials.username.expose_secret().to_owned(),
            clientkey: credentials.client_key.expose_secret().to_owned(),
        };
        let json = serde_json::to_string_pretty(&stored).map_err(|e| CoreError::Storage {
            path: self.path.clone(),
            source: std::io::Error::other(e),
        })?;
        write_atomic(&self.path, json.as_bytes())?;
        debug!(path = %self.path.display(), "credentials saved");
        Ok(())
    }
}
