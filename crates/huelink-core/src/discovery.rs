// ── Light discovery ──
//
// One authenticated listing per run. The raw response is written to a
// diagnostic snapshot before any parsing, then each record's `id` becomes
// a `Device`. Records without a usable id are skipped, not fatal.

use std::path::PathBuf;

use huelink_api::ClipClient;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::storage::write_atomic;

/// A controllable light, identified by the bridge-assigned resource id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub id: String,
}

/// Lists the lights behind a bridge.
pub struct DeviceDiscovery<'a> {
    clip: &'a ClipClient,
    snapshot_path: PathBuf,
}

impl<'a> DeviceDiscovery<'a> {
    /// `clip` must already carry the application key.
    pub fn new(clip: &'a ClipClient, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            clip,
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Fetch the light collection, in the order the bridge reports it.
    ///
    /// Auth rejection surfaces as [`CoreError::AuthFailure`], network
    /// problems as [`CoreError::TransportFailure`].
    pub async fn list(&self) -> Result<Vec<Device>, CoreError> {
        let raw = self.clip.list_lights().await?;
        self.write_snapshot(&raw);

        let Some(entries) = raw.get("data").and_then(Value::as_array) else {
            return Err(CoreError::Api {
                message: "light listing has no `data` array".into(),
            });
        };

        let devices: Vec<Device> = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let id = entry
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|id| !id.is_empty());
                if id.is_none() {
                    warn!(index, "skipping light record without a usable id");
                }
                id.map(|id| Device { id: id.to_owned() })
            })
            .collect();

        info!(
            found = devices.len(),
            skipped = entries.len() - devices.len(),
            "discovered lights"
        );
        Ok(devices)
    }

    /// Best effort: failures are logged, never returned.
    fn write_snapshot(&self, raw: &Value) {
        let pretty = match serde_json::to_vec_pretty(raw) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "cannot serialize light snapshot");
                return;
            }
        };
        match write_atomic(&self.snapshot_path, &pretty) {
            Ok(()) => debug!(path = %self.snapshot_path.display(), "light snapshot written"),
            Err(e) => warn!(error = %e, "cannot write light snapshot"),
        }
    }
}
