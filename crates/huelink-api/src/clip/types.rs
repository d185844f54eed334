// CLIP v2 wire types for the light resource.
//
// Only the fields this client writes or inspects are modelled. Light
// listings are kept as raw JSON so that one odd record cannot poison
// the whole collection.

use serde::{Deserialize, Serialize};

/// Standard CLIP v2 envelope: `{ "errors": [...], "data": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClipResponse<T> {
    #[serde(default)]
    pub errors: Vec<ClipError>,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClipError {
    #[serde(default)]
    pub description: String,
}

/// Reference to a resource touched by a write, e.g. `{ "rid": "...", "rtype": "light" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceIdentifier {
    pub rid: String,
    pub rtype: String,
}

/// CIE 1931 chromaticity coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Xy {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct On {
    pub on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimming {
    /// Percent, 0–100.
    pub brightness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub xy: Xy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerupPreset {
    Safety,
    Powerfail,
    LastOnState,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerupMode {
    Color,
    ColorTemperature,
    Previous,
}

/// State the light assumes after a power cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Powerup {
    pub preset: PowerupPreset,
    pub mode: PowerupMode,
    pub xy: Xy,
}

/// Body of `PUT /clip/v2/resource/light/{id}`.
///
/// Field order is fixed by declaration, so serialization is byte-stable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightUpdate {
    pub on: On,
    pub dimming: Dimming,
    pub color: Color,
    pub powerup: Powerup,
}

/// Successful acknowledgment of a light update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateAck {
    /// Resources the bridge reports as changed. Empty when the body
    /// carried no decodable structure.
    pub updated: Vec<ResourceIdentifier>,
}
