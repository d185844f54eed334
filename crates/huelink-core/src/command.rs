// ── Color command and the shared light payload ──
//
// A `ColorCommand` is validated once at the edge; `build` is a pure
// function of it, so every light in a run receives byte-identical state.

use huelink_api::clip_types::{
    Color, Dimming, LightUpdate, On, Powerup, PowerupMode, PowerupPreset, Xy,
};
use serde::Serialize;
use tracing::warn;

use crate::error::CoreError;

/// Reference white chromaticity x.
pub const REFERENCE_WHITE_X: f64 = 0.31272;
/// Reference white chromaticity y.
pub const REFERENCE_WHITE_Y: f64 = 0.2903;
/// Full brightness, in percent.
pub const FULL_INTENSITY: f64 = 100.0;

/// Chromaticity plus brightness, every field inside its range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorCommand {
    x: f64,
    y: f64,
    intensity: f64,
}

impl ColorCommand {
    /// Validate a requested color. Out-of-range or non-finite values are
    /// rejected, never clamped.
    pub fn new(x: f64, y: f64, intensity: f64) -> Result<Self, CoreError> {
        check("x", x, 1.0, "[0, 1]")?;
        check("y", y, 1.0, "[0, 1]")?;
        check("intensity", intensity, 100.0, "[0, 100]")?;
        Ok(Self { x, y, intensity })
    }

    /// The documented fallback: reference white at full intensity.
    pub const fn reference_white() -> Self {
        Self {
            x: REFERENCE_WHITE_X,
            y: REFERENCE_WHITE_Y,
            intensity: FULL_INTENSITY,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }
}

impl Default for ColorCommand {
    fn default() -> Self {
        Self::reference_white()
    }
}

fn check(
    field: &'static str,
    value: f64,
    max: f64,
    expected: &'static str,
) -> Result<(), CoreError> {
    if (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InputInvalid {
            field,
            value: value.to_string(),
            expected,
        })
    }
}

// ── Input resolution ────────────────────────────────────────────────

/// Where the color used for a run came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSource {
    Requested,
    Fallback { reason: String },
}

/// Turn raw `x y intensity` arguments into a color, falling back to
/// `fallback` when they are absent, incomplete, unparsable, or out of range.
pub fn resolve_inputs<S: AsRef<str>>(
    raw: &[S],
    fallback: ColorCommand,
) -> (ColorCommand, ColorSource) {
    let fall_back = |reason: String| {
        warn!(%reason, "using default color");
        (fallback, ColorSource::Fallback { reason })
    };

    let [x, y, intensity] = raw else {
        if raw.is_empty() {
            return (
                fallback,
                ColorSource::Fallback {
                    reason: "no color given".into(),
                },
            );
        }
        return fall_back(format!("expected 3 values (x y intensity), got {}", raw.len()));
    };

    let parsed = [x, y, intensity].map(|v| v.as_ref().trim().parse::<f64>());
    let [Ok(x), Ok(y), Ok(intensity)] = parsed else {
        return fall_back("color values must be numbers".into());
    };

    match ColorCommand::new(x, y, intensity) {
        Ok(color) => (color, ColorSource::Requested),
        Err(e) => fall_back(e.to_string()),
    }
}

// ── Payload ─────────────────────────────────────────────────────────

/// Light state sent to every device in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandPayload {
    update: LightUpdate,
}

impl CommandPayload {
    pub fn update(&self) -> &LightUpdate {
        &self.update
    }

    /// Serialized request body.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.update).unwrap_or_default()
    }
}

/// Build the payload: power on, brightness, chromaticity, and a custom
/// power-up state with the same chromaticity so a power cycle restores it.
pub fn build(command: &ColorCommand) -> CommandPayload {
    let xy = Xy {
        x: command.x,
        y: command.y,
    };
    CommandPayload {
        update: LightUpdate {
            on: On { on: true },
            dimming: Dimming {
                brightness: command.intensity,
            },
            color: Color { xy },
            powerup: Powerup {
                preset: PowerupPreset::Custom,
                mode: PowerupMode::Color,
                xy,
            },
        },
    }
}
