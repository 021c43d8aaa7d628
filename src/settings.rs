//! Table and physics settings
//!
//! Loaded from a JSON file; every field falls back to the default table.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable table geometry and physics parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Scheduling ===
    /// Frame rate requested from the engine on init
    pub target_fps: u32,

    // === Geometry ===
    pub table_width: f32,
    pub table_height: f32,
    pub ball_radius: f32,
    pub pocket_radius: f32,

    // === Shot ===
    /// Seconds to charge a full-power shot
    pub charge_time: f32,

    // === Physics ===
    pub cushion_loss: f32,
    pub collision_transfer: f32,
    pub collision_loss: f32,
    pub rolling_friction: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,

            table_width: TABLE_WIDTH,
            table_height: TABLE_HEIGHT,
            ball_radius: BALL_RADIUS,
            pocket_radius: POCKET_RADIUS,

            charge_time: CHARGE_TIME,

            cushion_loss: CUSHION_LOSS,
            collision_transfer: COLLISION_TRANSFER,
            collision_loss: COLLISION_LOSS,
            rolling_friction: ROLLING_FRICTION,
        }
    }
}

impl Settings {
    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::validated)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Replace values that would break the simulation with their defaults
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        fn positive(value: &mut f32, default: f32, name: &str) {
            if !(value.is_finite() && *value > 0.0) {
                log::warn!("Setting {name}={value} rejected, using {default}");
                *value = default;
            }
        }

        fn fraction(value: &mut f32, default: f32, name: &str) {
            if !(0.0..=1.0).contains(&*value) {
                log::warn!("Setting {name}={value} outside [0, 1], using {default}");
                *value = default;
            }
        }

        positive(&mut self.table_width, defaults.table_width, "table_width");
        positive(&mut self.table_height, defaults.table_height, "table_height");
        positive(&mut self.ball_radius, defaults.ball_radius, "ball_radius");
        positive(&mut self.pocket_radius, defaults.pocket_radius, "pocket_radius");
        positive(&mut self.charge_time, defaults.charge_time, "charge_time");

        // Each cushion hit removes at most 2 * cushion_loss of the speed
        if !(0.0..=0.5).contains(&self.cushion_loss) {
            log::warn!(
                "Setting cushion_loss={} outside [0, 0.5], using {}",
                self.cushion_loss, defaults.cushion_loss
            );
            self.cushion_loss = defaults.cushion_loss;
        }
        fraction(&mut self.collision_transfer, defaults.collision_transfer, "collision_transfer");
        fraction(&mut self.collision_loss, defaults.collision_loss, "collision_loss");
        if !(self.rolling_friction.is_finite() && self.rolling_friction >= 0.0) {
            log::warn!(
                "Setting rolling_friction={} rejected, using {}",
                self.rolling_friction, defaults.rolling_friction
            );
            self.rolling_friction = defaults.rolling_friction;
        }

        if self.target_fps == 0 {
            log::warn!("Setting target_fps=0 rejected, using {}", defaults.target_fps);
            self.target_fps = defaults.target_fps;
        }

        if 2.0 * self.ball_radius >= self.table_height.min(self.table_width) {
            log::warn!("Balls do not fit on a {}x{} table, using default geometry", self.table_width, self.table_height);
            self.table_width = defaults.table_width;
            self.table_height = defaults.table_height;
            self.ball_radius = defaults.ball_radius;
        }

        self
    }

    /// Fixed step matching the requested frame rate
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.target_fps as f32
    }
}
