//! Host-supplied configuration for a manipulation session.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::target::SizeBounds;

/// Configuration surface for the gesture engine.
///
/// Supplied by the host when a widget is selected; immutable for the
/// lifetime of the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManipulationConfig {
    /// Master switch for haptic pulses.
    pub enable_haptics: bool,
    /// Allow two-handed pinch scaling.
    pub enable_two_handed: bool,
    /// Snap sizes to the grid.
    pub snap_to_grid: bool,
    /// Grid cell size in meters.
    pub grid_size: f32,
    /// Snap radius around a grid line, in meters.
    pub size_snap_threshold: f32,
    /// Snap rotation to angle increments.
    pub snap_angles: bool,
    /// Angle increment in degrees.
    pub angle_increment_deg: f32,
    /// Snap radius around an angle increment, in degrees.
    pub angle_snap_threshold_deg: f32,
    /// Preserve the pre-drag aspect ratio on corner drags.
    pub lock_aspect_ratio: bool,
    /// Clamp limits for width, height and depth.
    pub bounds: SizeBounds,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            enable_haptics: true,
            enable_two_handed: true,
            snap_to_grid: true,
            grid_size: 0.05,
            size_snap_threshold: 0.008,
            snap_angles: true,
            angle_increment_deg: 15.0,
            angle_snap_threshold_deg: 3.0,
            lock_aspect_ratio: false,
            bounds: SizeBounds::default(),
        }
    }
}

impl ManipulationConfig {
    /// Check the configuration for values the engine cannot operate on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snap_to_grid && self.grid_size <= 0.0 {
            return Err(ConfigError::NonPositiveGrid(self.grid_size));
        }
        if self.snap_angles && self.angle_increment_deg <= 0.0 {
            return Err(ConfigError::NonPositiveIncrement(self.angle_increment_deg));
        }
        self.bounds.validate()
    }
}
