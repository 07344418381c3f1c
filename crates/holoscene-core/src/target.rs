//! Manipulation targets and the size bounds applied to them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;

/// Unique identifier for a manipulable widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(Uuid);

impl TargetId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

/// A widget's extrinsic state as the engine sees it.
///
/// Owned by the host application. The engine reads it when a drag starts
/// and emits geometry through change events; it never writes the target
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManipulationTarget {
    /// Width in meters.
    pub width: f32,
    /// Height in meters.
    pub height: f32,
    /// Push/pull extent along the local forward axis, in meters.
    pub depth: f32,
    /// Rotation about the local Z axis, in radians.
    pub rotation_z: f32,
}

impl ManipulationTarget {
    /// Create a target with the given dimensions.
    pub fn new(width: f32, height: f32, depth: f32, rotation_z: f32) -> Self {
        Self {
            width,
            height,
            depth,
            rotation_z,
        }
    }

    /// Width-to-height ratio, guarded against degenerate heights.
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(f32::EPSILON)
    }
}

/// Clamp limits applied to every engine-driven update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeBounds {
    /// Smallest allowed width/height in meters.
    pub min_size: f32,
    /// Largest allowed width/height in meters.
    pub max_size: f32,
    /// Smallest allowed depth in meters.
    pub min_depth: f32,
    /// Largest allowed depth in meters.
    pub max_depth: f32,
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self {
            min_size: 0.05,
            max_size: 3.0,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

impl SizeBounds {
    /// Clamp a width or height to the allowed range.
    pub fn clamp_size(&self, value: f32) -> f32 {
        value.clamp(self.min_size, self.max_size)
    }

    /// Clamp a depth to the allowed range.
    pub fn clamp_depth(&self, value: f32) -> f32 {
        value.clamp(self.min_depth, self.max_depth)
    }

    /// Reject inverted or non-positive bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_size <= 0.0 || self.min_size >= self.max_size {
            return Err(ConfigError::InvalidSizeBounds {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if self.min_depth < 0.0 || self.min_depth >= self.max_depth {
            return Err(ConfigError::InvalidDepthBounds {
                min: self.min_depth,
                max: self.max_depth,
            });
        }
        Ok(())
    }
}
