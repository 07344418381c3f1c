//! Error types for the gesture engine.

use thiserror::Error;

/// Why a gesture event was rejected.
///
/// None of these are fatal: the session logs them at debug level and the
/// rejected event degrades to "gesture did not happen".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GestureError {
    /// Press received on a handle that is not hovered.
    #[error("handle is not hovered")]
    NotHovering,
    /// Another handle on the same target already has an active drag.
    #[error("another handle on this target is already active")]
    HandleBusy,
    /// A two-handed pinch owns the target right now.
    #[error("two-handed manipulation is in progress")]
    TwoHandedActive,
    /// Release or move received without an active drag.
    #[error("no drag is active")]
    NotActive,
}

/// Configuration the engine cannot operate on.
///
/// Surfaced only when a session is constructed; a running session never
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid size must be positive, got {0}")]
    NonPositiveGrid(f32),
    #[error("angle increment must be positive, got {0}")]
    NonPositiveIncrement(f32),
    #[error("size bounds are inverted or non-positive: min {min}, max {max}")]
    InvalidSizeBounds { min: f32, max: f32 },
    #[error("depth bounds are inverted or negative: min {min}, max {max}")]
    InvalidDepthBounds { min: f32, max: f32 },
}
