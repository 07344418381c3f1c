//! Change events emitted by the gesture engine.

use serde::{Deserialize, Serialize};

/// A geometry change produced by an active gesture.
///
/// Consumed by the owning widget's transform-update callback. The engine
/// emits clamped values and never writes the widget itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChangeEvent {
    /// Width/height change from a corner or edge drag.
    Resize { width: f32, height: f32 },
    /// Rotation change from the rotate handle. `rotation_z` is the
    /// absolute (possibly snapped) angle; `delta` is relative to the
    /// start of the drag, wrapped to [-π, π).
    Rotate { rotation_z: f32, delta: f32 },
    /// Depth change from the depth handle.
    Depth { depth: f32 },
    /// Uniform scale from a two-handed pinch. `committed` is false for
    /// per-frame previews and true exactly once, when the pinch ends;
    /// the engage/commit pair bounds one logical resize transaction.
    TwoHandScale {
        width: f32,
        height: f32,
        scale_factor: f32,
        committed: bool,
    },
}
