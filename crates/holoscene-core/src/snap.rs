//! Grid and angle snapping for manipulation gestures.

use std::f32::consts::{PI, TAU};

/// Result of a grid snap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The possibly-snapped value.
    pub value: f32,
    /// Whether the value landed on a grid line.
    pub snapped: bool,
}

/// Result of an angle snap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSnapResult {
    /// The possibly-snapped angle in radians.
    pub angle_rad: f32,
    /// The angle in degrees, normalized to [0, 360).
    pub angle_deg: f32,
    /// Whether the angle landed on an increment.
    pub snapped: bool,
}

/// Snap `value` to the nearest multiple of `grid_size` when it lies
/// within `threshold` of that multiple; otherwise the value passes
/// through unchanged. Pure, stateless, idempotent.
pub fn snap_to_grid(value: f32, grid_size: f32, threshold: f32) -> SnapResult {
    if grid_size <= 0.0 {
        return SnapResult {
            value,
            snapped: false,
        };
    }
    let rounded = (value / grid_size).round() * grid_size;
    if (value - rounded).abs() < threshold {
        SnapResult {
            value: rounded,
            snapped: true,
        }
    } else {
        SnapResult {
            value,
            snapped: false,
        }
    }
}

/// Snap an angle to the nearest multiple of `increment_deg` when within
/// `threshold_deg` of it.
///
/// The comparison happens in degrees on the [0°, 360°) circle, so a value
/// drifting past a full turn still snaps to the increment on the other
/// side, and a snapped 360° normalizes to 0°. When the angle is outside
/// the threshold the original radian value is returned unchanged.
pub fn snap_to_angle(angle_rad: f32, increment_deg: f32, threshold_deg: f32) -> AngleSnapResult {
    let deg = angle_rad.to_degrees().rem_euclid(360.0);
    if increment_deg <= 0.0 {
        return AngleSnapResult {
            angle_rad,
            angle_deg: deg,
            snapped: false,
        };
    }
    let rounded = (deg / increment_deg).round() * increment_deg;
    let mut distance = (deg - rounded).abs();
    if distance > 180.0 {
        distance = 360.0 - distance;
    }
    if distance < threshold_deg {
        let snapped_deg = rounded.rem_euclid(360.0);
        AngleSnapResult {
            angle_rad: snapped_deg.to_radians(),
            angle_deg: snapped_deg,
            snapped: true,
        }
    } else {
        AngleSnapResult {
            angle_rad,
            angle_deg: deg,
            snapped: false,
        }
    }
}

/// Wrap an angular difference to [-π, π).
pub fn wrap_angle(rad: f32) -> f32 {
    (rad + PI).rem_euclid(TAU) - PI
}
