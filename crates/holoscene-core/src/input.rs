//! Spatial input samples and per-hand grip state.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::handle::HandleKind;

/// Hand identity for a tracked input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    /// Both hands, left first.
    pub const BOTH: [Hand; 2] = [Hand::Left, Hand::Right];

    /// Stable array index for per-hand storage.
    pub fn index(self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }

    /// The opposite hand.
    pub fn other(self) -> Hand {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }
}

/// Which device class produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaySource {
    /// Tracked controller.
    Controller,
    /// Optical hand tracking.
    HandTracking,
}

/// One tracked hand's state for the current frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InputSample {
    pub hand: Hand,
    /// Pointer position in world space.
    pub world_point: Vec3,
    /// Whether the grip input is engaged.
    pub grip_pressed: bool,
    /// Whether the hand is close enough to the session's target to grab
    /// it. Computed by the host's hit-test layer.
    pub in_grab_range: bool,
    pub ray_source: RaySource,
}

impl InputSample {
    /// Create a controller sample with grip released and out of grab range.
    pub fn new(hand: Hand, world_point: Vec3) -> Self {
        Self {
            hand,
            world_point,
            grip_pressed: false,
            in_grab_range: false,
            ray_source: RaySource::Controller,
        }
    }
}

/// A host-computed ray-vs-handle hover result for the session's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverHit {
    pub hand: Hand,
    pub handle: HandleKind,
}

/// Everything the engine consumes in one frame.
///
/// Hit testing happens outside the engine; `hovers` carries its results.
/// `dt` drives all time-gated behavior — the engine has no internal
/// clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameInput {
    /// One sample per tracked hand. A hand with no sample counts as
    /// released (tracking loss behaves like letting go).
    pub samples: Vec<InputSample>,
    /// Ray-vs-handle hover results for the session's target.
    pub hovers: Vec<HoverHit>,
    /// World position of the target's center this frame.
    pub target_center: Vec3,
    /// Seconds since the previous frame.
    pub dt: f32,
}

impl FrameInput {
    /// The sample for `hand`, if it was tracked this frame.
    pub fn sample(&self, hand: Hand) -> Option<&InputSample> {
        self.samples.iter().find(|s| s.hand == hand)
    }

    /// The handle `hand` is hovering, if any.
    pub fn hover(&self, hand: Hand) -> Option<HandleKind> {
        self.hovers.iter().find(|h| h.hand == hand).map(|h| h.handle)
    }

    /// The hand currently hovering `handle`, if any.
    pub fn hovering_hand(&self, handle: HandleKind) -> Option<Hand> {
        self.hovers
            .iter()
            .find(|h| h.handle == handle)
            .map(|h| h.hand)
    }
}

/// Frame-edge grip tracking for one hand: pressed, just-pressed and
/// just-released, in the same shape as pointer-button edge detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct GripState {
    pressed: bool,
    just_pressed: bool,
    just_released: bool,
}

impl GripState {
    /// Call at the start of each frame, before folding in the new sample.
    pub fn begin_frame(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }

    /// Fold the current frame's grip flag in.
    pub fn apply(&mut self, pressed: bool) {
        if pressed && !self.pressed {
            self.just_pressed = true;
        }
        if !pressed && self.pressed {
            self.just_released = true;
        }
        self.pressed = pressed;
    }

    /// Whether the grip is currently engaged.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Whether the grip was engaged this frame.
    pub fn is_just_pressed(&self) -> bool {
        self.just_pressed
    }

    /// Whether the grip was released this frame.
    pub fn is_just_released(&self) -> bool {
        self.just_released
    }
}
