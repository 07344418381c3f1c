//! Two-handed pinch-scale coordination.
//!
//! When both hands grip within grab range of the same target, their
//! relative motion fuses into a single uniform scale gesture that
//! overrides per-handle drags until either grip opens.

use glam::Vec3;
use holoscene_core::config::ManipulationConfig;
use holoscene_core::events::ChangeEvent;
use holoscene_core::target::ManipulationTarget;
use log::{debug, trace};

use crate::haptics::{HapticCue, HapticDispatcher};

/// Inter-hand distances below this never engage a pinch, in meters.
/// Guards the scale division against degenerate geometry.
pub const MIN_ENGAGE_DISTANCE: f32 = 0.01;
/// Scale-factor change required before another proportional pulse fires.
pub const SCALE_PULSE_EPSILON: f32 = 0.02;

/// Snapshot taken when both grips engage.
#[derive(Debug, Clone)]
pub struct TwoHandState {
    pub initial_distance: f32,
    pub initial_width: f32,
    pub initial_height: f32,
    pub left_pos: Vec3,
    pub right_pos: Vec3,
    /// Last emitted size; re-emitted as the committed result.
    last_width: f32,
    last_height: f32,
    last_scale: f32,
    /// Scale factor at the time of the last proportional pulse.
    last_pulse_scale: f32,
}

/// Per-hand inputs the session distills for the coordinator each frame.
#[derive(Debug, Clone, Copy)]
pub struct PinchInputs {
    pub left_gripped: bool,
    pub right_gripped: bool,
    pub left_in_range: bool,
    pub right_in_range: bool,
    pub left_pos: Vec3,
    pub right_pos: Vec3,
}

/// State machine fusing two simultaneous grips into one scale gesture:
/// disengaged → engaged → disengaged.
#[derive(Default)]
pub struct TwoHandedCoordinator {
    state: Option<TwoHandState>,
}

impl TwoHandedCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&TwoHandState> {
        self.state.as_ref()
    }

    /// Drive the coordinator one frame. Returns at most one event: a
    /// preview while engaged, or the committed result on disengage.
    pub fn update(
        &mut self,
        inputs: &PinchInputs,
        target: &ManipulationTarget,
        config: &ManipulationConfig,
        haptics: &mut HapticDispatcher,
    ) -> Option<ChangeEvent> {
        let both_gripped = inputs.left_gripped && inputs.right_gripped;

        if self.state.is_some() {
            if !both_gripped {
                // either hand letting go commits the in-progress size
                return self.force_disengage(haptics);
            }
            return self.track(inputs, config, haptics);
        }

        if !config.enable_two_handed || !both_gripped {
            return None;
        }
        if !inputs.left_in_range || !inputs.right_in_range {
            return None;
        }
        let distance = inputs.left_pos.distance(inputs.right_pos);
        if !distance.is_finite() || distance < MIN_ENGAGE_DISTANCE {
            trace!("pinch not engaged: degenerate inter-hand distance {distance}");
            return None;
        }
        debug!("pinch engaged at {distance:.3} m");
        self.state = Some(TwoHandState {
            initial_distance: distance,
            initial_width: target.width,
            initial_height: target.height,
            left_pos: inputs.left_pos,
            right_pos: inputs.right_pos,
            last_width: target.width,
            last_height: target.height,
            last_scale: 1.0,
            last_pulse_scale: 1.0,
        });
        haptics.send_both(HapticCue::TwoHandEngage);
        None
    }

    /// Commit and disengage. Used by the session at teardown; a no-op
    /// when nothing is engaged.
    pub fn force_disengage(&mut self, haptics: &mut HapticDispatcher) -> Option<ChangeEvent> {
        let state = self.state.take()?;
        debug!(
            "pinch released, committing {:.3} x {:.3}",
            state.last_width, state.last_height
        );
        haptics.send_both(HapticCue::TwoHandRelease);
        Some(ChangeEvent::TwoHandScale {
            width: state.last_width,
            height: state.last_height,
            scale_factor: state.last_scale,
            committed: true,
        })
    }

    /// Abandon a live pinch, restoring the engage-time size.
    pub fn cancel(&mut self, haptics: &mut HapticDispatcher) -> Option<ChangeEvent> {
        let state = self.state.take()?;
        debug!("pinch cancelled");
        haptics.send_both(HapticCue::TwoHandRelease);
        Some(ChangeEvent::TwoHandScale {
            width: state.initial_width,
            height: state.initial_height,
            scale_factor: 1.0,
            committed: true,
        })
    }

    fn track(
        &mut self,
        inputs: &PinchInputs,
        config: &ManipulationConfig,
        haptics: &mut HapticDispatcher,
    ) -> Option<ChangeEvent> {
        let state = self.state.as_mut()?;
        state.left_pos = inputs.left_pos;
        state.right_pos = inputs.right_pos;
        let distance = inputs.left_pos.distance(inputs.right_pos);
        if !distance.is_finite() {
            trace!("pinch sample ignored: non-finite distance");
            return None;
        }
        let scale = distance / state.initial_distance;
        let width = config.bounds.clamp_size(state.initial_width * scale);
        let height = config.bounds.clamp_size(state.initial_height * scale);
        state.last_width = width;
        state.last_height = height;
        state.last_scale = scale;
        if (scale - state.last_pulse_scale).abs() > SCALE_PULSE_EPSILON {
            state.last_pulse_scale = scale;
            haptics.send_both(HapticCue::TwoHandScale(scale));
        }
        Some(ChangeEvent::TwoHandScale {
            width,
            height,
            scale_factor: scale,
            committed: false,
        })
    }
}
