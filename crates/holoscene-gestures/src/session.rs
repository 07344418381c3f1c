//! Per-widget gesture orchestration.

use glam::Vec3;
use holoscene_core::config::ManipulationConfig;
use holoscene_core::error::{ConfigError, GestureError};
use holoscene_core::events::ChangeEvent;
use holoscene_core::handle::HandleKind;
use holoscene_core::input::{FrameInput, GripState, Hand};
use holoscene_core::target::{ManipulationTarget, TargetId};
use log::{debug, trace};

use crate::drag::DragController;
use crate::haptics::{HapticDispatcher, HapticSink, NullHapticSink};
use crate::two_hand::{PinchInputs, TwoHandedCoordinator};

/// Orchestrates every gesture affecting one selected widget.
///
/// Owns one [`DragController`] per handle kind, the two-handed
/// coordinator, the haptic dispatcher and the per-hand grip edge state,
/// keyed by `(TargetId, HandleKind)` rather than any renderer object.
/// Alive only while the widget is selected; call [`finish`] before
/// teardown so an in-progress gesture is finalized instead of silently
/// discarded.
///
/// [`finish`]: ManipulationSession::finish
pub struct ManipulationSession {
    target_id: TargetId,
    config: ManipulationConfig,
    controllers: Vec<DragController>,
    two_handed: TwoHandedCoordinator,
    haptics: HapticDispatcher,
    grips: [GripState; 2],
}

impl ManipulationSession {
    /// Create a session for `target_id` with the default no-op haptic
    /// sink.
    pub fn new(target_id: TargetId, config: ManipulationConfig) -> Result<Self, ConfigError> {
        Self::with_haptics(target_id, config, Box::new(NullHapticSink))
    }

    /// Create a session delivering haptics through `sink`.
    pub fn with_haptics(
        target_id: TargetId,
        config: ManipulationConfig,
        sink: Box<dyn HapticSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let haptics = HapticDispatcher::new(sink, config.enable_haptics);
        Ok(Self {
            target_id,
            config,
            controllers: HandleKind::ALL
                .iter()
                .map(|&handle| DragController::new(handle))
                .collect(),
            two_handed: TwoHandedCoordinator::new(),
            haptics,
            grips: [GripState::default(); 2],
        })
    }

    pub fn target_id(&self) -> TargetId {
        self.target_id
    }

    pub fn config(&self) -> &ManipulationConfig {
        &self.config
    }

    /// Whether any single-handle drag is active.
    pub fn is_dragging(&self) -> bool {
        self.controllers.iter().any(DragController::is_active)
    }

    /// Whether a two-handed pinch is engaged.
    pub fn is_pinching(&self) -> bool {
        self.two_handed.is_engaged()
    }

    /// Drive the engine one frame and collect the geometry changes to
    /// apply to the target. The engine reads `target` but never writes
    /// it; applying the returned events is the host's job.
    pub fn update(
        &mut self,
        frame: &FrameInput,
        target: &ManipulationTarget,
    ) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        self.haptics.tick(frame.dt);

        // grip edges; a hand with no sample this frame counts as released
        for hand in Hand::BOTH {
            let grip = &mut self.grips[hand.index()];
            grip.begin_frame();
            grip.apply(frame.sample(hand).is_some_and(|s| s.grip_pressed));
        }

        // the pinch owns the frame while engaged
        let was_pinching = self.two_handed.is_engaged();
        let pinch_event =
            self.two_handed
                .update(&pinch_inputs(frame), target, &self.config, &mut self.haptics);
        if !was_pinching && self.two_handed.is_engaged() {
            // pinch takes over: suspend any single-handle drag
            for controller in &mut self.controllers {
                controller.force_release(&mut self.haptics);
            }
        }
        events.extend(pinch_event);
        if self.two_handed.is_engaged() {
            return events;
        }

        // hover routing; hover loss on an active controller is the
        // forced-release path
        for controller in &mut self.controllers {
            match frame.hovering_hand(controller.handle()) {
                Some(hand) => controller.hover_enter(hand, &mut self.haptics),
                None => controller.hover_exit(&mut self.haptics),
            }
        }

        // grip releases end the drag held by that hand
        for hand in Hand::BOTH {
            if !self.grips[hand.index()].is_just_released() {
                continue;
            }
            if let Some(controller) = self
                .controllers
                .iter_mut()
                .find(|c| c.is_active() && c.drag_hand() == Some(hand))
            {
                if let Err(err) = controller.press_end(&mut self.haptics) {
                    debug!("release on {:?} ignored: {err}", controller.handle());
                }
            }
        }

        // grip presses start a drag on the hovered handle
        for hand in Hand::BOTH {
            if !self.grips[hand.index()].is_just_pressed() {
                continue;
            }
            let Some(handle) = frame.hover(hand) else {
                trace!("grip press from {hand:?} with no hovered handle");
                continue;
            };
            let Some(sample) = frame.sample(hand) else {
                continue;
            };
            if !sample.world_point.is_finite() {
                trace!("grip press from {hand:?} ignored: non-finite point");
                continue;
            }
            let point = sample.world_point - frame.target_center;
            if let Err(err) = self.press_start(handle, point, hand, target) {
                debug!("press on {handle:?} rejected: {err}");
            }
        }

        // per-frame motion for the active drag; the press frame itself
        // carries no motion yet
        if let Some(controller) = self.controllers.iter_mut().find(|c| c.is_active()) {
            if let Some(hand) = controller.drag_hand() {
                if !self.grips[hand.index()].is_just_pressed() {
                    if let Some(sample) = frame.sample(hand) {
                        let point = sample.world_point - frame.target_center;
                        events.extend(controller.press_move(
                            point,
                            frame.dt,
                            &self.config,
                            &mut self.haptics,
                        ));
                    }
                }
            }
        }

        events
    }

    /// Finalize the session before teardown. Any in-progress drag ends as
    /// if the grip had been released, and a live pinch commits its last
    /// size. Call when the owning widget is deselected.
    pub fn finish(&mut self) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        events.extend(self.two_handed.force_disengage(&mut self.haptics));
        for controller in &mut self.controllers {
            controller.force_release(&mut self.haptics);
        }
        debug!("session for target {:?} finished", self.target_id);
        events
    }

    /// Abandon any in-progress gesture and return the events restoring
    /// the pre-gesture geometry.
    pub fn cancel(&mut self) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        events.extend(self.two_handed.cancel(&mut self.haptics));
        for controller in &mut self.controllers {
            events.extend(controller.cancel(&mut self.haptics));
        }
        events
    }

    /// Start a drag on `handle`, enforcing the one-active-drag invariant
    /// for the whole target.
    fn press_start(
        &mut self,
        handle: HandleKind,
        point: Vec3,
        hand: Hand,
        target: &ManipulationTarget,
    ) -> Result<(), GestureError> {
        if self.two_handed.is_engaged() {
            return Err(GestureError::TwoHandedActive);
        }
        if self.is_dragging() {
            return Err(GestureError::HandleBusy);
        }
        let controller = self
            .controllers
            .iter_mut()
            .find(|c| c.handle() == handle)
            .ok_or(GestureError::NotHovering)?;
        controller.press_start(point, hand, target, &mut self.haptics)
    }
}

fn pinch_inputs(frame: &FrameInput) -> PinchInputs {
    let left = frame.sample(Hand::Left);
    let right = frame.sample(Hand::Right);
    PinchInputs {
        left_gripped: left.is_some_and(|s| s.grip_pressed),
        right_gripped: right.is_some_and(|s| s.grip_pressed),
        left_in_range: left.is_some_and(|s| s.in_grab_range),
        right_in_range: right.is_some_and(|s| s.in_grab_range),
        left_pos: left.map(|s| s.world_point).unwrap_or(Vec3::ZERO),
        right_pos: right.map(|s| s.world_point).unwrap_or(Vec3::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::DragPhase;
    use crate::haptics::{HapticCue, RecordingSink};
    use holoscene_core::handle::Corner;
    use holoscene_core::input::{HoverHit, InputSample};

    const DT: f32 = 0.016;

    fn session() -> ManipulationSession {
        ManipulationSession::new(TargetId::new(), ManipulationConfig::default()).unwrap()
    }

    fn session_with(config: ManipulationConfig) -> ManipulationSession {
        ManipulationSession::new(TargetId::new(), config).unwrap()
    }

    fn target() -> ManipulationTarget {
        ManipulationTarget::new(0.4, 0.3, 0.1, 0.0)
    }

    fn frame(samples: Vec<InputSample>, hovers: Vec<HoverHit>) -> FrameInput {
        FrameInput {
            samples,
            hovers,
            target_center: Vec3::ZERO,
            dt: DT,
        }
    }

    fn gripping(hand: Hand, point: Vec3) -> InputSample {
        let mut sample = InputSample::new(hand, point);
        sample.grip_pressed = true;
        sample
    }

    fn hover_se(hand: Hand) -> HoverHit {
        HoverHit {
            hand,
            handle: HandleKind::Corner(Corner::SouthEast),
        }
    }

    /// Hover, press and hold the SE corner with the right hand.
    fn start_se_drag(session: &mut ManipulationSession, origin: Vec3) {
        let hover = frame(
            vec![InputSample::new(Hand::Right, origin)],
            vec![hover_se(Hand::Right)],
        );
        assert!(session.update(&hover, &target()).is_empty());
        let press = frame(vec![gripping(Hand::Right, origin)], vec![hover_se(Hand::Right)]);
        session.update(&press, &target());
        assert!(session.is_dragging());
    }

    #[test]
    fn test_corner_drag_end_to_end() {
        // Scenario A: 0.40 x 0.30, SE corner dragged (+0.05, -0.05).
        let mut session = session_with(ManipulationConfig {
            snap_to_grid: false,
            ..ManipulationConfig::default()
        });
        let origin = Vec3::new(0.2, -0.15, 0.0);
        start_se_drag(&mut session, origin);

        let moved = frame(
            vec![gripping(Hand::Right, origin + Vec3::new(0.05, -0.05, 0.0))],
            vec![hover_se(Hand::Right)],
        );
        let events = session.update(&moved, &target());
        assert_eq!(events.len(), 1);
        match events[0] {
            ChangeEvent::Resize { width, height } => {
                assert!((width - 0.45).abs() < 1e-6);
                assert!((height - 0.35).abs() < 1e-6);
            }
            other => panic!("expected Resize, got {other:?}"),
        }

        // release: drag over, no further events
        let released = frame(
            vec![InputSample::new(
                Hand::Right,
                origin + Vec3::new(0.05, -0.05, 0.0),
            )],
            vec![hover_se(Hand::Right)],
        );
        assert!(session.update(&released, &target()).is_empty());
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_corner_drag_snaps_with_single_haptic() {
        // Scenario B: drag lands at 0.452 x 0.352; grid 0.05 m with a
        // 0.008 m radius pulls both axes onto the grid, one snap pulse.
        let sink = RecordingSink::default();
        let mut session = ManipulationSession::with_haptics(
            TargetId::new(),
            ManipulationConfig::default(),
            Box::new(sink.clone()),
        )
        .unwrap();
        let origin = Vec3::new(0.2, -0.15, 0.0);
        start_se_drag(&mut session, origin);

        for delta in [0.02, 0.052, 0.053] {
            let moved = frame(
                vec![gripping(Hand::Right, origin + Vec3::new(delta, -delta, 0.0))],
                vec![hover_se(Hand::Right)],
            );
            let events = session.update(&moved, &target());
            assert_eq!(events.len(), 1);
        }
        assert_eq!(sink.count(HapticCue::SnapEngage), 1);
    }

    #[test]
    fn test_rotate_drag_end_to_end() {
        // Scenario C: raw 14.2° snaps to 15°.
        let mut session = session();
        let origin = Vec3::new(0.0, 0.23, 0.0);
        let hover = |hand| HoverHit {
            hand,
            handle: HandleKind::Rotate,
        };
        session.update(
            &frame(vec![InputSample::new(Hand::Right, origin)], vec![hover(Hand::Right)]),
            &target(),
        );
        session.update(
            &frame(vec![gripping(Hand::Right, origin)], vec![hover(Hand::Right)]),
            &target(),
        );

        let start_angle = origin.y.atan2(origin.x);
        let angle = start_angle + 14.2_f32.to_radians();
        let point = Vec3::new(0.23 * angle.cos(), 0.23 * angle.sin(), 0.0);
        let events = session.update(
            &frame(vec![gripping(Hand::Right, point)], vec![hover(Hand::Right)]),
            &target(),
        );
        assert_eq!(events.len(), 1);
        match events[0] {
            ChangeEvent::Rotate { rotation_z, delta } => {
                assert!((rotation_z - 15.0_f32.to_radians()).abs() < 1e-3);
                assert!((delta - 15.0_f32.to_radians()).abs() < 1e-3);
            }
            other => panic!("expected Rotate, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_drag_end_to_end() {
        // Scenario D: depth 0.9 pushed +0.3 clamps at 1.0.
        let mut session = session();
        let deep_target = ManipulationTarget::new(0.4, 0.3, 0.9, 0.0);
        let origin = Vec3::new(0.26, 0.0, 0.04);
        let hover = |hand| HoverHit {
            hand,
            handle: HandleKind::Depth,
        };
        session.update(
            &frame(vec![InputSample::new(Hand::Left, origin)], vec![hover(Hand::Left)]),
            &deep_target,
        );
        session.update(
            &frame(vec![gripping(Hand::Left, origin)], vec![hover(Hand::Left)]),
            &deep_target,
        );
        let events = session.update(
            &frame(
                vec![gripping(Hand::Left, origin + Vec3::new(0.0, 0.0, 0.3))],
                vec![hover(Hand::Left)],
            ),
            &deep_target,
        );
        assert_eq!(events, vec![ChangeEvent::Depth { depth: 1.0 }]);
    }

    #[test]
    fn test_second_handle_rejected_while_dragging() {
        let mut session = session();
        let origin = Vec3::new(0.2, -0.15, 0.0);
        start_se_drag(&mut session, origin);

        // left hand presses the rotate handle mid-drag: rejected
        let rotate_point = Vec3::new(0.0, 0.23, 0.0);
        let contested = frame(
            vec![
                gripping(Hand::Right, origin),
                gripping(Hand::Left, rotate_point),
            ],
            vec![
                hover_se(Hand::Right),
                HoverHit {
                    hand: Hand::Left,
                    handle: HandleKind::Rotate,
                },
            ],
        );
        session.update(&contested, &target());
        let active: Vec<_> = session
            .controllers
            .iter()
            .filter(|c| c.is_active())
            .map(|c| c.handle())
            .collect();
        assert_eq!(active, vec![HandleKind::Corner(Corner::SouthEast)]);
    }

    #[test]
    fn test_hover_loss_forces_release() {
        let mut session = session();
        let origin = Vec3::new(0.2, -0.15, 0.0);
        start_se_drag(&mut session, origin);

        // grip still held, but the ray slid off the handle
        let lost = frame(vec![gripping(Hand::Right, origin)], vec![]);
        session.update(&lost, &target());
        assert!(!session.is_dragging());
        let se = session
            .controllers
            .iter()
            .find(|c| c.handle() == HandleKind::Corner(Corner::SouthEast))
            .unwrap();
        assert_eq!(se.phase(), DragPhase::Idle);
        assert!(se.drag().is_none());
    }

    #[test]
    fn test_missing_sample_counts_as_release() {
        let mut session = session();
        let origin = Vec3::new(0.2, -0.15, 0.0);
        start_se_drag(&mut session, origin);

        // tracking loss: no sample for the dragging hand
        let dropped = frame(vec![], vec![hover_se(Hand::Right)]);
        session.update(&dropped, &target());
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_press_without_hover_is_noop() {
        let mut session = session();
        let press = frame(vec![gripping(Hand::Right, Vec3::new(0.2, -0.15, 0.0))], vec![]);
        let events = session.update(&press, &target());
        assert!(events.is_empty());
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_pinch_overrides_single_handle_drag() {
        let mut session = session();
        let origin = Vec3::new(0.2, -0.15, 0.0);
        start_se_drag(&mut session, origin);

        // both hands grip in grab range: pinch engages, drag suspends
        let mut left = gripping(Hand::Left, Vec3::new(-0.15, 0.0, 0.0));
        left.in_grab_range = true;
        let mut right = gripping(Hand::Right, Vec3::new(0.15, 0.0, 0.0));
        right.in_grab_range = true;
        session.update(&frame(vec![left, right], vec![]), &target());
        assert!(session.is_pinching());
        assert!(!session.is_dragging());

        // and new presses are rejected while engaged
        let result = session.press_start(
            HandleKind::Rotate,
            Vec3::new(0.0, 0.23, 0.0),
            Hand::Right,
            &target(),
        );
        assert_eq!(result, Err(GestureError::TwoHandedActive));
    }

    #[test]
    fn test_pinch_scale_and_commit_end_to_end() {
        let mut session = session();
        let grab = |x: f32| {
            let mut left = gripping(Hand::Left, Vec3::new(-x, 0.0, 0.0));
            left.in_grab_range = true;
            let mut right = gripping(Hand::Right, Vec3::new(x, 0.0, 0.0));
            right.in_grab_range = true;
            vec![left, right]
        };

        assert!(session.update(&frame(grab(0.15), vec![]), &target()).is_empty());
        assert!(session.is_pinching());

        let events = session.update(&frame(grab(0.225), vec![]), &target());
        assert_eq!(events.len(), 1);
        match events[0] {
            ChangeEvent::TwoHandScale {
                scale_factor,
                committed,
                ..
            } => {
                assert!((scale_factor - 1.5).abs() < 1e-5);
                assert!(!committed);
            }
            other => panic!("expected TwoHandScale, got {other:?}"),
        }

        // right hand lets go: one committed event, pinch over
        let mut release = grab(0.225);
        release[1].grip_pressed = false;
        let events = session.update(&frame(release, vec![]), &target());
        assert_eq!(events.len(), 1);
        match events[0] {
            ChangeEvent::TwoHandScale {
                width, committed, ..
            } => {
                assert!((width - 0.6).abs() < 1e-5);
                assert!(committed);
            }
            other => panic!("expected TwoHandScale, got {other:?}"),
        }
        assert!(!session.is_pinching());
    }

    #[test]
    fn test_finish_finalizes_in_progress_gesture() {
        let mut session = session();
        let origin = Vec3::new(0.2, -0.15, 0.0);
        start_se_drag(&mut session, origin);

        let events = session.finish();
        assert!(events.is_empty());
        assert!(!session.is_dragging());

        // a live pinch commits on finish
        let mut session = session_with(ManipulationConfig::default());
        let mut left = gripping(Hand::Left, Vec3::new(-0.15, 0.0, 0.0));
        left.in_grab_range = true;
        let mut right = gripping(Hand::Right, Vec3::new(0.15, 0.0, 0.0));
        right.in_grab_range = true;
        session.update(&frame(vec![left, right], vec![]), &target());
        let events = session.finish();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            ChangeEvent::TwoHandScale { committed: true, .. }
        ));
    }

    #[test]
    fn test_cancel_restores_pre_gesture_geometry() {
        let mut session = session_with(ManipulationConfig {
            snap_to_grid: false,
            ..ManipulationConfig::default()
        });
        let origin = Vec3::new(0.2, -0.15, 0.0);
        start_se_drag(&mut session, origin);
        session.update(
            &frame(
                vec![gripping(Hand::Right, origin + Vec3::new(0.1, -0.1, 0.0))],
                vec![hover_se(Hand::Right)],
            ),
            &target(),
        );

        let events = session.cancel();
        assert_eq!(
            events,
            vec![ChangeEvent::Resize {
                width: 0.4,
                height: 0.3
            }]
        );
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_invalid_config_is_rejected_at_construction() {
        let config = ManipulationConfig {
            grid_size: -1.0,
            ..ManipulationConfig::default()
        };
        assert!(ManipulationSession::new(TargetId::new(), config).is_err());
    }
}
