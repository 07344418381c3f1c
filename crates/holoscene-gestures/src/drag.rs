//! Per-handle drag state machines.
//!
//! One [`DragController`] exists per handle kind. Each turns a drag's 3-D
//! delta into a size, rotation or depth change, routing sizes through
//! grid snapping and rotations through angle snapping before clamping.
//! All points arriving here are world-oriented and relative to the
//! target's center; the session does that translation.

use glam::{Quat, Vec3};
use holoscene_core::config::ManipulationConfig;
use holoscene_core::error::GestureError;
use holoscene_core::events::ChangeEvent;
use holoscene_core::handle::{Corner, Edge, HandleKind};
use holoscene_core::input::Hand;
use holoscene_core::snap::{snap_to_angle, snap_to_grid, wrap_angle};
use holoscene_core::target::{ManipulationTarget, SizeBounds};
use log::{debug, trace};

use crate::haptics::{HapticCue, HapticDispatcher};

/// Angular speed below which rotation counts as deliberate, in radians
/// per second.
pub const FINE_TUNE_SPEED: f32 = 0.35;
/// How long angular speed must stay below [`FINE_TUNE_SPEED`] before
/// fine-tune mode engages, in seconds.
pub const FINE_TUNE_DEBOUNCE: f32 = 0.2;
/// Scale applied to the angle-snap threshold while fine-tuning.
pub const FINE_TUNE_THRESHOLD_SCALE: f32 = 0.25;

/// Lifecycle phase of a drag controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Hovering,
    Active,
}

/// Slow-precision-rotation tracking, rotate handle only.
#[derive(Debug, Clone, Copy, Default)]
struct FineTuneState {
    active: bool,
    /// Accumulated seconds of below-threshold angular speed.
    still_time: f32,
}

/// Snapshot taken at press time plus per-frame drag bookkeeping.
#[derive(Debug, Clone)]
pub struct DragState {
    /// Where the drag started, relative to the target center.
    pub origin_point: Vec3,
    /// The hand holding the drag.
    pub hand: Hand,
    pub initial_width: f32,
    pub initial_height: f32,
    pub initial_depth: f32,
    pub initial_rotation: f32,
    /// Previous frame's point, for the rotate handle's atan2 step.
    last_point: Vec3,
    /// Rotation accumulated since press, unsnapped, in radians.
    rotation_accum: f32,
    /// Whether the last emitted value sat on a snap target (edge trigger
    /// for the snap haptic).
    snap_engaged: bool,
    fine_tune: FineTuneState,
}

/// State machine for one handle: idle → hovering → active.
pub struct DragController {
    handle: HandleKind,
    phase: DragPhase,
    drag: Option<DragState>,
}

impl DragController {
    pub fn new(handle: HandleKind) -> Self {
        Self {
            handle,
            phase: DragPhase::Idle,
            drag: None,
        }
    }

    pub fn handle(&self) -> HandleKind {
        self.handle
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == DragPhase::Active
    }

    /// The in-progress drag, if any.
    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    /// The hand holding the in-progress drag, if any.
    pub fn drag_hand(&self) -> Option<Hand> {
        self.drag.as_ref().map(|d| d.hand)
    }

    /// The input ray moved onto the handle.
    pub fn hover_enter(&mut self, hand: Hand, haptics: &mut HapticDispatcher) {
        if self.phase == DragPhase::Idle {
            trace!("handle {:?} hover enter ({:?})", self.handle, hand);
            self.phase = DragPhase::Hovering;
            haptics.send(hand, HapticCue::HoverEnter);
        }
    }

    /// The input ray left the handle. While a drag is active this is the
    /// forced-release path: the drag ends exactly as if the grip had been
    /// released, and the controller lands in `Idle`. The controller is
    /// never left `Active` with a stale [`DragState`].
    pub fn hover_exit(&mut self, haptics: &mut HapticDispatcher) {
        match self.phase {
            DragPhase::Hovering => self.phase = DragPhase::Idle,
            DragPhase::Active => {
                debug!("handle {:?} lost hover mid-drag, forcing release", self.handle);
                self.end_drag(haptics);
                self.phase = DragPhase::Idle;
            }
            DragPhase::Idle => {}
        }
    }

    /// Begin a drag, snapshotting the target's current dimensions. Valid
    /// only from `Hovering`; the session additionally rejects presses
    /// while another handle is active or a pinch is engaged.
    pub fn press_start(
        &mut self,
        point: Vec3,
        hand: Hand,
        target: &ManipulationTarget,
        haptics: &mut HapticDispatcher,
    ) -> Result<(), GestureError> {
        if self.phase != DragPhase::Hovering {
            return Err(GestureError::NotHovering);
        }
        debug!("handle {:?} drag start ({:?})", self.handle, hand);
        self.phase = DragPhase::Active;
        self.drag = Some(DragState {
            origin_point: point,
            hand,
            initial_width: target.width,
            initial_height: target.height,
            initial_depth: target.depth,
            initial_rotation: target.rotation_z,
            last_point: point,
            rotation_accum: 0.0,
            snap_engaged: false,
            fine_tune: FineTuneState::default(),
        });
        haptics.send(hand, HapticCue::Grab);
        Ok(())
    }

    /// Advance an active drag with a new pointer sample. Returns the
    /// geometry change for this frame. Moves without an active drag and
    /// non-finite points are ignored.
    pub fn press_move(
        &mut self,
        point: Vec3,
        dt: f32,
        config: &ManipulationConfig,
        haptics: &mut HapticDispatcher,
    ) -> Option<ChangeEvent> {
        if self.phase != DragPhase::Active {
            trace!("handle {:?} move ignored: no active drag", self.handle);
            return None;
        }
        if !point.is_finite() {
            trace!("handle {:?} move ignored: non-finite point", self.handle);
            return None;
        }
        let handle = self.handle;
        let drag = self.drag.as_mut()?;

        let (event, snapped) = match handle {
            HandleKind::Corner(corner) => resize_corner(drag, corner, point, config),
            HandleKind::Edge(edge) => resize_edge(drag, edge, point, config),
            HandleKind::Rotate => rotate_step(drag, point, dt, config, haptics),
            HandleKind::Depth => push_depth(drag, point, config),
        };

        // snap haptic fires on the unsnapped -> snapped transition only
        if snapped && !drag.snap_engaged {
            haptics.send(drag.hand, HapticCue::SnapEngage);
        }
        drag.snap_engaged = snapped;
        Some(event)
    }

    /// Release an active drag. The ray is still on the handle, so the
    /// controller returns to `Hovering`.
    pub fn press_end(&mut self, haptics: &mut HapticDispatcher) -> Result<(), GestureError> {
        if self.phase != DragPhase::Active {
            return Err(GestureError::NotActive);
        }
        self.end_drag(haptics);
        self.phase = DragPhase::Hovering;
        Ok(())
    }

    /// End any active drag as if the grip had been released. Used when a
    /// pinch takes over the target or the session shuts down; a no-op
    /// otherwise.
    pub fn force_release(&mut self, haptics: &mut HapticDispatcher) {
        if self.phase == DragPhase::Active {
            self.end_drag(haptics);
            self.phase = DragPhase::Hovering;
        }
    }

    /// Abandon an active drag and return the event restoring the
    /// pre-drag geometry, so the host can revert a half-applied gesture.
    pub fn cancel(&mut self, haptics: &mut HapticDispatcher) -> Option<ChangeEvent> {
        if self.phase != DragPhase::Active {
            return None;
        }
        let drag = self.drag.take()?;
        self.phase = DragPhase::Idle;
        debug!("handle {:?} drag cancelled", self.handle);
        haptics.send(drag.hand, HapticCue::Release);
        Some(restore_event(self.handle, &drag))
    }

    fn end_drag(&mut self, haptics: &mut HapticDispatcher) {
        if let Some(drag) = self.drag.take() {
            debug!("handle {:?} drag end", self.handle);
            haptics.send(drag.hand, HapticCue::Release);
        }
    }
}

/// Drag delta expressed in the target's local frame at press time, so a
/// push "forward" is evaluated in the widget's own orientation.
fn local_delta(drag: &DragState, point: Vec3) -> Vec3 {
    Quat::from_rotation_z(-drag.initial_rotation) * (point - drag.origin_point)
}

fn resize_corner(
    drag: &DragState,
    corner: Corner,
    point: Vec3,
    config: &ManipulationConfig,
) -> (ChangeEvent, bool) {
    let local = local_delta(drag, point);
    let (sign_x, sign_y) = corner.delta_signs();
    let dw = sign_x * local.x;
    let dh = sign_y * local.y;

    if config.lock_aspect_ratio {
        // Common magnitude with a common sign; height is derived from the
        // locked ratio so the aspect stays exact. Grid snap applies to
        // width only for the same reason.
        let magnitude = (dw.abs() + dh.abs()) / 2.0;
        let delta = if dw + dh >= 0.0 { magnitude } else { -magnitude };
        let aspect = drag.initial_width / drag.initial_height.max(f32::EPSILON);
        let mut width = drag.initial_width + delta;
        let mut snapped = false;
        if config.snap_to_grid {
            let snap = snap_to_grid(width, config.grid_size, config.size_snap_threshold);
            width = snap.value;
            snapped = snap.snapped;
        }
        let (width, height) = clamp_with_aspect(width, aspect, &config.bounds);
        (ChangeEvent::Resize { width, height }, snapped)
    } else {
        let mut width = drag.initial_width + dw;
        let mut height = drag.initial_height + dh;
        let mut snapped = false;
        if config.snap_to_grid {
            let snap_w = snap_to_grid(width, config.grid_size, config.size_snap_threshold);
            let snap_h = snap_to_grid(height, config.grid_size, config.size_snap_threshold);
            width = snap_w.value;
            height = snap_h.value;
            snapped = snap_w.snapped || snap_h.snapped;
        }
        (
            ChangeEvent::Resize {
                width: config.bounds.clamp_size(width),
                height: config.bounds.clamp_size(height),
            },
            snapped,
        )
    }
}

/// Clamp a width to the range where both it and the derived height fit
/// the bounds, keeping the aspect ratio exact. An aspect so extreme that
/// no width satisfies both bounds keeps the ratio and gives up the
/// violated bound.
fn clamp_with_aspect(width: f32, aspect: f32, bounds: &SizeBounds) -> (f32, f32) {
    let lo = bounds.min_size.max(bounds.min_size * aspect);
    let hi = bounds.max_size.min(bounds.max_size * aspect).max(lo);
    let width = width.clamp(lo, hi);
    (width, width / aspect)
}

fn resize_edge(
    drag: &DragState,
    edge: Edge,
    point: Vec3,
    config: &ManipulationConfig,
) -> (ChangeEvent, bool) {
    let local = local_delta(drag, point);
    let mut width = drag.initial_width;
    let mut height = drag.initial_height;
    let changed = match edge {
        Edge::North => {
            height += local.y;
            &mut height
        }
        Edge::South => {
            height -= local.y;
            &mut height
        }
        Edge::East => {
            width += local.x;
            &mut width
        }
        Edge::West => {
            width -= local.x;
            &mut width
        }
    };

    let mut snapped = false;
    if config.snap_to_grid {
        let snap = snap_to_grid(*changed, config.grid_size, config.size_snap_threshold);
        *changed = snap.value;
        snapped = snap.snapped;
    }
    (
        ChangeEvent::Resize {
            width: config.bounds.clamp_size(width),
            height: config.bounds.clamp_size(height),
        },
        snapped,
    )
}

fn rotate_step(
    drag: &mut DragState,
    point: Vec3,
    dt: f32,
    config: &ManipulationConfig,
    haptics: &mut HapticDispatcher,
) -> (ChangeEvent, bool) {
    // per-frame angular step about the target center
    let previous = drag.last_point;
    drag.last_point = point;
    let step = wrap_angle(point.y.atan2(point.x) - previous.y.atan2(previous.x));
    drag.rotation_accum += step;

    // fine-tune: sustained slow rotation shrinks the snap radius; any
    // fast frame exits immediately
    let speed = if dt > 0.0 { step.abs() / dt } else { 0.0 };
    if speed < FINE_TUNE_SPEED {
        if !drag.fine_tune.active {
            drag.fine_tune.still_time += dt;
            if drag.fine_tune.still_time >= FINE_TUNE_DEBOUNCE {
                debug!("rotate fine-tune engaged");
                drag.fine_tune.active = true;
                haptics.send(drag.hand, HapticCue::FineTuneEnter);
            }
        }
    } else {
        drag.fine_tune.active = false;
        drag.fine_tune.still_time = 0.0;
    }

    let total = drag.initial_rotation + drag.rotation_accum;
    let (rotation_z, snapped) = if config.snap_angles {
        let threshold = if drag.fine_tune.active {
            config.angle_snap_threshold_deg * FINE_TUNE_THRESHOLD_SCALE
        } else {
            config.angle_snap_threshold_deg
        };
        let snap = snap_to_angle(total, config.angle_increment_deg, threshold);
        (snap.angle_rad, snap.snapped)
    } else {
        (total, false)
    };
    (
        ChangeEvent::Rotate {
            rotation_z,
            delta: wrap_angle(rotation_z - drag.initial_rotation),
        },
        snapped,
    )
}

fn push_depth(drag: &DragState, point: Vec3, config: &ManipulationConfig) -> (ChangeEvent, bool) {
    // only the rotation-compensated Z component matters; depth clamps
    // but does not grid-snap
    let local = local_delta(drag, point);
    (
        ChangeEvent::Depth {
            depth: config.bounds.clamp_depth(drag.initial_depth + local.z),
        },
        false,
    )
}

fn restore_event(handle: HandleKind, drag: &DragState) -> ChangeEvent {
    match handle {
        HandleKind::Corner(_) | HandleKind::Edge(_) => ChangeEvent::Resize {
            width: drag.initial_width,
            height: drag.initial_height,
        },
        HandleKind::Rotate => ChangeEvent::Rotate {
            rotation_z: drag.initial_rotation,
            delta: 0.0,
        },
        HandleKind::Depth => ChangeEvent::Depth {
            depth: drag.initial_depth,
        },
    }
}
