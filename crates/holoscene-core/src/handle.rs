//! Manipulation handle kinds and layout geometry.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Offset from the top edge to the rotate handle, in meters.
pub const ROTATE_HANDLE_OFFSET: f32 = 0.08;
/// Offset from the east edge to the depth handle, in meters.
pub const DEPTH_HANDLE_OFFSET: f32 = 0.06;
/// How far the depth handle sits along the local forward axis, in meters.
pub const DEPTH_HANDLE_FORWARD: f32 = 0.04;

/// Corner positions. North is the widget's local +Y, east its local +X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

impl Corner {
    /// Signs applied to the local-frame (Δx, Δy) when resizing from this
    /// corner: dragging a corner outward grows both dimensions.
    pub fn delta_signs(self) -> (f32, f32) {
        match self {
            Corner::NorthEast => (1.0, 1.0),
            Corner::NorthWest => (-1.0, 1.0),
            Corner::SouthEast => (1.0, -1.0),
            Corner::SouthWest => (-1.0, -1.0),
        }
    }
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    North,
    East,
    South,
    West,
}

/// Type of manipulation handle. Each value determines which axes of the
/// target a drag affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Corner handle, resizes width and height together.
    Corner(Corner),
    /// Edge midpoint handle, resizes the single perpendicular axis.
    Edge(Edge),
    /// Rotation handle, positioned above the top edge.
    Rotate,
    /// Push/pull handle, positioned off the east edge along local forward.
    Depth,
}

impl HandleKind {
    /// Every handle a widget carries, in layout order.
    pub const ALL: [HandleKind; 10] = [
        HandleKind::Corner(Corner::NorthWest),
        HandleKind::Corner(Corner::NorthEast),
        HandleKind::Corner(Corner::SouthEast),
        HandleKind::Corner(Corner::SouthWest),
        HandleKind::Edge(Edge::North),
        HandleKind::Edge(Edge::East),
        HandleKind::Edge(Edge::South),
        HandleKind::Edge(Edge::West),
        HandleKind::Rotate,
        HandleKind::Depth,
    ];
}

/// A handle with its position in target-local space (relative to the
/// widget center, world-oriented after layout rotation).
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position relative to the widget center.
    pub position: Vec3,
    /// Handle type.
    pub kind: HandleKind,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Vec3, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check whether a point hits this handle. `tolerance` is the grab
    /// sphere radius in meters.
    pub fn hit_test(&self, point: Vec3, tolerance: f32) -> bool {
        self.position.distance_squared(point) <= tolerance * tolerance
    }
}

/// Compute the positions of all ten handles for the given widget size.
///
/// Corners sit at `(±width/2, ±height/2, z_offset)`, edges at the edge
/// midpoints, the rotate handle above the top edge by
/// [`ROTATE_HANDLE_OFFSET`], and the depth handle off the east edge,
/// pushed along the local forward axis by [`DEPTH_HANDLE_FORWARD`]. All
/// positions are rotated by `rotation_offset` about Z. Pure; called once
/// per render, not part of the gesture state machine.
pub fn layout(width: f32, height: f32, z_offset: f32, rotation_offset: f32) -> Vec<Handle> {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let rot = Quat::from_rotation_z(rotation_offset);
    let place = |x: f32, y: f32, z: f32| rot * Vec3::new(x, y, z);

    vec![
        Handle::new(
            place(-hw, hh, z_offset),
            HandleKind::Corner(Corner::NorthWest),
        ),
        Handle::new(
            place(hw, hh, z_offset),
            HandleKind::Corner(Corner::NorthEast),
        ),
        Handle::new(
            place(hw, -hh, z_offset),
            HandleKind::Corner(Corner::SouthEast),
        ),
        Handle::new(
            place(-hw, -hh, z_offset),
            HandleKind::Corner(Corner::SouthWest),
        ),
        Handle::new(place(0.0, hh, z_offset), HandleKind::Edge(Edge::North)),
        Handle::new(place(hw, 0.0, z_offset), HandleKind::Edge(Edge::East)),
        Handle::new(place(0.0, -hh, z_offset), HandleKind::Edge(Edge::South)),
        Handle::new(place(-hw, 0.0, z_offset), HandleKind::Edge(Edge::West)),
        Handle::new(
            place(0.0, hh + ROTATE_HANDLE_OFFSET, z_offset),
            HandleKind::Rotate,
        ),
        Handle::new(
            place(
                hw + DEPTH_HANDLE_OFFSET,
                0.0,
                z_offset + DEPTH_HANDLE_FORWARD,
            ),
            HandleKind::Depth,
        ),
    ]
}

/// Find which handle (if any) a point hits. Returns the first hit in
/// layout order.
pub fn hit_test_handles(handles: &[Handle], point: Vec3, tolerance: f32) -> Option<HandleKind> {
    handles
        .iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.kind)
}
