//! HoloScene Core Library
//!
//! Platform-agnostic data model, handle geometry, and snap math shared by
//! the HoloScene direct-manipulation gesture engine.

pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod input;
pub mod snap;
pub mod target;

pub use config::ManipulationConfig;
pub use error::{ConfigError, GestureError};
pub use events::ChangeEvent;
pub use handle::{Corner, Edge, Handle, HandleKind, hit_test_handles, layout};
pub use input::{FrameInput, GripState, Hand, HoverHit, InputSample, RaySource};
pub use snap::{AngleSnapResult, SnapResult, snap_to_angle, snap_to_grid, wrap_angle};
pub use target::{ManipulationTarget, SizeBounds, TargetId};
