#![forbid(unsafe_code)]

//! Collision-aware widget grid engine for the OpsGrid dashboard.
//!
//! The centerpiece is [`engine::GridEngine`]: a free-form 24×24 grid of
//! widgets with drag-and-drop and edge-resize driven by an abstract pointer
//! event stream, a live ghost preview with advisory collision feedback, and
//! strict commit-or-reject placement. [`session::EditSession`] wraps the
//! engine in the edit / save / cancel protocol, with persistence behind the
//! [`session::LayoutStore`] seam and on-disk state modeled by
//! [`snapshot::LayoutSnapshot`].

pub mod engine;
pub mod session;
pub mod snapshot;

pub use engine::{
    ContainerGeometry, DRAG_HANDLE_PX, GhostState, GridEngine, GridSignal, LayoutError,
    RESIZE_HANDLE_PX, ResizeDirection, SharedContainer, Widget,
};
pub use session::{EditSession, LayoutStore, LoadError, load_layout};
pub use snapshot::{LayoutSnapshot, SnapshotError, WidgetRecord};

pub use opsgrid_core::event::{KeyCode, KeyEvent, PointerButton, PointerEvent};
pub use opsgrid_core::geometry::{GRID_SIZE, GridRect, PixelPoint, PixelRect};
