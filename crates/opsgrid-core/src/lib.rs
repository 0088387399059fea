#![forbid(unsafe_code)]

//! Core primitives for the OpsGrid dashboard engine.
//!
//! Two coordinate spaces coexist:
//!
//! - **Pixel space** ([`geometry::PixelPoint`], [`geometry::PixelRect`]):
//!   continuous, f64, origin at the top-left of the page. Pointer events and
//!   container bounding boxes live here.
//! - **Grid space** ([`geometry::GridRect`]): discrete 1-indexed cells on the
//!   fixed 24×24 logical grid. Widget placement lives here.
//!
//! The layout engine converts between the two on demand; nothing in this
//! crate holds state.

pub mod event;
pub mod geometry;

pub use event::{KeyCode, KeyEvent, Modifiers, PointerButton, PointerEvent};
pub use geometry::{GRID_SIZE, GridRect, PixelPoint, PixelRect};
