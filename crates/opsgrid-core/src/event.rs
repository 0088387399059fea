#![forbid(unsafe_code)]

//! Canonical input event types.
//!
//! The grid engine is driven by an abstract pointer-event stream rather than
//! any particular windowing toolkit. Hosts translate their native events
//! (HTML5 drag-and-drop, pointer events, a test script, ...) into
//! [`PointerEvent`]s carrying absolute pixel coordinates.
//!
//! Two channels exist, mirroring the two gesture protocols:
//!
//! - The **drag channel** (`DragStart` / `DragOver` / `Drop` / `DragEnd`)
//!   moves whole widgets. `DragOver` and `Drop` fire only while the pointer
//!   is over the grid container.
//! - The **pointer channel** (`Down` / `Move` / `Up`) resizes widgets via
//!   edge handles. `Move` and `Up` are tracked globally, because the pointer
//!   routinely leaves the widget bounds mid-resize.

use bitflags::bitflags;

use crate::geometry::PixelPoint;

/// A pointer event with absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// A drag gesture begins at the given position.
    DragStart { pos: PixelPoint },
    /// The pointer moved over the grid while dragging.
    DragOver { pos: PixelPoint },
    /// The dragged widget was released over the grid.
    Drop { pos: PixelPoint },
    /// The drag gesture ended (fires after `Drop`, or alone when the
    /// gesture was aborted).
    DragEnd,
    /// A button was pressed.
    Down {
        pos: PixelPoint,
        button: PointerButton,
    },
    /// The pointer moved (tracked globally, not just over the grid).
    Move { pos: PixelPoint },
    /// A button was released.
    Up { pos: PixelPoint },
}

impl PointerEvent {
    /// Shorthand for [`PointerEvent::DragStart`].
    #[must_use]
    pub const fn drag_start(pos: PixelPoint) -> Self {
        Self::DragStart { pos }
    }

    /// Shorthand for [`PointerEvent::DragOver`].
    #[must_use]
    pub const fn drag_over(pos: PixelPoint) -> Self {
        Self::DragOver { pos }
    }

    /// Shorthand for [`PointerEvent::Drop`].
    #[must_use]
    pub const fn drop(pos: PixelPoint) -> Self {
        Self::Drop { pos }
    }

    /// Shorthand for a primary-button [`PointerEvent::Down`].
    #[must_use]
    pub const fn down(pos: PixelPoint) -> Self {
        Self::Down {
            pos,
            button: PointerButton::Primary,
        }
    }

    /// Shorthand for [`PointerEvent::Move`].
    #[must_use]
    pub const fn moved(pos: PixelPoint) -> Self {
        Self::Move { pos }
    }

    /// Shorthand for [`PointerEvent::Up`].
    #[must_use]
    pub const fn up(pos: PixelPoint) -> Self {
        Self::Up { pos }
    }
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerButton {
    /// Left button on a right-handed mouse.
    #[default]
    Primary,
    /// Right button.
    Secondary,
    /// Middle button / wheel press.
    Middle,
}

/// A keyboard event.
///
/// Only the small slice of the keyboard relevant to edit sessions is
/// modeled (Escape cancels an edit session).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Escape key.
    Escape,
    /// Enter / Return.
    Enter,
    /// A printable character.
    Char(char),
}

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const SUPER = 0b1000;
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyCode, KeyEvent, Modifiers, PointerButton, PointerEvent};
    use crate::geometry::PixelPoint;

    #[test]
    fn shorthand_constructors() {
        let pos = PixelPoint::new(3.0, 4.0);
        assert_eq!(PointerEvent::drag_start(pos), PointerEvent::DragStart { pos });
        assert_eq!(
            PointerEvent::down(pos),
            PointerEvent::Down {
                pos,
                button: PointerButton::Primary,
            }
        );
    }

    #[test]
    fn key_event_builder() {
        let key = KeyEvent::new(KeyCode::Escape).with_modifiers(Modifiers::SHIFT);
        assert_eq!(key.code, KeyCode::Escape);
        assert!(key.modifiers.contains(Modifiers::SHIFT));
    }
}
