#![forbid(unsafe_code)]

//! Edit sessions: the commit/cancel protocol around layout editing.
//!
//! An [`EditSession`] brackets a period of layout editing. Entering takes a
//! synchronous snapshot of the at-rest layout and turns the engine's edit
//! mode on; finishing either persists the (already committed in memory)
//! layout through a [`LayoutStore`], or rolls the widgets back to the
//! snapshot. Escape cancels the whole *session*; there is deliberately no
//! per-gesture abort.
//!
//! Persistence is bounded at the session edges: nothing awaits storage
//! mid-transaction, and a failed save leaves the in-memory layout exactly
//! as it was, with no automatic retry.

use std::fmt;

use opsgrid_core::event::{KeyCode, KeyEvent};

use crate::engine::{GridEngine, GridSignal, LayoutError};
use crate::snapshot::LayoutSnapshot;

/// Persistence collaborator for layout snapshots.
///
/// Both operations are fallible; callers log failures and carry on with the
/// in-memory state unchanged.
pub trait LayoutStore {
    /// Store-specific error type.
    type Error: fmt::Display;

    /// Load the persisted layout.
    fn load(&self) -> Result<LayoutSnapshot, Self::Error>;

    /// Persist a layout snapshot.
    fn save(&mut self, snapshot: &LayoutSnapshot) -> Result<(), Self::Error>;
}

/// Load the persisted layout into an engine, creating missing widgets.
pub fn load_layout<S: LayoutStore>(
    engine: &mut GridEngine,
    store: &S,
) -> Result<(), LoadError<S::Error>> {
    let snapshot = store.load().map_err(LoadError::Store)?;
    engine.load_snapshot(&snapshot).map_err(LoadError::Layout)
}

/// Why loading a persisted layout failed.
#[derive(Debug)]
pub enum LoadError<E> {
    /// The store could not produce a snapshot.
    Store(E),
    /// The snapshot failed validation or application.
    Layout(LayoutError),
}

impl<E: fmt::Display> fmt::Display for LoadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "layout load failed: {err}"),
            Self::Layout(err) => write!(f, "layout load failed: {err}"),
        }
    }
}

impl<E: fmt::Display + fmt::Debug> std::error::Error for LoadError<E> {}

/// One edit session over a [`GridEngine`].
///
/// Holds the pre-session snapshot (the single level of undo this system
/// has) and a dirty flag driven by [`GridSignal::LayoutChanged`].
#[derive(Debug, Default)]
pub struct EditSession {
    snapshot: Option<LayoutSnapshot>,
    dirty: bool,
}

impl EditSession {
    /// Create an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is in progress.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Whether a drag or resize has committed since the session began.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Begin editing: snapshot the at-rest layout and enable edit mode.
    ///
    /// No-op if a session is already active.
    pub fn enter(&mut self, engine: &mut GridEngine) {
        if self.is_active() {
            return;
        }
        self.snapshot = Some(engine.get_layout());
        self.dirty = false;
        engine.set_edit_mode(true);
    }

    /// Feed engine signals through so the session can track dirtiness.
    pub fn observe(&mut self, signals: &[GridSignal]) {
        if self.is_active() && signals.contains(&GridSignal::LayoutChanged) {
            self.dirty = true;
        }
    }

    /// End the session, persisting the current layout.
    ///
    /// The layout was already committed in memory gesture by gesture; this
    /// only writes it out. On store failure the in-memory layout is left
    /// unchanged and the error is returned for the caller to log.
    pub fn save<S: LayoutStore>(
        &mut self,
        engine: &mut GridEngine,
        store: &mut S,
    ) -> Result<(), S::Error> {
        if !self.is_active() {
            return Ok(());
        }
        engine.set_edit_mode(false);
        self.snapshot = None;
        self.dirty = false;
        store.save(&engine.get_layout())
    }

    /// End the session, rolling the widgets back to the pre-session
    /// snapshot.
    pub fn cancel(&mut self, engine: &mut GridEngine) {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };
        engine.set_edit_mode(false);
        engine.set_layout(&snapshot);
        self.dirty = false;
    }

    /// Handle a key event. Escape cancels the active session.
    ///
    /// Returns `true` if the key was consumed.
    pub fn handle_key(&mut self, engine: &mut GridEngine, key: KeyEvent) -> bool {
        if key.code == KeyCode::Escape && self.is_active() {
            self.cancel(engine);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsgrid_core::event::PointerEvent;
    use opsgrid_core::geometry::{GridRect, PixelPoint, PixelRect};

    /// In-memory store with a failure switch.
    #[derive(Debug, Default)]
    struct MemoryStore {
        saved: Option<LayoutSnapshot>,
        fail: bool,
    }

    impl LayoutStore for MemoryStore {
        type Error = String;

        fn load(&self) -> Result<LayoutSnapshot, String> {
            if self.fail {
                return Err("load failed".into());
            }
            Ok(self.saved.clone().unwrap_or_default())
        }

        fn save(&mut self, snapshot: &LayoutSnapshot) -> Result<(), String> {
            if self.fail {
                return Err("save failed".into());
            }
            self.saved = Some(snapshot.clone());
            Ok(())
        }
    }

    fn engine_with_widgets() -> GridEngine {
        let mut engine = GridEngine::new(PixelRect::new(0.0, 0.0, 1200.0, 1200.0));
        engine.insert_widget("a", GridRect::new(1, 1, 8, 6)).unwrap();
        engine.insert_widget("b", GridRect::new(9, 1, 4, 4)).unwrap();
        engine
    }

    fn drag_a_to(engine: &mut GridEngine, session: &mut EditSession, col: u16, row: u16) {
        let pos = PixelPoint::new(f64::from(col - 1) * 50.0 + 5.0, f64::from(row - 1) * 50.0 + 5.0);
        session.observe(&engine.process(&PointerEvent::drag_start(PixelPoint::new(5.0, 5.0))));
        session.observe(&engine.process(&PointerEvent::drop(pos)));
        session.observe(&engine.process(&PointerEvent::DragEnd));
    }

    #[test]
    fn save_persists_through_store() {
        let mut engine = engine_with_widgets();
        let mut store = MemoryStore::default();
        let mut session = EditSession::new();

        session.enter(&mut engine);
        assert!(engine.is_editing());
        drag_a_to(&mut engine, &mut session, 1, 10);
        assert!(session.is_dirty());

        session.save(&mut engine, &mut store).unwrap();
        assert!(!engine.is_editing());
        assert!(!session.is_active());
        assert_eq!(store.saved.as_ref(), Some(&engine.get_layout()));
        assert_eq!(
            store.saved.unwrap().get("a").unwrap().rect(),
            GridRect::new(1, 10, 8, 6)
        );
    }

    #[test]
    fn cancel_restores_exactly() {
        let mut engine = engine_with_widgets();
        let mut session = EditSession::new();
        let before = engine.get_layout();

        session.enter(&mut engine);
        drag_a_to(&mut engine, &mut session, 1, 10);
        assert_ne!(engine.get_layout(), before);

        session.cancel(&mut engine);
        assert_eq!(engine.get_layout(), before);
        assert!(!engine.is_editing());
        assert!(!session.is_active());
    }

    #[test]
    fn escape_cancels_the_session() {
        let mut engine = engine_with_widgets();
        let mut session = EditSession::new();
        let before = engine.get_layout();

        session.enter(&mut engine);
        drag_a_to(&mut engine, &mut session, 1, 10);

        assert!(session.handle_key(&mut engine, KeyEvent::new(KeyCode::Escape)));
        assert_eq!(engine.get_layout(), before);

        // Escape outside a session is not consumed.
        assert!(!session.handle_key(&mut engine, KeyEvent::new(KeyCode::Escape)));
    }

    #[test]
    fn failed_save_leaves_memory_state() {
        let mut engine = engine_with_widgets();
        let mut store = MemoryStore {
            fail: true,
            ..MemoryStore::default()
        };
        let mut session = EditSession::new();

        session.enter(&mut engine);
        drag_a_to(&mut engine, &mut session, 1, 10);
        let committed = engine.get_layout();

        let result = session.save(&mut engine, &mut store);
        assert!(result.is_err());
        // The commit stands in memory; only the write failed.
        assert_eq!(engine.get_layout(), committed);
        assert!(store.saved.is_none());
    }

    #[test]
    fn load_layout_round_trips() {
        let mut engine = engine_with_widgets();
        let mut store = MemoryStore::default();
        let mut session = EditSession::new();
        session.enter(&mut engine);
        session.save(&mut engine, &mut store).unwrap();

        let mut fresh = GridEngine::new(PixelRect::new(0.0, 0.0, 1200.0, 1200.0));
        load_layout(&mut fresh, &store).unwrap();
        assert_eq!(fresh.get_layout(), engine.get_layout());
    }

    #[test]
    fn enter_twice_keeps_first_snapshot() {
        let mut engine = engine_with_widgets();
        let mut session = EditSession::new();
        let before = engine.get_layout();

        session.enter(&mut engine);
        drag_a_to(&mut engine, &mut session, 1, 10);
        session.enter(&mut engine);
        session.cancel(&mut engine);

        assert_eq!(engine.get_layout(), before);
    }
}
