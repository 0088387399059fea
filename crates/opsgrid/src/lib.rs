#![forbid(unsafe_code)]

//! OpsGrid public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from the internal crates and bundles the grid
//! engine, edit session, and file stores into a [`Dashboard`] that wires
//! them together the way a host application would.

use std::fmt;
use std::path::Path;

use tracing::warn;

// --- Core re-exports -------------------------------------------------------

pub use opsgrid_core::event::{
    KeyCode, KeyEvent, Modifiers, PointerButton, PointerEvent,
};
pub use opsgrid_core::geometry::{
    GRID_FAR_EDGE, GRID_SIZE, GridRect, PixelPoint, PixelRect,
};

// --- Layout re-exports -----------------------------------------------------

pub use opsgrid_layout::engine::{
    ContainerGeometry, GhostState, GridEngine, GridSignal, LayoutError, ResizeDirection,
    SharedContainer, Widget,
};
pub use opsgrid_layout::session::{EditSession, LayoutStore, load_layout};
pub use opsgrid_layout::snapshot::{LayoutSnapshot, SnapshotError, WidgetRecord};

// --- Store re-exports ------------------------------------------------------

pub use opsgrid_store::{
    Action, ActionKind, AutomationPreset, AutomationStore, FileLayoutStore, JsonFileStore, Link,
    LinkKind, LinkStore, Priority, Reminder, ReminderStore, Repeat, StoreError, Task, TaskKind,
    TaskStore,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for OpsGrid apps.
#[derive(Debug)]
pub enum Error {
    /// A layout operation was rejected.
    Layout(LayoutError),
    /// A data file could not be read or written.
    Store(StoreError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Standard result type for OpsGrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Dashboard facade ------------------------------------------------------

/// A fully wired dashboard: grid engine, edit session, and the file stores
/// for every widget's data, all rooted at one data directory.
pub struct Dashboard {
    engine: GridEngine,
    session: EditSession,
    layout_store: FileLayoutStore,
    files: JsonFileStore,
}

impl Dashboard {
    /// Wire a dashboard around a container and a data directory.
    ///
    /// Register widgets with [`Dashboard::engine_mut`], then call
    /// [`Dashboard::restore_layout`] to apply any persisted placements.
    #[must_use]
    pub fn new(geometry: impl ContainerGeometry + 'static, data_dir: impl AsRef<Path>) -> Self {
        let files = JsonFileStore::new(data_dir.as_ref());
        Self {
            engine: GridEngine::new(geometry),
            session: EditSession::new(),
            layout_store: FileLayoutStore::new(files.clone()),
            files,
        }
    }

    /// The grid engine, for registering widgets and inspecting state.
    #[must_use]
    pub fn engine(&self) -> &GridEngine {
        &self.engine
    }

    /// Mutable access to the grid engine.
    pub fn engine_mut(&mut self) -> &mut GridEngine {
        &mut self.engine
    }

    /// Apply the persisted layout over the registered widgets.
    ///
    /// A missing layout file leaves placements as registered. An invalid
    /// persisted layout is an error; the in-memory layout is untouched.
    pub fn restore_layout(&mut self) -> Result<()> {
        load_layout(&mut self.engine, &self.layout_store).map_err(|err| match err {
            opsgrid_layout::session::LoadError::Store(e) => Error::Store(e),
            opsgrid_layout::session::LoadError::Layout(e) => Error::Layout(e),
        })
    }

    /// Whether an edit session is active.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.session.is_active()
    }

    /// Begin a layout edit session.
    pub fn enter_edit(&mut self) {
        self.session.enter(&mut self.engine);
    }

    /// End the edit session, persisting the layout to `layout.json`.
    ///
    /// A failed write is logged and returned; the in-memory layout keeps
    /// its committed state either way.
    pub fn save_edit(&mut self) -> Result<()> {
        self.session
            .save(&mut self.engine, &mut self.layout_store)
            .map_err(|err| {
                warn!(%err, "layout save failed, in-memory layout kept");
                Error::Store(err)
            })
    }

    /// End the edit session, rolling the layout back to where it was when
    /// the session began.
    pub fn cancel_edit(&mut self) {
        self.session.cancel(&mut self.engine);
    }

    /// Route a pointer event through the engine, tracking session state.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Vec<GridSignal> {
        let signals = self.engine.process(event);
        self.session.observe(&signals);
        signals
    }

    /// Route a key event. Escape cancels an active edit session.
    ///
    /// Returns `true` if the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.session.handle_key(&mut self.engine, key)
    }

    /// Task storage over this dashboard's data directory.
    #[must_use]
    pub fn tasks(&self) -> TaskStore {
        TaskStore::new(self.files.clone())
    }

    /// Link storage over this dashboard's data directory.
    #[must_use]
    pub fn links(&self) -> LinkStore {
        LinkStore::new(self.files.clone())
    }

    /// Reminder storage over this dashboard's data directory.
    #[must_use]
    pub fn reminders(&self) -> ReminderStore {
        ReminderStore::new(self.files.clone())
    }

    /// Automation preset storage over this dashboard's data directory.
    #[must_use]
    pub fn automation(&self) -> AutomationStore {
        AutomationStore::new(self.files.clone())
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Dashboard, EditSession, Error, GridEngine, GridRect, GridSignal, KeyCode, KeyEvent,
        LayoutSnapshot, PixelPoint, PixelRect, PointerEvent, Result,
    };

    pub use crate::{core, layout, store};
}

pub use opsgrid_core as core;
pub use opsgrid_layout as layout;
pub use opsgrid_store as store;

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> PixelRect {
        PixelRect::new(0.0, 0.0, 1200.0, 1200.0)
    }

    #[test]
    fn edit_flow_persists_across_dashboards() {
        let dir = tempfile::tempdir().unwrap();

        let mut dash = Dashboard::new(container(), dir.path());
        dash.engine_mut()
            .insert_widget("tasks", GridRect::new(1, 1, 8, 6))
            .unwrap();
        dash.restore_layout().unwrap();

        dash.enter_edit();
        // Drag "tasks" from (1,1) to (1,10): cells are 50px square here.
        dash.handle_pointer(&PointerEvent::drag_start(PixelPoint::new(5.0, 5.0)));
        dash.handle_pointer(&PointerEvent::drop(PixelPoint::new(5.0, 455.0)));
        dash.handle_pointer(&PointerEvent::DragEnd);
        dash.save_edit().unwrap();

        let mut reopened = Dashboard::new(container(), dir.path());
        reopened
            .engine_mut()
            .insert_widget("tasks", GridRect::new(1, 1, 8, 6))
            .unwrap();
        reopened.restore_layout().unwrap();
        assert_eq!(
            reopened.engine().widget("tasks").unwrap().rect(),
            GridRect::new(1, 10, 8, 6)
        );
    }

    #[test]
    fn escape_cancels_an_edit() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = Dashboard::new(container(), dir.path());
        dash.engine_mut()
            .insert_widget("tasks", GridRect::new(1, 1, 8, 6))
            .unwrap();

        dash.enter_edit();
        dash.handle_pointer(&PointerEvent::drag_start(PixelPoint::new(5.0, 5.0)));
        dash.handle_pointer(&PointerEvent::drop(PixelPoint::new(5.0, 455.0)));
        dash.handle_pointer(&PointerEvent::DragEnd);

        assert!(dash.handle_key(KeyEvent::new(KeyCode::Escape)));
        assert!(!dash.is_editing());
        assert_eq!(
            dash.engine().widget("tasks").unwrap().rect(),
            GridRect::new(1, 1, 8, 6)
        );
    }

    #[test]
    fn stores_share_the_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dash = Dashboard::new(container(), dir.path());

        dash.tasks().upsert(Task::new("t1", "write docs")).unwrap();
        dash.links()
            .upsert(Link::new("l1", "Docs", "https://docs.example.com"))
            .unwrap();

        assert_eq!(dash.tasks().load().unwrap().len(), 1);
        assert_eq!(dash.links().load().unwrap().len(), 1);
        assert!(dir.path().join("tasks.json").exists());
        assert!(dir.path().join("links.json").exists());
    }
}
