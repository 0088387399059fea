#![forbid(unsafe_code)]

//! The grid layout engine: collision-aware drag-and-drop and resize on a
//! fixed 24×24 widget grid.
//!
//! [`GridEngine`] owns the widget rectangles (the single authoritative
//! representation of both position and size; any rendering surface is a
//! projection of this state), converts pointer pixels to grid cells against
//! a lazily sampled container bounding box, and runs two explicit state
//! machines over the incoming [`PointerEvent`] stream:
//!
//! ```text
//! Drag:   Idle → Dragging → {Committed, Cancelled} → Idle
//! Resize: Idle → Resizing → {Committed, Cancelled} → Idle
//! ```
//!
//! # Invariants
//!
//! 1. At rest (no active transaction), no two widget rectangles strictly
//!    overlap. Touching edges are allowed.
//! 2. Every widget rectangle satisfies `1 ≤ x1`, `x1 + w ≤ 25` (and the
//!    vertical analogue) at all times.
//! 3. At most one transaction (drag XOR resize) is active at a time;
//!    starting a second is structurally impossible.
//! 4. A gesture either commits its candidate rectangle whole or leaves the
//!    layout exactly as it was. There are no partial updates.
//!
//! # Failure Modes
//!
//! No operation panics under normal use. A missing or degenerate container
//! bounding box makes pointer handlers return without effect; an invalid
//! placement is silently rejected with the widget keeping its prior
//! rectangle. The ghost's validity flag is purely advisory and never blocks
//! pointer movement.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use opsgrid_core::event::PointerEvent;
use opsgrid_core::geometry::{GRID_SIZE, GridRect, PixelPoint, PixelRect};
use rustc_hash::FxHashMap;

use crate::snapshot::{LayoutSnapshot, SnapshotError, WidgetRecord};

/// Side length of the square drag-handle region anchored at a widget's
/// rendered top-left corner, in logical pixels. Drag gestures starting
/// outside it are rejected so the widget body stays free for ordinary
/// content interaction.
pub const DRAG_HANDLE_PX: f64 = 40.0;

/// Thickness of the edge strips that act as resize handles, in logical
/// pixels.
pub const RESIZE_HANDLE_PX: f64 = 10.0;

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// On-demand provider of the grid container's pixel bounding box.
///
/// Sampled at the start of every pointer-to-grid conversion because the
/// container may have resized since the last sample. Returning `None` (or a
/// degenerate box) makes the engine treat the operation as a guarded no-op.
pub trait ContainerGeometry {
    /// The container's current bounding box, if the container exists.
    fn bounding_box(&self) -> Option<PixelRect>;
}

impl ContainerGeometry for PixelRect {
    fn bounding_box(&self) -> Option<PixelRect> {
        Some(*self)
    }
}

/// A [`ContainerGeometry`] whose bounding box can be swapped out from
/// outside the engine, for hosts whose container resizes or comes and goes.
///
/// Cheap to clone; clones share the same box.
#[derive(Debug, Clone, Default)]
pub struct SharedContainer(Rc<Cell<Option<PixelRect>>>);

impl SharedContainer {
    /// Create a shared container with an initial bounding box.
    #[must_use]
    pub fn new(rect: PixelRect) -> Self {
        Self(Rc::new(Cell::new(Some(rect))))
    }

    /// Create a shared container with no bounding box yet.
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    /// Replace the bounding box (`None` = container gone).
    pub fn set(&self, rect: Option<PixelRect>) {
        self.0.set(rect);
    }
}

impl ContainerGeometry for SharedContainer {
    fn bounding_box(&self) -> Option<PixelRect> {
        self.0.get()
    }
}

// ---------------------------------------------------------------------------
// Engine state
// ---------------------------------------------------------------------------

/// A widget placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    id: String,
    rect: GridRect,
}

impl Widget {
    /// Stable identifier, unique among the engine's widgets.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current placement.
    #[inline]
    #[must_use]
    pub const fn rect(&self) -> GridRect {
        self.rect
    }
}

/// The transient drag/resize preview rectangle.
///
/// Exactly one ghost exists per grid; it is shown only while a transaction
/// is active. The validity flag is visual feedback only; the ghost itself
/// never collides with anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostState {
    /// Where the ghost is drawn.
    pub rect: GridRect,
    /// Whether the previewed placement is collision-free.
    pub valid: bool,
}

/// Which edge handle a resize was grabbed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeDirection {
    North,
    East,
    South,
    West,
}

/// Cached container metrics: bounding box and derived cell sizes.
#[derive(Debug, Clone, Copy)]
struct GridMetrics {
    rect: PixelRect,
    col_size: f64,
    row_size: f64,
}

impl GridMetrics {
    fn sample(geometry: &dyn ContainerGeometry) -> Option<Self> {
        let rect = geometry.bounding_box()?;
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return None;
        }
        Some(Self {
            rect,
            col_size: rect.width / f64::from(GRID_SIZE),
            row_size: rect.height / f64::from(GRID_SIZE),
        })
    }

    /// Convert a pointer position to a clamped cell origin for a `w`×`h`
    /// widget.
    fn cell_at(&self, pos: PixelPoint, w: u16, h: u16) -> GridRect {
        let col = ((pos.x - self.rect.left) / self.col_size).floor() as i32 + 1;
        let row = ((pos.y - self.rect.top) / self.row_size).floor() as i32 + 1;
        GridRect::clamped_at(col, row, w, h)
    }

    /// A widget rectangle projected into pixel space.
    fn project(&self, rect: GridRect) -> PixelRect {
        PixelRect::new(
            self.rect.left + f64::from(rect.x1 - 1) * self.col_size,
            self.rect.top + f64::from(rect.y1 - 1) * self.row_size,
            f64::from(rect.w) * self.col_size,
            f64::from(rect.h) * self.row_size,
        )
    }
}

/// An in-flight drag.
#[derive(Debug, Clone, Copy)]
struct DragState {
    /// Index of the dragged widget.
    widget: usize,
    /// Size captured at gesture start; the candidate keeps it.
    w: u16,
    h: u16,
}

/// An in-flight resize.
#[derive(Debug, Clone, Copy)]
struct ResizeState {
    /// Index of the widget being resized.
    widget: usize,
    direction: ResizeDirection,
    /// Metrics at gesture start.
    start_rect: GridRect,
    /// Pointer position at gesture start.
    start_pointer: PixelPoint,
    /// Latest collision-free candidate. A colliding candidate clears this,
    /// so a gesture released over a collision reverts whole.
    latest_valid: Option<GridRect>,
}

#[derive(Debug, Clone, Copy)]
enum Transaction {
    Drag(DragState),
    Resize(ResizeState),
}

/// Outputs produced while processing pointer events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridSignal {
    /// The ghost moved or changed validity.
    GhostMoved { rect: GridRect, valid: bool },
    /// The ghost was hidden.
    GhostHidden,
    /// A drag or resize committed; hosts should mark layout state dirty.
    LayoutChanged,
    /// A drop landed on a colliding candidate and was discarded whole.
    DropRejected,
}

/// Errors from widget registration and snapshot application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A widget with this id already exists.
    DuplicateWidget { id: String },
    /// The rectangle is off-grid or below minimum size.
    OutOfBounds { id: String, rect: GridRect },
    /// The rectangle strictly overlaps an existing widget.
    Overlap { id: String, other: String },
    /// A loaded snapshot failed structural validation.
    InvalidSnapshot(SnapshotError),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateWidget { id } => write!(f, "widget `{id}` already exists"),
            Self::OutOfBounds { id, rect } => write!(
                f,
                "widget `{id}` placement out of bounds: origin ({}, {}), size {}x{}",
                rect.x1, rect.y1, rect.w, rect.h
            ),
            Self::Overlap { id, other } => {
                write!(f, "widget `{id}` would overlap widget `{other}`")
            }
            Self::InvalidSnapshot(err) => write!(f, "invalid layout snapshot: {err}"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSnapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SnapshotError> for LayoutError {
    fn from(err: SnapshotError) -> Self {
        Self::InvalidSnapshot(err)
    }
}

// ---------------------------------------------------------------------------
// GridEngine
// ---------------------------------------------------------------------------

/// The grid layout engine. One instance per dashboard view.
pub struct GridEngine {
    geometry: Box<dyn ContainerGeometry>,
    widgets: Vec<Widget>,
    index: FxHashMap<String, usize>,
    ghost: Option<GhostState>,
    editing: bool,
    metrics: Option<GridMetrics>,
    transaction: Option<Transaction>,
}

impl fmt::Debug for GridEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridEngine")
            .field("widgets", &self.widgets.len())
            .field("editing", &self.editing)
            .field("transaction_active", &self.transaction.is_some())
            .finish()
    }
}

impl GridEngine {
    /// Create an engine over the given container geometry provider.
    #[must_use]
    pub fn new(geometry: impl ContainerGeometry + 'static) -> Self {
        Self {
            geometry: Box::new(geometry),
            widgets: Vec::new(),
            index: FxHashMap::default(),
            ghost: None,
            editing: false,
            metrics: None,
            transaction: None,
        }
    }

    // -- Registry ----------------------------------------------------------

    /// Register a widget at a fixed placement.
    ///
    /// Rejects duplicate ids, off-grid rectangles, and placements that
    /// would strictly overlap an existing widget.
    pub fn insert_widget(
        &mut self,
        id: impl Into<String>,
        rect: GridRect,
    ) -> Result<(), LayoutError> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(LayoutError::DuplicateWidget { id });
        }
        if !rect.in_bounds() {
            return Err(LayoutError::OutOfBounds { id, rect });
        }
        if let Some(other) = self.widgets.iter().find(|w| w.rect.overlaps(&rect)) {
            return Err(LayoutError::Overlap {
                id,
                other: other.id.clone(),
            });
        }
        self.index.insert(id.clone(), self.widgets.len());
        self.widgets.push(Widget { id, rect });
        Ok(())
    }

    /// Register a widget without a caller-supplied id, assigning one.
    ///
    /// Returns the generated id.
    pub fn insert_anonymous(&mut self, rect: GridRect) -> Result<String, LayoutError> {
        let mut n = self.widgets.len();
        let mut id = format!("widget-auto-{n}");
        while self.index.contains_key(&id) {
            n += 1;
            id = format!("widget-auto-{n}");
        }
        self.insert_widget(id.clone(), rect)?;
        Ok(id)
    }

    /// All widgets in insertion order.
    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter()
    }

    /// Look up a widget by id.
    #[must_use]
    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.index.get(id).map(|&i| &self.widgets[i])
    }

    /// Number of registered widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether no widgets are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    // -- Edit mode and snapshots -------------------------------------------

    /// Toggle whether drag/resize input is live.
    ///
    /// Disabling edit mode does not implicitly commit an in-progress
    /// transaction; callers are expected to have resolved it first.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.editing = enabled;
    }

    /// Whether edit mode is on.
    #[inline]
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.editing
    }

    /// Whether a drag or resize transaction is currently active.
    #[inline]
    #[must_use]
    pub const fn transaction_active(&self) -> bool {
        self.transaction.is_some()
    }

    /// The ghost preview, if a transaction is showing one.
    #[inline]
    #[must_use]
    pub const fn ghost(&self) -> Option<&GhostState> {
        self.ghost.as_ref()
    }

    /// Capture the current layout as data.
    ///
    /// Calling this repeatedly without intervening mutation returns equal
    /// snapshots.
    #[must_use]
    pub fn get_layout(&self) -> LayoutSnapshot {
        self.widgets
            .iter()
            .map(|w| WidgetRecord::new(w.id.clone(), w.rect))
            .collect()
    }

    /// Apply a previously captured snapshot back onto the widgets.
    ///
    /// Used for cancel/rollback; the snapshot is a prior at-rest state and
    /// is not re-validated. Records for unknown ids are ignored; widgets
    /// missing from the snapshot keep their current placement.
    pub fn set_layout(&mut self, snapshot: &LayoutSnapshot) {
        for record in &snapshot.widgets {
            if let Some(&i) = self.index.get(record.id.as_str()) {
                self.widgets[i].rect = record.rect();
            }
        }
    }

    /// Validate and apply a snapshot loaded from storage, creating widgets
    /// that do not exist yet.
    pub fn load_snapshot(&mut self, snapshot: &LayoutSnapshot) -> Result<(), LayoutError> {
        snapshot.validate()?;
        for record in &snapshot.widgets {
            if let Some(&i) = self.index.get(record.id.as_str()) {
                self.widgets[i].rect = record.rect();
            } else {
                self.insert_widget(record.id.clone(), record.rect())?;
            }
        }
        Ok(())
    }

    /// Re-sample the container bounding box and recompute cell sizes.
    ///
    /// Returns `false` (and keeps the engine inert) when the container is
    /// missing or degenerate.
    pub fn update_cache(&mut self) -> bool {
        self.metrics = GridMetrics::sample(self.geometry.as_ref());
        self.metrics.is_some()
    }

    // -- Event processing --------------------------------------------------

    /// Process one pointer event, returning any signals produced.
    ///
    /// Stray events (no active transaction, edit mode off, container
    /// missing) are harmless no-ops.
    pub fn process(&mut self, event: &PointerEvent) -> Vec<GridSignal> {
        let mut out = Vec::with_capacity(2);
        match *event {
            PointerEvent::DragStart { pos } => self.on_drag_start(pos, &mut out),
            PointerEvent::DragOver { pos } => self.on_drag_over(pos, &mut out),
            PointerEvent::Drop { pos } => self.on_drop(pos, &mut out),
            PointerEvent::DragEnd => self.on_drag_end(&mut out),
            PointerEvent::Down { pos, .. } => self.on_pointer_down(pos, &mut out),
            PointerEvent::Move { pos } => self.on_pointer_move(pos, &mut out),
            PointerEvent::Up { .. } => self.on_pointer_up(&mut out),
        }
        out
    }

    fn on_drag_start(&mut self, pos: PixelPoint, out: &mut Vec<GridSignal>) {
        if !self.editing || self.transaction.is_some() || !self.update_cache() {
            return;
        }
        let Some(metrics) = self.metrics else { return };

        let Some(idx) = self
            .widgets
            .iter()
            .position(|w| metrics.project(w.rect).contains(pos))
        else {
            return;
        };

        // The gesture must begin inside the 40x40 handle at the widget's
        // rendered top-left; everywhere else belongs to widget content.
        let wrect = metrics.project(self.widgets[idx].rect);
        if pos.x - wrect.left > DRAG_HANDLE_PX || pos.y - wrect.top > DRAG_HANDLE_PX {
            return;
        }

        let rect = self.widgets[idx].rect;
        self.transaction = Some(Transaction::Drag(DragState {
            widget: idx,
            w: rect.w,
            h: rect.h,
        }));
        self.show_ghost(rect, true, out);
    }

    fn on_drag_over(&mut self, pos: PixelPoint, out: &mut Vec<GridSignal>) {
        if !self.editing {
            return;
        }
        let Some(Transaction::Drag(drag)) = self.transaction else {
            return;
        };
        if !self.update_cache() {
            return;
        }
        let Some(metrics) = self.metrics else { return };

        let candidate = metrics.cell_at(pos, drag.w, drag.h);
        let valid = !self.collides(candidate, drag.widget);
        self.show_ghost(candidate, valid, out);
    }

    fn on_drop(&mut self, pos: PixelPoint, out: &mut Vec<GridSignal>) {
        if !self.editing || !matches!(self.transaction, Some(Transaction::Drag(_))) {
            return;
        }
        self.hide_ghost(out);
        let Some(Transaction::Drag(drag)) = self.transaction.take() else {
            return;
        };
        if !self.update_cache() {
            return;
        }
        let Some(metrics) = self.metrics else { return };

        let candidate = metrics.cell_at(pos, drag.w, drag.h);
        if self.collides(candidate, drag.widget) {
            // The widget keeps its prior rectangle, whole.
            out.push(GridSignal::DropRejected);
        } else {
            self.widgets[drag.widget].rect = candidate;
            out.push(GridSignal::LayoutChanged);
        }
    }

    fn on_drag_end(&mut self, out: &mut Vec<GridSignal>) {
        // A resize in flight is none of the drag channel's business.
        if matches!(self.transaction, Some(Transaction::Resize(_))) {
            return;
        }
        self.transaction = None;
        self.hide_ghost(out);
    }

    fn on_pointer_down(&mut self, pos: PixelPoint, out: &mut Vec<GridSignal>) {
        if !self.editing || self.transaction.is_some() || !self.update_cache() {
            return;
        }
        let Some(metrics) = self.metrics else { return };

        let Some((idx, direction)) = self.hit_resize_handle(&metrics, pos) else {
            return;
        };

        let rect = self.widgets[idx].rect;
        self.transaction = Some(Transaction::Resize(ResizeState {
            widget: idx,
            direction,
            start_rect: rect,
            start_pointer: pos,
            latest_valid: None,
        }));
        self.show_ghost(rect, true, out);
    }

    fn on_pointer_move(&mut self, pos: PixelPoint, out: &mut Vec<GridSignal>) {
        if !self.editing {
            return;
        }
        let Some(Transaction::Resize(resize)) = self.transaction else {
            return;
        };
        if !self.update_cache() {
            return;
        }
        let Some(metrics) = self.metrics else { return };

        let delta_col = ((pos.x - resize.start_pointer.x) / metrics.col_size).round() as i32;
        let delta_row = ((pos.y - resize.start_pointer.y) / metrics.row_size).round() as i32;

        let candidate = apply_resize(resize.start_rect, resize.direction, delta_col, delta_row);
        let valid = !self.collides(candidate, resize.widget);

        if let Some(Transaction::Resize(resize)) = &mut self.transaction {
            // Only a collision-free candidate is committable; a colliding
            // one clears the slot so releasing over a collision reverts.
            resize.latest_valid = valid.then_some(candidate);
        }
        self.show_ghost(candidate, valid, out);
    }

    fn on_pointer_up(&mut self, out: &mut Vec<GridSignal>) {
        if !matches!(self.transaction, Some(Transaction::Resize(_))) {
            return;
        }
        let Some(Transaction::Resize(resize)) = self.transaction.take() else {
            return;
        };
        if let Some(rect) = resize.latest_valid {
            self.widgets[resize.widget].rect = rect;
            out.push(GridSignal::LayoutChanged);
        }
        self.hide_ghost(out);
    }

    // -- Internals ---------------------------------------------------------

    /// Strict overlap test of a candidate against every other widget.
    fn collides(&self, candidate: GridRect, exclude: usize) -> bool {
        self.widgets
            .iter()
            .enumerate()
            .any(|(i, w)| i != exclude && w.rect.overlaps(&candidate))
    }

    /// Find the widget edge handle under the pointer, if any.
    ///
    /// Tests each widget's projected rectangle; within one, the nearest
    /// edge wins, provided the pointer is within the handle strip.
    fn hit_resize_handle(
        &self,
        metrics: &GridMetrics,
        pos: PixelPoint,
    ) -> Option<(usize, ResizeDirection)> {
        for (idx, widget) in self.widgets.iter().enumerate() {
            let rect = metrics.project(widget.rect);
            if !rect.contains(pos) {
                continue;
            }
            let edges = [
                (pos.y - rect.top, ResizeDirection::North),
                (rect.right() - pos.x, ResizeDirection::East),
                (rect.bottom() - pos.y, ResizeDirection::South),
                (pos.x - rect.left, ResizeDirection::West),
            ];
            let (distance, direction) = edges
                .into_iter()
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .unwrap_or((f64::INFINITY, ResizeDirection::North));
            if distance <= RESIZE_HANDLE_PX {
                return Some((idx, direction));
            }
            // Pointer is inside this widget but not on a handle; no other
            // widget can contain it (no overlap at rest).
            return None;
        }
        None
    }

    fn show_ghost(&mut self, rect: GridRect, valid: bool, out: &mut Vec<GridSignal>) {
        self.ghost = Some(GhostState { rect, valid });
        out.push(GridSignal::GhostMoved { rect, valid });
    }

    fn hide_ghost(&mut self, out: &mut Vec<GridSignal>) {
        if self.ghost.take().is_some() {
            out.push(GridSignal::GhostHidden);
        }
    }
}

/// Apply a directional cell delta to a resize baseline.
///
/// East/south grow or shrink from the fixed opposite edge with a one-cell
/// minimum. West/north move the near edge, clamped so it never crosses past
/// the far edge minus one, and adjust the size by the clamped delta so the
/// far edge stays fixed. Far edges are then clamped back onto the grid.
fn apply_resize(
    start: GridRect,
    direction: ResizeDirection,
    delta_col: i32,
    delta_row: i32,
) -> GridRect {
    let mut rect = start;
    match direction {
        ResizeDirection::East => {
            let w = (i32::from(start.w) + delta_col).clamp(1, i32::from(GRID_SIZE));
            rect.w = w as u16;
        }
        ResizeDirection::South => {
            let h = (i32::from(start.h) + delta_row).clamp(1, i32::from(GRID_SIZE));
            rect.h = h as u16;
        }
        ResizeDirection::West => {
            let max_x1 = i32::from(start.x2()) - 1;
            let new_x1 = (i32::from(start.x1) + delta_col).clamp(1, max_x1);
            let actual = i32::from(start.x1) - new_x1;
            rect.x1 = new_x1 as u16;
            rect.w = (i32::from(start.w) + actual) as u16;
        }
        ResizeDirection::North => {
            let max_y1 = i32::from(start.y2()) - 1;
            let new_y1 = (i32::from(start.y1) + delta_row).clamp(1, max_y1);
            let actual = i32::from(start.y1) - new_y1;
            rect.y1 = new_y1 as u16;
            rect.h = (i32::from(start.h) + actual) as u16;
        }
    }
    rect.clamp_far_edges();
    rect
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
