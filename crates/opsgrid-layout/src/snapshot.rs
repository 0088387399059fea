#![forbid(unsafe_code)]

//! Persisted layout snapshots.
//!
//! A [`LayoutSnapshot`] is the full set of widget rectangles at one point in
//! time. It serializes as a bare JSON array of `{id, x1, y1, w, h}` entries
//! so on-disk layouts round-trip verbatim through the persistence layer:
//!
//! ```json
//! [
//!   { "id": "tasks", "x1": 1, "y1": 1, "w": 8, "h": 6 },
//!   { "id": "links", "x1": 9, "y1": 1, "w": 4, "h": 4 }
//! ]
//! ```
//!
//! Snapshots captured from a running engine are at-rest states and trusted;
//! [`LayoutSnapshot::validate`] exists for snapshots arriving from storage,
//! where bounds, minimum sizes, duplicate ids, and pairwise overlap must be
//! checked before the no-overlap invariant can be assumed.

use std::fmt;

use opsgrid_core::geometry::GridRect;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// One widget's persisted placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetRecord {
    /// Stable widget identifier, unique within a snapshot.
    pub id: String,
    /// Leftmost occupied column (1-indexed).
    pub x1: u16,
    /// Topmost occupied row (1-indexed).
    pub y1: u16,
    /// Width in cells.
    pub w: u16,
    /// Height in cells.
    pub h: u16,
}

impl WidgetRecord {
    /// Create a record from an id and a grid rectangle.
    #[must_use]
    pub fn new(id: impl Into<String>, rect: GridRect) -> Self {
        Self {
            id: id.into(),
            x1: rect.x1,
            y1: rect.y1,
            w: rect.w,
            h: rect.h,
        }
    }

    /// The record's placement as a [`GridRect`].
    #[inline]
    #[must_use]
    pub const fn rect(&self) -> GridRect {
        GridRect::new(self.x1, self.y1, self.w, self.h)
    }
}

/// An ordered list of widget placements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutSnapshot {
    /// Widget placements in engine insertion order.
    pub widgets: Vec<WidgetRecord>,
}

impl LayoutSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of widgets in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether the snapshot contains no widgets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Look up a record by widget id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WidgetRecord> {
        self.widgets.iter().find(|record| record.id == id)
    }

    /// Validate a snapshot loaded from storage.
    ///
    /// Checks every rectangle for legal bounds and minimum size, ids for
    /// uniqueness, and all pairs for strict overlap. Returns the first
    /// violation found.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = FxHashSet::default();
        for record in &self.widgets {
            if !record.rect().in_bounds() {
                return Err(SnapshotError::OutOfBounds {
                    id: record.id.clone(),
                    rect: record.rect(),
                });
            }
            if !seen.insert(record.id.as_str()) {
                return Err(SnapshotError::DuplicateId {
                    id: record.id.clone(),
                });
            }
        }
        for (i, a) in self.widgets.iter().enumerate() {
            for b in &self.widgets[i + 1..] {
                if a.rect().overlaps(&b.rect()) {
                    return Err(SnapshotError::Overlap {
                        first: a.id.clone(),
                        second: b.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<WidgetRecord> for LayoutSnapshot {
    fn from_iter<I: IntoIterator<Item = WidgetRecord>>(iter: I) -> Self {
        Self {
            widgets: iter.into_iter().collect(),
        }
    }
}

/// Structural problems in a snapshot loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// A rectangle is off-grid or below minimum size.
    OutOfBounds { id: String, rect: GridRect },
    /// Two records share an id.
    DuplicateId { id: String },
    /// Two rectangles strictly overlap.
    Overlap { first: String, second: String },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { id, rect } => write!(
                f,
                "widget `{id}` is out of bounds: origin ({}, {}), size {}x{}",
                rect.x1, rect.y1, rect.w, rect.h
            ),
            Self::DuplicateId { id } => write!(f, "duplicate widget id `{id}`"),
            Self::Overlap { first, second } => {
                write!(f, "widgets `{first}` and `{second}` overlap")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}
