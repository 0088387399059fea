#![forbid(unsafe_code)]

//! Geometric primitives for pixel space and grid space.

/// Number of columns and rows in the logical placement grid.
pub const GRID_SIZE: u16 = 24;

/// Exclusive upper bound for a widget's far edge (`GRID_SIZE + 1`).
pub const GRID_FAR_EDGE: u16 = GRID_SIZE + 1;

/// A point in continuous pixel space (origin at the page top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    /// Create a new pixel point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for PixelPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in continuous pixel space.
///
/// Used for the grid container's bounding box and for widgets projected back
/// into pixel space during hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    /// Left edge in pixels.
    pub left: f64,
    /// Top edge in pixels.
    pub top: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl PixelRect {
    /// Create a new pixel rectangle.
    #[inline]
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Check whether a point falls inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.left
            && point.x < self.right()
            && point.y >= self.top
            && point.y < self.bottom()
    }
}

/// A widget rectangle on the 24×24 logical grid.
///
/// Coordinates are 1-indexed; `x2()`/`y2()` are exclusive far edges, so a
/// full-width widget has `x1 == 1` and `x2() == 25`. Minimum size is one
/// cell in each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridRect {
    /// Leftmost occupied column (1-indexed).
    pub x1: u16,
    /// Topmost occupied row (1-indexed).
    pub y1: u16,
    /// Width in cells (≥ 1).
    pub w: u16,
    /// Height in cells (≥ 1).
    pub h: u16,
}

impl GridRect {
    /// Create a new grid rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x1: u16, y1: u16, w: u16, h: u16) -> Self {
        Self { x1, y1, w, h }
    }

    /// Exclusive right edge (`x1 + w`).
    #[inline]
    #[must_use]
    pub const fn x2(&self) -> u16 {
        self.x1 + self.w
    }

    /// Exclusive bottom edge (`y1 + h`).
    #[inline]
    #[must_use]
    pub const fn y2(&self) -> u16 {
        self.y1 + self.h
    }

    /// Strict open-interval overlap test.
    ///
    /// Touching edges do NOT count as overlapping, so widgets may sit flush
    /// against each other.
    #[must_use]
    pub const fn overlaps(&self, other: &GridRect) -> bool {
        self.x1 < other.x2() && self.x2() > other.x1 && self.y1 < other.y2() && self.y2() > other.y1
    }

    /// Whether the rectangle is a legal placement on the grid.
    ///
    /// Requires a 1-indexed origin, at least one cell per axis, and far
    /// edges within `GRID_FAR_EDGE`.
    #[must_use]
    pub const fn in_bounds(&self) -> bool {
        self.x1 >= 1
            && self.y1 >= 1
            && self.w >= 1
            && self.h >= 1
            && self.x2() <= GRID_FAR_EDGE
            && self.y2() <= GRID_FAR_EDGE
    }

    /// Place a `w`×`h` rectangle at a raw (possibly off-grid) cell origin,
    /// clamping so the far edge never leaves the grid.
    ///
    /// `col`/`row` are signed because a pointer left of or above the
    /// container converts to a cell index below 1.
    #[must_use]
    pub fn clamped_at(col: i32, row: i32, w: u16, h: u16) -> Self {
        let max_col = i32::from(GRID_FAR_EDGE.saturating_sub(w)).max(1);
        let max_row = i32::from(GRID_FAR_EDGE.saturating_sub(h)).max(1);
        Self {
            x1: col.clamp(1, max_col) as u16,
            y1: row.clamp(1, max_row) as u16,
            w,
            h,
        }
    }

    /// Shrink the rectangle in place so both far edges stay on the grid.
    pub fn clamp_far_edges(&mut self) {
        if self.x2() > GRID_FAR_EDGE {
            self.w = GRID_FAR_EDGE - self.x1;
        }
        if self.y2() > GRID_FAR_EDGE {
            self.h = GRID_FAR_EDGE - self.y1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GRID_FAR_EDGE, GridRect, PixelPoint, PixelRect};
    use proptest::prelude::*;

    #[test]
    fn pixel_rect_contains_edges() {
        let rect = PixelRect::new(10.0, 20.0, 100.0, 50.0);
        assert!(rect.contains(PixelPoint::new(10.0, 20.0)));
        assert!(rect.contains(PixelPoint::new(109.9, 69.9)));
        assert!(!rect.contains(PixelPoint::new(110.0, 20.0)));
        assert!(!rect.contains(PixelPoint::new(10.0, 70.0)));
    }

    #[test]
    fn grid_rect_far_edges() {
        let rect = GridRect::new(5, 1, 8, 6);
        assert_eq!(rect.x2(), 13);
        assert_eq!(rect.y2(), 7);
    }

    #[test]
    fn overlap_is_strict() {
        let a = GridRect::new(1, 1, 4, 4);
        // Flush against a's right edge: no overlap.
        let b = GridRect::new(5, 1, 4, 4);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        // One cell of intrusion: overlap.
        let c = GridRect::new(4, 4, 4, 4);
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn overlap_requires_both_axes() {
        let a = GridRect::new(1, 1, 4, 4);
        let shifted_x = GridRect::new(6, 1, 4, 4);
        let shifted_y = GridRect::new(1, 6, 4, 4);
        assert!(!a.overlaps(&shifted_x));
        assert!(!a.overlaps(&shifted_y));
    }

    #[test]
    fn clamped_at_keeps_far_edge_on_grid() {
        let rect = GridRect::clamped_at(30, -3, 8, 6);
        assert_eq!(rect, GridRect::new(17, 1, 8, 6));
        assert_eq!(rect.x2(), GRID_FAR_EDGE);
    }

    #[test]
    fn clamp_far_edges_shrinks() {
        let mut rect = GridRect::new(20, 22, 10, 10);
        rect.clamp_far_edges();
        assert_eq!(rect, GridRect::new(20, 22, 5, 3));
    }

    #[test]
    fn full_grid_widget_is_in_bounds() {
        assert!(GridRect::new(1, 1, 24, 24).in_bounds());
        assert!(!GridRect::new(2, 1, 24, 24).in_bounds());
        assert!(!GridRect::new(0, 1, 4, 4).in_bounds());
        assert!(!GridRect::new(1, 1, 0, 4).in_bounds());
    }

    proptest! {
        #[test]
        fn clamped_at_always_in_bounds(
            col in -100i32..100,
            row in -100i32..100,
            w in 1u16..=24,
            h in 1u16..=24,
        ) {
            let rect = GridRect::clamped_at(col, row, w, h);
            prop_assert!(rect.in_bounds());
            prop_assert_eq!(rect.w, w);
            prop_assert_eq!(rect.h, h);
        }

        #[test]
        fn overlap_is_symmetric(
            ax in 1u16..=21, ay in 1u16..=21, aw in 1u16..=4, ah in 1u16..=4,
            bx in 1u16..=21, by in 1u16..=21, bw in 1u16..=4, bh in 1u16..=4,
        ) {
            let a = GridRect::new(ax, ay, aw, ah);
            let b = GridRect::new(bx, by, bw, bh);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
