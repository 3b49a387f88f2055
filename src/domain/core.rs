//! Core domain types and operations
//!
//! This module defines the geometric value types shared by the topology and
//! the selection state machine. All coordinates are integer pixels in either
//! global (virtual-desktop) space or a single monitor's local space; the type
//! itself does not know which.

/// A point in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in pixel coordinates
///
/// `w` and `h` are extents, so the right edge is `x + w` (exclusive).
/// Rectangles with a non-positive extent are considered empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Creates a new rectangle
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Builds the normalized rectangle spanned by two corner points
    ///
    /// The corners may be given in any order; the result always has its origin
    /// at the top-left and a non-negative extent.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        let right = a.x.max(b.x);
        let bottom = a.y.max(b.y);

        Rect::new(left, top, right - left, bottom - top)
    }

    /// Returns the right edge coordinate
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Returns the bottom edge coordinate
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns true if the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Returns true if this rectangle contains the given point
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Returns the intersection of two rectangles, or None if they don't intersect
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Overlap in square pixels, `max(0, overlap_w) * max(0, overlap_h)`
    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let overlap_w = i64::from(self.right().min(other.right())) - i64::from(self.x.max(other.x));
        let overlap_h =
            i64::from(self.bottom().min(other.bottom())) - i64::from(self.y.max(other.y));

        overlap_w.max(0) * overlap_h.max(0)
    }

    /// Returns the bounding box that contains both rectangles
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Rect::new(left, top, right - left, bottom - top)
    }

    /// Returns the same rectangle shifted by `(dx, dy)`
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Clips the rectangle to `[0, width] x [0, height]`
    ///
    /// Returns None when nothing is left after clipping.
    pub fn clamp_to_extent(&self, width: i32, height: i32) -> Option<Rect> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);

        if right - left > 0 && bottom - top > 0 {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Horizontal centre, rounded towards the left edge
    pub fn center_x(&self) -> i32 {
        self.x + self.w / 2
    }

    /// Returns the area of the rectangle in square pixels
    pub fn area(&self) -> i64 {
        i64::from(self.w) * i64::from(self.h)
    }
}
