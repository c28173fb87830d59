//! Geometric types for capture regions and annotation coordinates
//!
//! Everything is in absolute screen pixels. A `Rect` may be stored
//! un-normalized while a drag is in flight; use `normalized()` before
//! reading it as a region.

use serde::{Deserialize, Serialize};

/// A point in absolute screen pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn translate(self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

/// Rectangle given by two corners (x1, y1) - (x2, y2)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from coordinates
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle spanned by two drag endpoints, normalized
    pub fn from_points(a: Point, b: Point) -> Self {
        Rect::new(a.x, a.y, b.x, b.y).normalized()
    }

    /// Screen-sized rectangle anchored at the origin
    pub fn from_size(width: u32, height: u32) -> Self {
        Rect::new(0, 0, width as i32, height as i32)
    }

    /// Swap coordinates so that left <= right and top <= bottom
    pub fn normalized(&self) -> Rect {
        Rect {
            left: self.left.min(self.right),
            top: self.top.min(self.bottom),
            right: self.left.max(self.right),
            bottom: self.top.max(self.bottom),
        }
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();
        let left = a.left.max(b.left);
        let top = a.top.max(b.top);
        let right = a.right.min(b.right);
        let bottom = a.bottom.min(b.bottom);
        if left < right && top < bottom {
            Some(Rect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Translate the rectangle by the given offset
    pub fn translate(&self, x: i32, y: i32) -> Rect {
        Rect {
            left: self.left + x,
            top: self.top + y,
            right: self.right + x,
            bottom: self.bottom + y,
        }
    }

    /// Get the width of the rectangle
    pub fn width(&self) -> i32 {
        (self.right - self.left).abs()
    }

    /// Get the height of the rectangle
    pub fn height(&self) -> i32 {
        (self.bottom - self.top).abs()
    }

    pub fn top_left(&self) -> Point {
        let r = self.normalized();
        Point::new(r.left, r.top)
    }

    pub fn center(&self) -> Point {
        let r = self.normalized();
        Point::new((r.left + r.right) / 2, (r.top + r.bottom) / 2)
    }

    /// Corners in handle order: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Point; 4] {
        let r = self.normalized();
        [
            Point::new(r.left, r.top),
            Point::new(r.right, r.top),
            Point::new(r.right, r.bottom),
            Point::new(r.left, r.bottom),
        ]
    }

    /// Check if this rectangle contains a point, edges included
    pub fn contains_point(&self, p: Point) -> bool {
        let r = self.normalized();
        p.x >= r.left && p.x <= r.right && p.y >= r.top && p.y <= r.bottom
    }

    /// Pull a point inside this rectangle, edges included
    pub fn clamp_point(&self, p: Point) -> Point {
        let r = self.normalized();
        Point::new(p.x.clamp(r.left, r.right), p.y.clamp(r.top, r.bottom))
    }

    /// Limit a translation so the moved rectangle stays inside `bounds`.
    ///
    /// Each axis is clamped independently.
    pub fn clamp_translation(&self, dx: i32, dy: i32, bounds: Rect) -> (i32, i32) {
        let r = self.normalized();
        let b = bounds.normalized();

        let dx = if r.left + dx < b.left {
            b.left - r.left
        } else if r.right + dx > b.right {
            b.right - r.right
        } else {
            dx
        };
        let dy = if r.top + dy < b.top {
            b.top - r.top
        } else if r.bottom + dy > b.bottom {
            b.bottom - r.bottom
        } else {
            dy
        };
        (dx, dy)
    }
}
