//! Shared geometry calculations for annotations
//!
//! This module contains constants and math shared between the live view
//! (display list primitives) and image rendering (tiny-skia).

/// Arrow geometry
pub mod arrow {
    use crate::domain::Point;

    /// Lower bound for the arrowhead length in pixels
    pub const MIN_HEAD_LENGTH: f32 = 8.0;
    /// Arrowhead length per unit of stroke width
    pub const HEAD_LENGTH_PER_WIDTH: f32 = 3.0;
    /// Angle between the shaft and each side of the head (30 degrees)
    pub const HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

    /// Resolved arrow outline: a shaft line plus a triangular head
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ArrowGeometry {
        pub shaft_start: (f32, f32),
        pub shaft_end: (f32, f32),
        pub apex: (f32, f32),
        pub base_left: (f32, f32),
        pub base_right: (f32, f32),
    }

    impl ArrowGeometry {
        /// Head corners in drawing order (apex first)
        pub fn head(&self) -> [(f32, f32); 3] {
            [self.apex, self.base_left, self.base_right]
        }

        pub fn translate(&self, dx: f32, dy: f32) -> ArrowGeometry {
            let t = |(x, y): (f32, f32)| (x + dx, y + dy);
            ArrowGeometry {
                shaft_start: t(self.shaft_start),
                shaft_end: t(self.shaft_end),
                apex: t(self.apex),
                base_left: t(self.base_left),
                base_right: t(self.base_right),
            }
        }
    }

    /// Head length for a stroke width: max(3w, 8)
    pub fn head_length(stroke_width: u32) -> f32 {
        (stroke_width as f32 * HEAD_LENGTH_PER_WIDTH).max(MIN_HEAD_LENGTH)
    }

    /// Compute the arrow outline from `p1` to the tip `p2`.
    ///
    /// The shaft stops one head length short of the tip. The base corners are
    /// the shortened shaft end rotated by ±30° around the tip, so they sit
    /// symmetric about the shaft line. A zero-length arrow points along +x.
    pub fn geometry(p1: Point, p2: Point, stroke_width: u32) -> ArrowGeometry {
        let (x1, y1) = (p1.x as f32, p1.y as f32);
        let (x2, y2) = (p2.x as f32, p2.y as f32);
        let angle = (y2 - y1).atan2(x2 - x1);
        let length = head_length(stroke_width);

        let corner = |a: f32| (x2 - length * a.cos(), y2 - length * a.sin());

        ArrowGeometry {
            shaft_start: (x1, y1),
            shaft_end: corner(angle),
            apex: (x2, y2),
            base_left: corner(angle - HEAD_ANGLE),
            base_right: corner(angle + HEAD_ANGLE),
        }
    }
}

/// Text layout constants
pub mod text {
    /// Gap between the drag box edge and the first glyph
    pub const PADDING: f32 = 1.0;
}

/// Normalize min/max coordinates from arbitrary start/end points
#[inline]
pub fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
    let (min_x, max_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let (min_y, max_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    (min_x, min_y, max_x, max_y)
}
