//! Resize handles for the drawing area

use super::geometry::{Point, Rect};

/// Half the side of a handle square, in pixels
pub const HANDLE_HALF_SIZE: i32 = 5;

/// One of the four corner handles of the drawing area
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

impl Handle {
    /// Hit-test order
    pub const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomRight,
        Handle::BottomLeft,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Handle {
        match self {
            Handle::TopLeft => Handle::BottomRight,
            Handle::TopRight => Handle::BottomLeft,
            Handle::BottomRight => Handle::TopLeft,
            Handle::BottomLeft => Handle::TopRight,
        }
    }

    /// Corner of `rect` this handle sits on
    pub fn corner_of(self, rect: Rect) -> Point {
        rect.corners()[self.index()]
    }

    /// Which handle a point at `p` occupies relative to a fixed `anchor`.
    ///
    /// Ties (pointer exactly on the anchor's row or column) keep `prev`'s side
    /// on that axis.
    pub fn relative_to(anchor: Point, p: Point, prev: Handle) -> Handle {
        let (prev_left, prev_top) = match prev {
            Handle::TopLeft => (true, true),
            Handle::TopRight => (false, true),
            Handle::BottomRight => (false, false),
            Handle::BottomLeft => (true, false),
        };
        let left = if p.x == anchor.x { prev_left } else { p.x < anchor.x };
        let top = if p.y == anchor.y { prev_top } else { p.y < anchor.y };
        match (left, top) {
            (true, true) => Handle::TopLeft,
            (false, true) => Handle::TopRight,
            (false, false) => Handle::BottomRight,
            (true, false) => Handle::BottomLeft,
        }
    }
}

/// Square hit box of a handle centered on `corner`
pub fn handle_rect(corner: Point) -> Rect {
    Rect::new(
        corner.x - HANDLE_HALF_SIZE,
        corner.y - HANDLE_HALF_SIZE,
        corner.x + HANDLE_HALF_SIZE,
        corner.y + HANDLE_HALF_SIZE,
    )
}

/// Handle boxes for every corner of `area`, in hit-test order
pub fn handle_rects(area: Rect) -> [Rect; 4] {
    area.corners().map(handle_rect)
}

/// First handle of `area` whose box contains `p`
pub fn hit_test(area: Rect, p: Point) -> Option<Handle> {
    Handle::ALL
        .into_iter()
        .find(|h| handle_rect(h.corner_of(area)).contains_point(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_test_corners_and_misses() {
        let area = Rect::new(10, 10, 110, 60);
        assert_eq!(hit_test(area, Point::new(10, 10)), Some(Handle::TopLeft));
        assert_eq!(hit_test(area, Point::new(115, 5)), Some(Handle::TopRight));
        assert_eq!(hit_test(area, Point::new(106, 56)), Some(Handle::BottomRight));
        assert_eq!(hit_test(area, Point::new(14, 64)), Some(Handle::BottomLeft));
        assert_eq!(hit_test(area, Point::new(16, 10)), None);
        assert_eq!(hit_test(area, Point::new(60, 35)), None);
    }

    #[test]
    fn test_hit_test_prefers_first_in_order() {
        // Tiny area: every handle overlaps the others
        let area = Rect::new(10, 10, 12, 12);
        assert_eq!(hit_test(area, Point::new(11, 11)), Some(Handle::TopLeft));
    }

    #[test]
    fn test_relative_to_flips() {
        let anchor = Point::new(100, 100);
        assert_eq!(
            Handle::relative_to(anchor, Point::new(50, 50), Handle::TopLeft),
            Handle::TopLeft
        );
        assert_eq!(
            Handle::relative_to(anchor, Point::new(150, 150), Handle::TopLeft),
            Handle::BottomRight
        );
        assert_eq!(
            Handle::relative_to(anchor, Point::new(150, 100), Handle::TopLeft),
            Handle::TopRight
        );
    }

    #[test]
    fn test_opposite() {
        assert_eq!(Handle::BottomLeft.opposite(), Handle::TopRight);
        assert_eq!(Handle::TopLeft.opposite(), Handle::BottomRight);
    }
}
