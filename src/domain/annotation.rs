//! Annotation shapes drawn on top of a capture
//!
//! All shape types store coordinates in absolute screen pixels, the same
//! space as the drawing area.

use crate::config::ShapeColor;

use super::geometry::{Point, Rect};

/// Outline rectangle annotation (no fill)
#[derive(Clone, Debug, PartialEq)]
pub struct RectShape {
    /// Drag start
    pub p1: Point,
    /// Drag end
    pub p2: Point,
    pub color: ShapeColor,
    pub stroke_width: u32,
}

impl RectShape {
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.p1, self.p2)
    }
}

/// Arrow from `p1` with its head at `p2`
#[derive(Clone, Debug, PartialEq)]
pub struct ArrowShape {
    pub p1: Point,
    pub p2: Point,
    pub color: ShapeColor,
    pub stroke_width: u32,
}

/// Text anchored at its top-left corner, wrapped inside a box that was
/// sized once when the user dragged it out
#[derive(Clone, Debug, PartialEq)]
pub struct TextShape {
    pub origin: Point,
    pub text: String,
    pub color: ShapeColor,
    pub font_family: String,
    /// Nominal size; the compositor uses it directly as the pixel height
    pub font_size: u32,
    pub box_width: u32,
    pub box_height: u32,
}

/// Unified shape type for ordered drawing and undo/redo
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Rectangle(RectShape),
    Arrow(ArrowShape),
    Text(TextShape),
}

impl Shape {
    /// Move every stored coordinate by (dx, dy)
    pub fn translate(&mut self, dx: i32, dy: i32) {
        match self {
            Shape::Rectangle(r) => {
                r.p1 = r.p1.translate(dx, dy);
                r.p2 = r.p2.translate(dx, dy);
            }
            Shape::Arrow(a) => {
                a.p1 = a.p1.translate(dx, dy);
                a.p2 = a.p2.translate(dx, dy);
            }
            Shape::Text(t) => t.origin = t.origin.translate(dx, dy),
        }
    }

    pub fn color(&self) -> ShapeColor {
        match self {
            Shape::Rectangle(r) => r.color,
            Shape::Arrow(a) => a.color,
            Shape::Text(t) => t.color,
        }
    }

    /// Short name used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "rectangle",
            Shape::Arrow(_) => "arrow",
            Shape::Text(_) => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_moves_all_points() {
        let mut arrow = Shape::Arrow(ArrowShape {
            p1: Point::new(0, 0),
            p2: Point::new(10, 5),
            color: ShapeColor::RED,
            stroke_width: 2,
        });
        arrow.translate(3, -2);
        let Shape::Arrow(a) = &arrow else {
            panic!("expected arrow");
        };
        assert_eq!(a.p1, Point::new(3, -2));
        assert_eq!(a.p2, Point::new(13, 3));

        let mut text = Shape::Text(TextShape {
            origin: Point::new(4, 4),
            text: "hi".into(),
            color: ShapeColor::RED,
            font_family: "Arial".into(),
            font_size: 12,
            box_width: 40,
            box_height: 20,
        });
        text.translate(1, 1);
        let Shape::Text(t) = &text else {
            panic!("expected text");
        };
        assert_eq!(t.origin, Point::new(5, 5));
        assert_eq!((t.box_width, t.box_height), (40, 20));
    }

    #[test]
    fn test_rect_bounds_normalized() {
        let r = RectShape {
            p1: Point::new(50, 50),
            p2: Point::new(10, 10),
            color: ShapeColor::RED,
            stroke_width: 2,
        };
        assert_eq!(r.bounds(), Rect::new(10, 10, 50, 50));
    }
}
