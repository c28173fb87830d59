//! Reversible edits to the scene

use crate::domain::Shape;
use crate::render::geometry::arrow;

use super::canvas::{Canvas, ItemId, Primitive};

/// One reversible edit.
///
/// A command only holds the edit's parameters. The handles produced by
/// `execute` belong to the caller, which passes them back to `undo`.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Add a shape on top of the scene
    DrawShape(Shape),
}

impl Command {
    /// Render into the live view and return the created handles.
    ///
    /// Repeated calls draw identical primitives; the caller removes the old
    /// handles (via `undo`) before executing again.
    pub fn execute(&self, canvas: &mut dyn Canvas) -> Vec<ItemId> {
        match self {
            Command::DrawShape(shape) => shape_primitives(shape)
                .into_iter()
                .map(|p| canvas.add(p))
                .collect(),
        }
    }

    /// Remove exactly the handles a previous `execute` returned
    pub fn undo(&self, canvas: &mut dyn Canvas, handles: &[ItemId]) {
        for id in handles {
            canvas.remove(*id);
        }
    }

    /// Move the stored geometry by (dx, dy)
    pub fn translate(&mut self, dx: i32, dy: i32) {
        match self {
            Command::DrawShape(shape) => shape.translate(dx, dy),
        }
    }

    pub fn shape(&self) -> &Shape {
        match self {
            Command::DrawShape(shape) => shape,
        }
    }
}

/// Live view primitives for a shape
pub fn shape_primitives(shape: &Shape) -> Vec<Primitive> {
    match shape {
        Shape::Rectangle(r) => vec![Primitive::Rect {
            rect: r.bounds(),
            color: r.color,
            width: r.stroke_width,
            dashed: false,
        }],
        Shape::Arrow(a) => {
            let g = arrow::geometry(a.p1, a.p2, a.stroke_width);
            vec![
                Primitive::Line {
                    from: g.shaft_start,
                    to: g.shaft_end,
                    color: a.color,
                    width: a.stroke_width,
                },
                Primitive::Polygon {
                    points: g.head().to_vec(),
                    color: a.color,
                },
            ]
        }
        Shape::Text(t) => vec![Primitive::Text {
            origin: t.origin,
            text: t.text.clone(),
            color: t.color,
            font_family: t.font_family.clone(),
            font_size: t.font_size,
            box_width: t.box_width,
        }],
    }
}
