//! Live view abstraction
//!
//! The interactive surface is modelled as a retained list of primitives.
//! Drawing returns an `ItemId` handle; the caller keeps handles as transient
//! view state and uses them to remove or move what it drew.

use crate::config::ShapeColor;
use crate::domain::{Point, Rect};

/// Handle to one primitive on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

/// Something the live view can draw
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Stroke-only rectangle
    Rect {
        rect: Rect,
        color: ShapeColor,
        width: u32,
        dashed: bool,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: ShapeColor,
        width: u32,
    },
    /// Filled polygon
    Polygon {
        points: Vec<(f32, f32)>,
        color: ShapeColor,
    },
    /// Text anchored top-left, wrapped at `box_width`
    Text {
        origin: Point,
        text: String,
        color: ShapeColor,
        font_family: String,
        font_size: u32,
        box_width: u32,
    },
    /// Semi-opaque panel dimming everything outside the selection
    Shade { rect: Rect },
    /// Resize handle square
    Handle { rect: Rect },
    /// Dimension readout centered on `at`
    Label { at: Point, text: String },
}

impl Primitive {
    /// Same primitive moved by (dx, dy)
    pub fn translated(&self, dx: i32, dy: i32) -> Primitive {
        let (fx, fy) = (dx as f32, dy as f32);
        let shift = |(x, y): (f32, f32)| (x + fx, y + fy);
        match self {
            Primitive::Rect {
                rect,
                color,
                width,
                dashed,
            } => Primitive::Rect {
                rect: rect.translate(dx, dy),
                color: *color,
                width: *width,
                dashed: *dashed,
            },
            Primitive::Line {
                from,
                to,
                color,
                width,
            } => Primitive::Line {
                from: shift(*from),
                to: shift(*to),
                color: *color,
                width: *width,
            },
            Primitive::Polygon { points, color } => Primitive::Polygon {
                points: points.iter().copied().map(shift).collect(),
                color: *color,
            },
            Primitive::Text {
                origin,
                text,
                color,
                font_family,
                font_size,
                box_width,
            } => Primitive::Text {
                origin: origin.translate(dx, dy),
                text: text.clone(),
                color: *color,
                font_family: font_family.clone(),
                font_size: *font_size,
                box_width: *box_width,
            },
            Primitive::Shade { rect } => Primitive::Shade {
                rect: rect.translate(dx, dy),
            },
            Primitive::Handle { rect } => Primitive::Handle {
                rect: rect.translate(dx, dy),
            },
            Primitive::Label { at, text } => Primitive::Label {
                at: at.translate(dx, dy),
                text: text.clone(),
            },
        }
    }
}

/// Retained drawing surface of the live view
pub trait Canvas {
    /// Draw on top of everything else
    fn add(&mut self, primitive: Primitive) -> ItemId;
    /// Remove an item; unknown ids are ignored
    fn remove(&mut self, id: ItemId);
    /// Move an item in place, keeping its z-order
    fn translate(&mut self, id: ItemId, dx: i32, dy: i32);
    /// Swap an item's primitive, keeping its z-order
    fn replace(&mut self, id: ItemId, primitive: Primitive);
}

/// In-memory canvas: primitives in z-order, bottom first
#[derive(Debug, Default)]
pub struct DisplayList {
    items: Vec<(ItemId, Primitive)>,
    next_id: u64,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ItemId) -> Option<&Primitive> {
        self.items.iter().find(|(i, _)| *i == id).map(|(_, p)| p)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Primitives bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.items.iter().map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Canvas for DisplayList {
    fn add(&mut self, primitive: Primitive) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.push((id, primitive));
        id
    }

    fn remove(&mut self, id: ItemId) {
        self.items.retain(|(i, _)| *i != id);
    }

    fn translate(&mut self, id: ItemId, dx: i32, dy: i32) {
        if let Some((_, p)) = self.items.iter_mut().find(|(i, _)| *i == id) {
            *p = p.translated(dx, dy);
        }
    }

    fn replace(&mut self, id: ItemId, primitive: Primitive) {
        if let Some((_, p)) = self.items.iter_mut().find(|(i, _)| *i == id) {
            *p = primitive;
        }
    }
}
