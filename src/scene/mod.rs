//! Scene and undo engine
//!
//! The scene owns the committed commands (z-order = commit order), the
//! redo history and the drawing-area rectangle. Render handles for each
//! committed command are kept next to it, apart from the command itself.

pub mod canvas;
pub mod command;

use crate::domain::selection;
use crate::domain::{Handle, Point, Rect};

use canvas::{Canvas, ItemId};
use command::Command;

#[derive(Debug)]
struct Committed {
    command: Command,
    handles: Vec<ItemId>,
}

#[derive(Debug)]
pub struct Scene {
    /// Capture bounds; the drawing area never leaves them when dragged
    bounds: Rect,
    drawing_area: Rect,
    undo_stack: Vec<Committed>,
    redo_stack: Vec<Command>,
}

impl Scene {
    pub fn new(bounds: Rect, drawing_area: Rect) -> Self {
        Self {
            bounds: bounds.normalized(),
            drawing_area: drawing_area.normalized(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Current drawing area, always normalized
    pub fn drawing_area(&self) -> Rect {
        self.drawing_area
    }

    /// Execute a command and push it on the history.
    ///
    /// The redo history is dropped unconditionally: history never branches.
    pub fn commit(&mut self, command: Command, canvas: &mut dyn Canvas) {
        log::debug!("Commit {}", command.shape().kind());
        let handles = command.execute(canvas);
        self.undo_stack.push(Committed { command, handles });
        self.redo_stack.clear();
    }

    /// Undo the most recent command. Returns false when there was none.
    pub fn undo(&mut self, canvas: &mut dyn Canvas) -> bool {
        let Some(Committed { command, handles }) = self.undo_stack.pop() else {
            return false;
        };
        command.undo(canvas, &handles);
        self.redo_stack.push(command);
        true
    }

    /// Redo the most recently undone command. Returns false when there was none.
    pub fn redo(&mut self, canvas: &mut dyn Canvas) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        let handles = command.execute(canvas);
        self.undo_stack.push(Committed { command, handles });
        true
    }

    /// Committed commands, oldest (bottom) first
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.undo_stack.iter().map(|c| &c.command)
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// First corner handle under `p`, in TL, TR, BR, BL order
    pub fn hit_test_handles(&self, p: Point) -> Option<Handle> {
        selection::hit_test(self.drawing_area, p)
    }

    /// Move the drawing area and every shape, rendered and stored, by (dx, dy).
    ///
    /// Undone commands are moved too so a later redo lands where the
    /// drawing area now is.
    pub fn translate_all(&mut self, dx: i32, dy: i32, canvas: &mut dyn Canvas) {
        if dx == 0 && dy == 0 {
            return;
        }
        self.drawing_area = self.drawing_area.translate(dx, dy);
        for committed in &mut self.undo_stack {
            committed.command.translate(dx, dy);
            for id in &committed.handles {
                canvas.translate(*id, dx, dy);
            }
        }
        for command in &mut self.redo_stack {
            command.translate(dx, dy);
        }
    }

    /// Drag the drawing area, clamping the delta to the capture bounds.
    ///
    /// Returns the delta actually applied.
    pub fn drag_by(&mut self, dx: i32, dy: i32, canvas: &mut dyn Canvas) -> (i32, i32) {
        let (dx, dy) = self.drawing_area.clamp_translation(dx, dy, self.bounds);
        self.translate_all(dx, dy, canvas);
        (dx, dy)
    }

    /// Resize by dragging one corner while `anchor` (the opposite corner at
    /// drag start) stays fixed.
    ///
    /// The pointer is clamped to the capture bounds and the area is kept
    /// normalized and at least 1x1; the returned handle is the corner now
    /// under the pointer.
    pub fn resize(&mut self, active: Handle, anchor: Point, pointer: Point) -> Handle {
        let b = self.bounds.normalized();
        let p = b.clamp_point(pointer);
        let left = matches!(active, Handle::TopLeft | Handle::BottomLeft);
        let top = matches!(active, Handle::TopLeft | Handle::TopRight);
        let p = Point::new(
            off_anchor(anchor.x, p.x, left, b.left, b.right),
            off_anchor(anchor.y, p.y, top, b.top, b.bottom),
        );
        self.drawing_area = Rect::from_points(anchor, p);
        Handle::relative_to(anchor, p, active)
    }

    /// Drop every command and both stacks, removing what was rendered
    pub fn clear(&mut self, canvas: &mut dyn Canvas) {
        for Committed { command, handles } in self.undo_stack.drain(..) {
            command.undo(canvas, &handles);
        }
        self.redo_stack.clear();
    }
}

/// Move `p` one pixel off `anchor` when they coincide, toward the low side
/// if `low` and the bounds allow it
fn off_anchor(anchor: i32, p: i32, low: bool, min: i32, max: i32) -> i32 {
    if p != anchor {
        return p;
    }
    let (first, second) = if low {
        (anchor - 1, anchor + 1)
    } else {
        (anchor + 1, anchor - 1)
    };
    if (min..=max).contains(&first) {
        first
    } else {
        second
    }
}
