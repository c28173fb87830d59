//! Session state transitions
//!
//! One dispatch function per input event. Each one matches on the current
//! phase and sub-mode and either updates them in place or moves to the next
//! state, keeping the live view in sync.

use std::time::Instant;

use crate::capture::CapturedImage;
use crate::config::{FONT_SIZES, MAX_STROKE_WIDTH, ShapeColor};
use crate::domain::{ArrowShape, Point, Rect, RectShape, Shape, TextShape, handle_rects};
use crate::scene::Scene;
use crate::scene::canvas::{Canvas, ItemId, Primitive};
use crate::scene::command::{Command, shape_primitives};

use super::layout;
use super::state::{
    Drawing, Mode, Phase, Selecting, Session, ShapeDraft, TextEdit, TextPhase, Throttle, Tool,
};

/// Result of an escape press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    ClosedColorPicker,
    Cancelled,
    Ignored,
}

/// Current drawing attributes, copied out before mutating the phase
#[derive(Debug, Clone)]
struct Style {
    color: ShapeColor,
    stroke_width: u32,
    font_size: u32,
    font_family: String,
}

fn remove_items(canvas: &mut dyn Canvas, items: &mut Vec<ItemId>) {
    for id in items.drain(..) {
        canvas.remove(id);
    }
}

fn remove_item(canvas: &mut dyn Canvas, item: &mut Option<ItemId>) {
    if let Some(id) = item.take() {
        canvas.remove(id);
    }
}

/// Add `primitives`, or replace the existing items one for one
fn show_items(canvas: &mut dyn Canvas, items: &mut Vec<ItemId>, primitives: Vec<Primitive>) {
    if items.len() == primitives.len() {
        for (id, p) in items.iter().zip(primitives) {
            canvas.replace(*id, p);
        }
    } else {
        remove_items(canvas, items);
        items.extend(primitives.into_iter().map(|p| canvas.add(p)));
    }
}

fn show_item(canvas: &mut dyn Canvas, item: &mut Option<ItemId>, primitive: Primitive) {
    match item {
        Some(id) => canvas.replace(*id, primitive),
        None => *item = Some(canvas.add(primitive)),
    }
}

fn show_label(canvas: &mut dyn Canvas, label: &mut Option<ItemId>, area: Rect) {
    let (at, text) = layout::dimension_label(area);
    show_item(canvas, label, Primitive::Label { at, text });
}

fn show_handles(canvas: &mut dyn Canvas, handles: &mut Vec<ItemId>, area: Rect) {
    let rects = handle_rects(area)
        .into_iter()
        .map(|rect| Primitive::Handle { rect })
        .collect();
    show_items(canvas, handles, rects);
}

/// Redraw the dimmed panels and the label for the current selection
fn show_selection(s: &mut Selecting, screen: Rect, canvas: &mut dyn Canvas) {
    let Some(selection) = s.selection() else {
        return;
    };
    let panels = layout::overlay_panels(selection, screen)
        .into_iter()
        .map(|rect| Primitive::Shade { rect })
        .collect();
    show_items(canvas, &mut s.overlay, panels);
    show_label(canvas, &mut s.label, selection);
}

/// A zero-area selection becomes 1x1. The result is clamped to `screen`
/// while keeping at least one pixel on each axis.
fn selected_area(start: Point, mut end: Point, screen: Rect) -> Rect {
    if start.x == end.x || start.y == end.y {
        end = end.translate(1, 1);
    }
    let mut area = Rect::from_points(screen.clamp_point(start), screen.clamp_point(end));
    if area.width() == 0 {
        if area.right < screen.right {
            area.right += 1;
        } else {
            area.left -= 1;
        }
    }
    if area.height() == 0 {
        if area.bottom < screen.bottom {
            area.bottom += 1;
        } else {
            area.top -= 1;
        }
    }
    area
}

fn draft_shape(draft: &ShapeDraft, style: &Style) -> Shape {
    match draft.tool {
        Tool::Arrow => Shape::Arrow(ArrowShape {
            p1: draft.start,
            p2: draft.end,
            color: style.color,
            stroke_width: style.stroke_width,
        }),
        _ => Shape::Rectangle(RectShape {
            p1: draft.start,
            p2: draft.end,
            color: style.color,
            stroke_width: style.stroke_width,
        }),
    }
}

fn text_frame(edit: &TextEdit, color: ShapeColor) -> Primitive {
    Primitive::Rect {
        rect: edit.frame(),
        color,
        width: 1,
        dashed: true,
    }
}

fn text_preview(edit: &TextEdit, style: &Style) -> Primitive {
    let frame = edit.frame();
    Primitive::Text {
        origin: frame.top_left(),
        text: edit.text.clone(),
        color: style.color,
        font_family: style.font_family.clone(),
        font_size: style.font_size,
        box_width: frame.width() as u32,
    }
}

/// Close a text edit. Typed, non-empty text becomes a committed shape;
/// anything else is dropped without a trace.
fn finish_text(edit: TextEdit, scene: &mut Scene, style: &Style, canvas: &mut dyn Canvas) {
    canvas.remove(edit.frame);
    if let Some(id) = edit.preview {
        canvas.remove(id);
    }
    if edit.phase != TextPhase::Typing || edit.text.is_empty() {
        log::debug!("Discarding empty text box");
        return;
    }
    let frame = edit.frame();
    scene.commit(
        Command::DrawShape(Shape::Text(TextShape {
            origin: frame.top_left(),
            text: edit.text,
            color: style.color,
            font_family: style.font_family.clone(),
            font_size: style.font_size,
            box_width: frame.width() as u32,
            box_height: frame.height() as u32,
        })),
        canvas,
    );
}

/// Leave the current sub-mode. An open text field is committed when
/// `commit_text` is set, every other unfinished gesture is aborted.
fn finish_mode(d: &mut Drawing, style: &Style, commit_text: bool, canvas: &mut dyn Canvas) {
    match std::mem::replace(&mut d.mode, Mode::Idle) {
        Mode::Idle => {}
        Mode::Moving { .. } | Mode::Resizing { .. } => {
            remove_item(canvas, &mut d.label);
            d.toolbar = Some(layout::toolbar_rect(d.scene.drawing_area(), d.scene.bounds()));
        }
        Mode::DrawingShape(mut draft) => remove_items(canvas, &mut draft.items),
        Mode::EditingText(mut edit) => {
            if !commit_text {
                edit.text.clear();
            }
            finish_text(edit, &mut d.scene, style, canvas);
        }
    }
}

impl Session {
    fn style(&self) -> Style {
        Style {
            color: self.color,
            stroke_width: self.stroke_width,
            font_size: self.font_size,
            font_family: self.font_family.clone(),
        }
    }

    /// Start a session over a fresh capture of `bounds`
    pub fn begin(&mut self, captured: CapturedImage, bounds: Rect) {
        log::info!(
            "Capture session started on {}x{} screen",
            bounds.width(),
            bounds.height()
        );
        self.bounds = bounds.normalized();
        self.captured = Some(captured);
        self.color_picker_open = false;
        self.phase = Phase::Selecting(Selecting {
            drag: None,
            overlay: Vec::new(),
            label: None,
            throttle: Throttle::new(self.refresh_interval),
        });
    }

    /// End the session: drop the capture, the scene with both stacks, and
    /// everything shown in the live view
    pub fn reset(&mut self, canvas: &mut dyn Canvas) {
        let style = self.style();
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Selecting(mut s) => {
                remove_items(canvas, &mut s.overlay);
                remove_item(canvas, &mut s.label);
            }
            Phase::Drawing(mut d) => {
                finish_mode(&mut d, &style, false, canvas);
                d.scene.clear(canvas);
                remove_items(canvas, &mut d.handles);
                remove_item(canvas, &mut d.label);
            }
        }
        self.captured = None;
        self.color_picker_open = false;
        log::debug!("Session reset");
    }

    pub fn pointer_down(&mut self, p: Point, now: Instant, canvas: &mut dyn Canvas) {
        let style = self.style();
        let tool = self.tool;
        let screen = self.bounds;
        match &mut self.phase {
            Phase::Idle => {}
            Phase::Selecting(s) => {
                s.drag = Some((p, p));
                s.throttle.mark(now);
                show_selection(s, screen, canvas);
            }
            Phase::Drawing(d) => {
                finish_mode(d, &style, true, canvas);
                let area = d.scene.drawing_area();

                // Handles win over every tool
                if let Some(active) = d.scene.hit_test_handles(p) {
                    let anchor = active.opposite().corner_of(area);
                    log::debug!("Resize from {active:?}");
                    d.mode = Mode::Resizing { active, anchor };
                    d.toolbar = None;
                    show_label(canvas, &mut d.label, area);
                    return;
                }
                if !area.contains_point(p) {
                    return;
                }

                d.mode = match tool {
                    Tool::Move => Mode::Moving { last: p },
                    Tool::Rectangle | Tool::Arrow => Mode::DrawingShape(ShapeDraft {
                        tool,
                        start: p,
                        end: p,
                        items: Vec::new(),
                    }),
                    Tool::Text => {
                        let frame = canvas.add(Primitive::Rect {
                            rect: Rect::from_points(p, p),
                            color: style.color,
                            width: 1,
                            dashed: true,
                        });
                        Mode::EditingText(TextEdit {
                            phase: TextPhase::Sizing,
                            start: p,
                            end: p,
                            text: String::new(),
                            frame,
                            preview: None,
                        })
                    }
                };
            }
        }
    }

    pub fn pointer_move(&mut self, p: Point, now: Instant, canvas: &mut dyn Canvas) {
        let style = self.style();
        let screen = self.bounds;
        match &mut self.phase {
            Phase::Idle => {}
            Phase::Selecting(s) => {
                let Some((_, end)) = &mut s.drag else {
                    return;
                };
                *end = p;
                if s.throttle.ready(now) {
                    show_selection(s, screen, canvas);
                }
            }
            Phase::Drawing(d) => {
                let area = d.scene.drawing_area();
                match &mut d.mode {
                    Mode::Idle => {}
                    Mode::Moving { last } => {
                        d.scene.drag_by(p.x - last.x, p.y - last.y, canvas);
                        *last = p;
                        show_handles(canvas, &mut d.handles, d.scene.drawing_area());
                    }
                    Mode::Resizing { active, anchor } => {
                        *active = d.scene.resize(*active, *anchor, p);
                        let area = d.scene.drawing_area();
                        show_handles(canvas, &mut d.handles, area);
                        show_label(canvas, &mut d.label, area);
                    }
                    Mode::DrawingShape(draft) => {
                        draft.end = area.clamp_point(p);
                        let primitives = shape_primitives(&draft_shape(draft, &style));
                        show_items(canvas, &mut draft.items, primitives);
                    }
                    Mode::EditingText(edit) => {
                        if edit.phase == TextPhase::Sizing {
                            edit.end = area.clamp_point(p);
                            canvas.replace(edit.frame, text_frame(edit, style.color));
                        }
                    }
                }
            }
        }
    }

    pub fn pointer_up(&mut self, p: Point, now: Instant, canvas: &mut dyn Canvas) {
        let style = self.style();
        match &mut self.phase {
            Phase::Idle => {}
            Phase::Selecting(s) => {
                let Some((start, _)) = s.drag else {
                    return;
                };
                // Release always refreshes
                s.drag = Some((start, p));
                s.throttle.mark(now);
                show_selection(s, self.bounds, canvas);
                let area = selected_area(start, p, self.bounds);
                self.enter_drawing(area, canvas);
            }
            Phase::Drawing(d) => match std::mem::replace(&mut d.mode, Mode::Idle) {
                Mode::Idle => {}
                Mode::Moving { last } => {
                    d.scene.drag_by(p.x - last.x, p.y - last.y, canvas);
                    show_handles(canvas, &mut d.handles, d.scene.drawing_area());
                    d.toolbar = Some(layout::toolbar_rect(d.scene.drawing_area(), d.scene.bounds()));
                }
                Mode::Resizing { active, anchor } => {
                    d.scene.resize(active, anchor, p);
                    show_handles(canvas, &mut d.handles, d.scene.drawing_area());
                    remove_item(canvas, &mut d.label);
                    d.toolbar = Some(layout::toolbar_rect(d.scene.drawing_area(), d.scene.bounds()));
                }
                Mode::DrawingShape(mut draft) => {
                    remove_items(canvas, &mut draft.items);
                    draft.end = d.scene.drawing_area().clamp_point(p);
                    let shape = draft_shape(&draft, &style);
                    d.scene.commit(Command::DrawShape(shape), canvas);
                }
                Mode::EditingText(mut edit) => {
                    if edit.phase == TextPhase::Sizing {
                        edit.end = d.scene.drawing_area().clamp_point(p);
                        edit.phase = TextPhase::Typing;
                        canvas.replace(edit.frame, text_frame(&edit, style.color));
                        edit.preview = Some(canvas.add(text_preview(&edit, &style)));
                    }
                    d.mode = Mode::EditingText(edit);
                }
            },
        }
    }

    fn enter_drawing(&mut self, area: Rect, canvas: &mut dyn Canvas) {
        let Phase::Selecting(mut s) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return;
        };
        remove_items(canvas, &mut s.overlay);
        remove_item(canvas, &mut s.label);

        log::info!(
            "Selected {}x{} at ({}, {})",
            area.width(),
            area.height(),
            area.left,
            area.top
        );
        let mut handles = Vec::new();
        show_handles(canvas, &mut handles, area);
        self.phase = Phase::Drawing(Drawing {
            scene: Scene::new(self.bounds, area),
            mode: Mode::Idle,
            handles,
            label: None,
            toolbar: Some(layout::toolbar_rect(area, self.bounds)),
        });
    }

    fn edit_text(&mut self, canvas: &mut dyn Canvas, f: impl FnOnce(&mut String)) {
        let style = self.style();
        let Phase::Drawing(d) = &mut self.phase else {
            return;
        };
        let Mode::EditingText(edit) = &mut d.mode else {
            return;
        };
        if edit.phase != TextPhase::Typing {
            return;
        }
        f(&mut edit.text);
        if let Some(id) = edit.preview {
            canvas.replace(id, text_preview(edit, &style));
        }
    }

    /// Replace the text field content
    pub fn text_changed(&mut self, text: &str, canvas: &mut dyn Canvas) {
        self.edit_text(canvas, |t| {
            t.clear();
            t.push_str(text);
        });
    }

    pub fn insert_text(&mut self, text: &str, canvas: &mut dyn Canvas) {
        self.edit_text(canvas, |t| t.push_str(text));
    }

    pub fn backspace(&mut self, canvas: &mut dyn Canvas) {
        self.edit_text(canvas, |t| {
            t.pop();
        });
    }

    /// Commit an open text field; used on focus loss and before export
    pub fn finish_text_edit(&mut self, canvas: &mut dyn Canvas) {
        let style = self.style();
        if let Phase::Drawing(d) = &mut self.phase
            && matches!(d.mode, Mode::EditingText(_))
        {
            finish_mode(d, &style, true, canvas);
        }
    }

    /// Escape closes the color picker first, then cancels the session
    pub fn escape(&mut self, canvas: &mut dyn Canvas) -> Escape {
        if self.color_picker_open {
            self.color_picker_open = false;
            return Escape::ClosedColorPicker;
        }
        if self.is_idle() {
            return Escape::Ignored;
        }
        log::info!("Capture session cancelled");
        self.reset(canvas);
        Escape::Cancelled
    }

    /// Undo the last command; ignored unless drawing with no text field open
    pub fn undo(&mut self, canvas: &mut dyn Canvas) -> bool {
        if self.is_typing() {
            return false;
        }
        match &mut self.phase {
            Phase::Drawing(d) => d.scene.undo(canvas),
            _ => false,
        }
    }

    pub fn redo(&mut self, canvas: &mut dyn Canvas) -> bool {
        if self.is_typing() {
            return false;
        }
        match &mut self.phase {
            Phase::Drawing(d) => d.scene.redo(canvas),
            _ => false,
        }
    }

    /// Switch tools, committing any open text field
    pub fn select_tool(&mut self, tool: Tool, canvas: &mut dyn Canvas) {
        let style = self.style();
        if let Phase::Drawing(d) = &mut self.phase {
            finish_mode(d, &style, true, canvas);
        }
        log::debug!("Tool {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
    }

    pub fn open_color_picker(&mut self) {
        self.color_picker_open = true;
    }

    /// Take a picked color; an open text field follows it
    pub fn set_color(&mut self, color: ShapeColor, canvas: &mut dyn Canvas) {
        self.color = color;
        self.color_picker_open = false;
        let style = self.style();
        if let Phase::Drawing(d) = &mut self.phase
            && let Mode::EditingText(edit) = &d.mode
        {
            canvas.replace(edit.frame, text_frame(edit, color));
            if let Some(id) = edit.preview {
                canvas.replace(id, text_preview(edit, &style));
            }
        }
    }

    /// Step the stroke width within 1..=max. Returns true if it changed.
    pub fn change_stroke_width(&mut self, delta: i32) -> bool {
        let width = (self.stroke_width as i32)
            .saturating_add(delta)
            .clamp(1, MAX_STROKE_WIDTH as i32) as u32;
        if width == self.stroke_width {
            return false;
        }
        self.stroke_width = width;
        log::debug!("Stroke width {} ({}%)", width, self.stroke_percentage());
        true
    }

    /// Pick a size from the font size menu. Sizes not on the menu are
    /// ignored. Returns true if the size changed.
    pub fn set_font_size(&mut self, size: u32, canvas: &mut dyn Canvas) -> bool {
        if !FONT_SIZES.contains(&size) {
            log::debug!("Font size {size} is not on the menu");
            return false;
        }
        if size == self.font_size {
            return false;
        }
        self.font_size = size;
        let style = self.style();
        if let Phase::Drawing(d) = &mut self.phase
            && let Mode::EditingText(edit) = &d.mode
            && let Some(id) = edit.preview
        {
            canvas.replace(id, text_preview(edit, &style));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::domain::Handle;
    use crate::scene::canvas::DisplayList;
    use std::time::Duration;

    fn session(w: u32, h: u32) -> (Session, DisplayList) {
        let mut session = Session::new(&Settings::default());
        session.begin(
            CapturedImage::new(image::RgbaImage::new(w, h)),
            Rect::from_size(w, h),
        );
        (session, DisplayList::new())
    }

    fn select(session: &mut Session, canvas: &mut DisplayList, a: (i32, i32), b: (i32, i32)) {
        let now = Instant::now();
        session.pointer_down(Point::new(a.0, a.1), now, canvas);
        session.pointer_move(Point::new(b.0, b.1), now, canvas);
        session.pointer_up(Point::new(b.0, b.1), now, canvas);
    }

    /// Press, move and release; the same gesture selects or draws
    fn drag(session: &mut Session, canvas: &mut DisplayList, a: (i32, i32), b: (i32, i32)) {
        select(session, canvas, a, b);
    }

    fn area(session: &Session) -> Rect {
        session.scene().unwrap().drawing_area()
    }

    fn count(canvas: &DisplayList, f: impl Fn(&Primitive) -> bool) -> usize {
        canvas.iter().filter(|p| f(p)).count()
    }

    #[test]
    fn test_select_enters_drawing() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (120, 150), (20, 30));
        assert!(s.is_drawing());
        assert_eq!(area(&s), Rect::new(20, 30, 120, 150));
        // Overlay and label are gone, four handles remain
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Shade { .. })), 0);
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Label { .. })), 0);
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Handle { .. })), 4);
        assert!(s.toolbar().is_some());
        assert!(matches!(s.mode(), Some(Mode::Idle)));
    }

    #[test]
    fn test_zero_area_selection_nudged() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (50, 50), (50, 50));
        assert_eq!(area(&s), Rect::new(50, 50, 51, 51));
    }

    #[test]
    fn test_zero_area_selection_at_screen_edge() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (200, 200), (200, 200));
        assert_eq!(area(&s), Rect::new(199, 199, 200, 200));
    }

    #[test]
    fn test_selection_clamped_to_screen() {
        let (mut s, mut canvas) = session(200, 100);
        select(&mut s, &mut canvas, (-20, 10), (250, 300));
        assert_eq!(area(&s), Rect::new(0, 10, 200, 100));
    }

    #[test]
    fn test_selection_overlay_throttled() {
        let (mut s, mut canvas) = session(200, 200);
        let start = Instant::now();
        s.pointer_down(Point::new(10, 10), start, &mut canvas);
        let label = |canvas: &DisplayList| {
            canvas.iter().find_map(|p| match p {
                Primitive::Label { text, .. } => Some(text.clone()),
                _ => None,
            })
        };
        assert_eq!(label(&canvas).as_deref(), Some("0x0"));
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Shade { .. })), 4);

        // Within the 60 Hz interval: not recomputed
        s.pointer_move(Point::new(50, 40), start + Duration::from_millis(5), &mut canvas);
        assert_eq!(label(&canvas).as_deref(), Some("0x0"));
        assert_eq!(s.selection(), Some(Rect::new(10, 10, 50, 40)));

        s.pointer_move(Point::new(60, 40), start + Duration::from_millis(20), &mut canvas);
        assert_eq!(label(&canvas).as_deref(), Some("50x30"));
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Shade { .. })), 4);
    }

    #[test]
    fn test_draw_rectangle_with_pointer() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (0, 0), (100, 100));
        s.select_tool(Tool::Rectangle, &mut canvas);
        let now = Instant::now();
        s.pointer_down(Point::new(10, 10), now, &mut canvas);
        s.pointer_move(Point::new(30, 30), now, &mut canvas);
        // Temporary shape shown but not committed
        assert_eq!(s.scene().unwrap().undo_len(), 0);
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Rect { .. })), 1);
        s.pointer_move(Point::new(50, 50), now, &mut canvas);
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Rect { .. })), 1);
        s.pointer_up(Point::new(50, 50), now, &mut canvas);

        let scene = s.scene().unwrap();
        assert_eq!(scene.undo_len(), 1);
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Rect { .. })), 1);
        let Shape::Rectangle(r) = scene.commands().next().unwrap().shape() else {
            panic!("expected rectangle");
        };
        assert_eq!((r.p1, r.p2), (Point::new(10, 10), Point::new(50, 50)));
        assert_eq!(r.stroke_width, 2);

        assert!(s.undo(&mut canvas));
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Rect { .. })), 0);
        assert!(s.redo(&mut canvas));
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Rect { .. })), 1);
    }

    #[test]
    fn test_shape_end_clamped_into_area() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (0, 0), (100, 100));
        s.select_tool(Tool::Arrow, &mut canvas);
        drag(&mut s, &mut canvas, (50, 50), (180, 20));
        let Shape::Arrow(a) = s.scene().unwrap().commands().next().unwrap().shape() else {
            panic!("expected arrow");
        };
        assert_eq!(a.p2, Point::new(100, 20));
    }

    #[test]
    fn test_pointer_down_outside_area_is_ignored() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (0, 0), (100, 100));
        s.select_tool(Tool::Rectangle, &mut canvas);
        drag(&mut s, &mut canvas, (150, 150), (180, 180));
        assert_eq!(s.scene().unwrap().undo_len(), 0);
        assert!(matches!(s.mode(), Some(Mode::Idle)));
    }

    #[test]
    fn test_move_clamps_at_edge() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (0, 0), (100, 100));
        let now = Instant::now();
        s.pointer_down(Point::new(50, 50), now, &mut canvas);
        assert!(matches!(s.mode(), Some(Mode::Moving { .. })));
        s.pointer_move(Point::new(0, 50), now, &mut canvas);
        assert_eq!(area(&s).left, 0);
        s.pointer_up(Point::new(0, 50), now, &mut canvas);
        assert_eq!(area(&s), Rect::new(0, 0, 100, 100));
        assert!(s.toolbar().is_some());
    }

    #[test]
    fn test_move_carries_shapes_and_handles() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (0, 0), (100, 100));
        s.select_tool(Tool::Rectangle, &mut canvas);
        drag(&mut s, &mut canvas, (10, 10), (20, 20));
        s.select_tool(Tool::Move, &mut canvas);
        drag(&mut s, &mut canvas, (50, 50), (80, 60));
        assert_eq!(area(&s), Rect::new(30, 10, 130, 110));
        let Shape::Rectangle(r) = s.scene().unwrap().commands().next().unwrap().shape() else {
            panic!("expected rectangle");
        };
        assert_eq!(r.p1, Point::new(40, 20));
        assert!(canvas.iter().any(|p| *p
            == Primitive::Handle {
                rect: Rect::new(125, 105, 135, 115)
            }));
    }

    #[test]
    fn test_resize_from_handle_any_tool() {
        let (mut s, mut canvas) = session(300, 300);
        select(&mut s, &mut canvas, (50, 50), (150, 150));
        s.select_tool(Tool::Rectangle, &mut canvas);
        let now = Instant::now();
        s.pointer_down(Point::new(148, 152), now, &mut canvas);
        assert!(matches!(
            s.mode(),
            Some(Mode::Resizing {
                active: Handle::BottomRight,
                ..
            })
        ));
        assert!(s.toolbar().is_none());
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Label { .. })), 1);

        // Drag past the anchor: the area flips and stays normalized
        s.pointer_move(Point::new(20, 30), now, &mut canvas);
        assert_eq!(area(&s), Rect::new(20, 30, 50, 50));
        assert!(matches!(
            s.mode(),
            Some(Mode::Resizing {
                active: Handle::TopLeft,
                ..
            })
        ));
        s.pointer_up(Point::new(20, 30), now, &mut canvas);
        assert_eq!(area(&s), Rect::new(20, 30, 50, 50));
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Label { .. })), 0);
        assert!(s.toolbar().is_some());
        assert_eq!(s.scene().unwrap().undo_len(), 0);
    }

    #[test]
    fn test_text_commit_on_focus_loss() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (0, 0), (100, 100));
        s.select_tool(Tool::Text, &mut canvas);
        drag(&mut s, &mut canvas, (10, 10), (80, 40));
        assert!(s.is_typing());
        s.text_changed("hel", &mut canvas);
        s.insert_text("lo!", &mut canvas);
        s.backspace(&mut canvas);
        assert_eq!(s.text_edit().unwrap().text(), "hello");

        // Undo is ignored while the field is open
        assert!(!s.undo(&mut canvas));

        s.finish_text_edit(&mut canvas);
        let scene = s.scene().unwrap();
        assert_eq!(scene.undo_len(), 1);
        let Shape::Text(t) = scene.commands().next().unwrap().shape() else {
            panic!("expected text");
        };
        assert_eq!(t.text, "hello");
        assert_eq!(t.origin, Point::new(10, 10));
        assert_eq!((t.box_width, t.box_height), (70, 30));
        assert_eq!(t.font_size, 12);
        // Frame gone, committed text shown
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Rect { .. })), 0);
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Text { .. })), 1);
    }

    #[test]
    fn test_empty_text_discarded() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (0, 0), (100, 100));
        s.select_tool(Tool::Text, &mut canvas);
        drag(&mut s, &mut canvas, (10, 10), (80, 40));
        s.finish_text_edit(&mut canvas);
        let scene = s.scene().unwrap();
        assert_eq!((scene.undo_len(), scene.redo_len()), (0, 0));
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Text { .. })), 0);
        assert_eq!(count(&canvas, |p| matches!(p, Primitive::Rect { .. })), 0);
        assert!(matches!(s.mode(), Some(Mode::Idle)));
    }

    #[test]
    fn test_pointer_down_finalizes_text() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (0, 0), (100, 100));
        s.select_tool(Tool::Text, &mut canvas);
        drag(&mut s, &mut canvas, (10, 10), (80, 40));
        s.text_changed("first", &mut canvas);
        s.pointer_down(Point::new(20, 60), Instant::now(), &mut canvas);
        assert_eq!(s.scene().unwrap().undo_len(), 1);
        assert!(matches!(
            s.text_edit().map(|e| e.phase()),
            Some(TextPhase::Sizing)
        ));
    }

    #[test]
    fn test_escape_closes_color_picker_first() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (0, 0), (100, 100));
        s.open_color_picker();
        assert_eq!(s.escape(&mut canvas), Escape::ClosedColorPicker);
        assert!(s.is_drawing());
        assert_eq!(s.escape(&mut canvas), Escape::Cancelled);
        assert!(s.is_idle());
        assert_eq!(s.escape(&mut canvas), Escape::Ignored);
    }

    #[test]
    fn test_cancel_releases_everything() {
        let (mut s, mut canvas) = session(200, 200);
        select(&mut s, &mut canvas, (0, 0), (100, 100));
        s.select_tool(Tool::Rectangle, &mut canvas);
        drag(&mut s, &mut canvas, (10, 10), (20, 20));
        drag(&mut s, &mut canvas, (30, 30), (40, 40));
        s.undo(&mut canvas);
        s.escape(&mut canvas);
        assert!(s.is_idle());
        assert!(s.captured().is_none());
        assert!(s.scene().is_none());
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_cancel_while_selecting() {
        let (mut s, mut canvas) = session(200, 200);
        s.pointer_down(Point::new(5, 5), Instant::now(), &mut canvas);
        assert!(!canvas.is_empty());
        assert_eq!(s.escape(&mut canvas), Escape::Cancelled);
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_stroke_width_bounds() {
        let (mut s, _) = session(10, 10);
        assert!(s.change_stroke_width(-5));
        assert_eq!(s.stroke_width(), 1);
        assert!(!s.change_stroke_width(-1));
        assert!(s.change_stroke_width(100));
        assert_eq!(s.stroke_width(), MAX_STROKE_WIDTH);
        assert_eq!(s.stroke_percentage(), 100);
    }

    #[test]
    fn test_font_size_limited_to_menu() {
        let (mut s, mut canvas) = session(10, 10);
        assert!(s.set_font_size(36, &mut canvas));
        assert_eq!(s.font_size(), 36);
        for size in [0, 13, 1000] {
            assert!(!s.set_font_size(size, &mut canvas));
        }
        assert_eq!(s.font_size(), 36);
        assert!(!s.set_font_size(36, &mut canvas));
    }

    #[test]
    fn test_color_change_closes_picker() {
        let (mut s, mut canvas) = session(10, 10);
        s.open_color_picker();
        let blue = ShapeColor::from_rgb_u8(0, 0, 255);
        s.set_color(blue, &mut canvas);
        assert!(!s.color_picker_open());
        assert_eq!(s.color(), blue);
    }
}
