//! Flatten committed annotations onto the captured image using tiny-skia
//!
//! Everything is rasterized without anti-aliasing, so identical inputs give
//! byte-identical output.

use image::RgbaImage;
use tiny_skia::{FillRule, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::fonts::FontBook;
use super::geometry::{self, arrow};
use super::text;
use crate::config::ShapeColor;
use crate::domain::{ArrowShape, Point, Rect, RectShape, Shape, TextShape};
use crate::scene::command::Command;

/// Width of the outline framing an exported image
pub const STROKE_BORDER: u32 = 1;

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    // Copy back
    img.copy_from_slice(pixmap.data());
}

fn solid_paint(color: ShapeColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = false;
    paint
}

fn rect_path(left: f32, top: f32, right: f32, bottom: f32) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(left, top);
    pb.line_to(right, top);
    pb.line_to(right, bottom);
    pb.line_to(left, bottom);
    pb.close();
    pb.finish()
}

/// Stroke a rectangle whose inclusive pixel bounds are (x0, y0)-(x1, y1),
/// keeping the whole stroke inside those bounds
fn stroke_rect_inside(pixmap: &mut Pixmap, bounds: (f32, f32, f32, f32), width: f32, paint: &Paint) {
    let (x0, y0, x1, y1) = bounds;
    let half = width / 2.0;
    let (left, top, right, bottom) = (x0 + half, y0 + half, x1 + 1.0 - half, y1 + 1.0 - half);

    // Too small for a hollow outline: the stroke covers everything
    if right <= left || bottom <= top {
        if let Some(rect) = tiny_skia::Rect::from_ltrb(x0, y0, x1 + 1.0, y1 + 1.0) {
            pixmap.fill_rect(rect, paint, Transform::identity(), None);
        }
        return;
    }

    if let Some(path) = rect_path(left, top, right, bottom) {
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
    }
}

fn draw_rectangle(img: &mut RgbaImage, shape: &RectShape, offset: Point) {
    let (x0, y0, x1, y1) = geometry::normalize_rect(
        (shape.p1.x + offset.x) as f32,
        (shape.p1.y + offset.y) as f32,
        (shape.p2.x + offset.x) as f32,
        (shape.p2.y + offset.y) as f32,
    );
    let paint = solid_paint(shape.color);
    let width = shape.stroke_width.max(1) as f32;
    with_pixmap(img, |pixmap| {
        stroke_rect_inside(pixmap, (x0, y0, x1, y1), width, &paint);
    });
}

fn draw_arrow(img: &mut RgbaImage, shape: &ArrowShape, offset: Point) {
    let g = arrow::geometry(shape.p1, shape.p2, shape.stroke_width)
        .translate(offset.x as f32, offset.y as f32);
    let paint = solid_paint(shape.color);

    with_pixmap(img, |pixmap| {
        let mut pb = PathBuilder::new();
        pb.move_to(g.shaft_start.0, g.shaft_start.1);
        pb.line_to(g.shaft_end.0, g.shaft_end.1);
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: shape.stroke_width.max(1) as f32,
                line_cap: LineCap::Butt,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }

        let [apex, left, right] = g.head();
        let mut pb = PathBuilder::new();
        pb.move_to(apex.0, apex.1);
        pb.line_to(left.0, left.1);
        pb.line_to(right.0, right.1);
        pb.close();
        if let Some(path) = pb.finish() {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    });
}

fn draw_text(img: &mut RgbaImage, shape: &TextShape, offset: Point, fonts: &mut FontBook) {
    let Some(resolved) = fonts.resolve(&shape.font_family) else {
        log::warn!("Skipping text annotation, no font available");
        return;
    };
    if resolved.fallback {
        log::debug!("Drawing {:?} text with a default font", shape.font_family);
    }
    let origin = shape.origin.translate(offset.x, offset.y);
    text::draw_text(
        img,
        &resolved.font,
        (origin.x as f32, origin.y as f32),
        &shape.text,
        shape.color.to_rgba_u8(),
        shape.font_size as f32,
        shape.box_width as f32,
    );
}

/// Draw one shape, with every coordinate moved by `offset`
pub fn draw_shape(img: &mut RgbaImage, shape: &Shape, offset: Point, fonts: &mut FontBook) {
    match shape {
        Shape::Rectangle(r) => draw_rectangle(img, r, offset),
        Shape::Arrow(a) => draw_arrow(img, a, offset),
        Shape::Text(t) => draw_text(img, t, offset, fonts),
    }
}

/// Compose the exported image.
///
/// The capture is cropped to `drawing_area` (clipped to the capture), pasted
/// into a transparent canvas padded by `stroke_border` on every side, framed
/// in `outline`, and then every command is drawn on top, oldest first.
pub fn flatten<'a>(
    captured: &RgbaImage,
    drawing_area: Rect,
    commands: impl IntoIterator<Item = &'a Command>,
    outline: ShapeColor,
    fonts: &mut FontBook,
    stroke_border: u32,
) -> RgbaImage {
    let area = drawing_area.normalized();
    let crop = area.intersect(Rect::from_size(captured.width(), captured.height()));
    let origin = crop.map_or(area.top_left(), |c| c.top_left());
    let (w, h) = crop.map_or((0, 0), |c| (c.width() as u32, c.height() as u32));

    let border = stroke_border;
    let mut canvas = RgbaImage::new(w + 2 * border, h + 2 * border);
    if let Some(crop) = crop {
        let view =
            image::imageops::crop_imm(captured, crop.left as u32, crop.top as u32, w, h).to_image();
        image::imageops::replace(&mut canvas, &view, border as i64, border as i64);
    }

    if border > 0 {
        let paint = solid_paint(outline);
        let (cw, ch) = (canvas.width() as f32, canvas.height() as f32);
        with_pixmap(&mut canvas, |pixmap| {
            stroke_rect_inside(pixmap, (0.0, 0.0, cw - 1.0, ch - 1.0), border as f32, &paint);
        });
    }

    let offset = Point::new(border as i32 - origin.x, border as i32 - origin.y);
    let mut count = 0;
    for command in commands {
        draw_shape(&mut canvas, command.shape(), offset, fonts);
        count += 1;
    }
    log::debug!(
        "Flattened {} shapes onto {}x{} image",
        count,
        canvas.width(),
        canvas.height()
    );
    canvas
}
