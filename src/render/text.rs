//! Text rasterization onto images with ab_glyph

use ab_glyph::{Font, FontArc, ScaleFont, point};
use image::RgbaImage;

use super::geometry::text::PADDING;

/// Source-over blend of an unpremultiplied color onto one pixel
fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, [r, g, b, a]: [u8; 4]) {
    if a == 0 {
        return;
    }
    let dst = img.get_pixel(x, y).0;
    let src_a = a as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return;
    }
    let blend = |src: u8, dst: u8| {
        let src_f = src as f32 / 255.0;
        let dst_f = dst as f32 / 255.0;
        ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    img.put_pixel(
        x,
        y,
        image::Rgba([
            blend(r, dst[0]),
            blend(g, dst[1]),
            blend(b, dst[2]),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        ]),
    );
}

fn text_width(font: &FontArc, size: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(size);
    text.chars()
        .map(|ch| scaled.h_advance(scaled.glyph_id(ch)))
        .sum()
}

/// Break `text` into lines no wider than `max_width`.
///
/// Explicit newlines always break. Words are never split, so a single word
/// wider than the box gets a line of its own. A zero width disables wrapping.
pub fn wrap_lines(font: &FontArc, size: f32, text: &str, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if max_width <= 0.0 {
            lines.push(paragraph.to_string());
            continue;
        }
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if line.is_empty() || text_width(font, size, &candidate) <= max_width {
                line = candidate;
            } else {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            }
        }
        lines.push(line);
    }
    lines
}

/// Draw wrapped text with its box's top-left corner at `origin`
pub fn draw_text(
    img: &mut RgbaImage,
    font: &FontArc,
    origin: (f32, f32),
    text: &str,
    color: [u8; 4],
    size: f32,
    box_width: f32,
) {
    if text.is_empty() {
        return;
    }
    let scaled = font.as_scaled(size);
    let line_height = scaled.height() + scaled.line_gap();
    let inner_width = (box_width - 2.0 * PADDING).max(0.0);

    for (row, line) in wrap_lines(font, size, text, inner_width).iter().enumerate() {
        let baseline = origin.1 + PADDING + scaled.ascent() + row as f32 * line_height;
        let mut caret = point(origin.0 + PADDING, baseline);
        for ch in line.chars() {
            let mut glyph = scaled.scaled_glyph(ch);
            glyph.position = caret;
            caret.x += scaled.h_advance(glyph.id);
            let Some(outlined) = scaled.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, coverage| {
                let px = x as i32 + bounds.min.x as i32;
                let py = y as i32 + bounds.min.y as i32;
                if px >= 0 && py >= 0 && px < img.width() as i32 && py < img.height() as i32 {
                    let alpha = (color[3] as f32 * coverage).round().clamp(0.0, 255.0) as u8;
                    blend_pixel(
                        img,
                        px as u32,
                        py as u32,
                        [color[0], color[1], color[2], alpha],
                    );
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_font() -> Option<FontArc> {
        crate::render::FontBook::system()
            .resolve("DejaVu Sans")
            .map(|r| r.font)
    }

    #[test]
    fn test_wrap_breaks_at_width_and_newlines() {
        let Some(font) = system_font() else {
            return;
        };
        let max = text_width(&font, 16.0, "alpha beta");
        assert_eq!(
            wrap_lines(&font, 16.0, "alpha beta gamma", max),
            vec!["alpha beta", "gamma"]
        );
        assert_eq!(
            wrap_lines(&font, 16.0, "one\ntwo", 1000.0),
            vec!["one", "two"]
        );
        for line in wrap_lines(&font, 16.0, "a bb ccc dddd eeeee ffffff", 40.0) {
            assert!(!line.contains(' ') || text_width(&font, 16.0, &line) <= 40.0);
        }
    }

    #[test]
    fn test_wrap_never_splits_words() {
        let Some(font) = system_font() else {
            return;
        };
        assert_eq!(
            wrap_lines(&font, 16.0, "supercalifragilistic x", 5.0),
            vec!["supercalifragilistic", "x"]
        );
        // Zero width disables wrapping
        assert_eq!(
            wrap_lines(&font, 16.0, "no wrap here", 0.0),
            vec!["no wrap here"]
        );
    }

    #[test]
    fn test_draw_text_stays_near_origin() {
        let Some(font) = system_font() else {
            return;
        };
        let mut img = RgbaImage::from_pixel(80, 60, image::Rgba([255, 255, 255, 255]));
        draw_text(&mut img, &font, (10.0, 10.0), "Hi", [0, 0, 0, 255], 20.0, 60.0);
        let changed: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 != [255, 255, 255, 255])
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!changed.is_empty());
        assert!(changed.iter().all(|&(x, y)| x >= 10 && y >= 10 && x < 70 && y < 40));
    }

    #[test]
    fn test_blend_opaque_replaces() {
        let mut img = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 255, 255]));
        blend_pixel(&mut img, 0, 0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_blend_onto_transparent_keeps_color() {
        let mut img = RgbaImage::new(1, 1);
        blend_pixel(&mut img, 0, 0, [10, 20, 30, 128]);
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 128]);
    }

    #[test]
    fn test_blend_zero_alpha_is_noop() {
        let mut img = RgbaImage::from_pixel(1, 1, image::Rgba([1, 2, 3, 4]));
        blend_pixel(&mut img, 0, 0, [255, 255, 255, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 4]);
    }

    #[test]
    fn test_blend_half_over_opaque() {
        let mut img = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]));
        blend_pixel(&mut img, 0, 0, [255, 255, 255, 128]);
        let [r, g, b, a] = img.get_pixel(0, 0).0;
        assert_eq!(a, 255);
        assert!(r == g && g == b && (127..=129).contains(&r));
    }
}
