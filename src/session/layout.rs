//! Placement of the selection overlay, dimension label and toolbar

use crate::domain::{Point, Rect};

/// Toolbar sizing
pub mod toolbar {
    /// The toolbar is never wider than this, nor than the drawing area
    pub const MAX_WIDTH: i32 = 500;
    pub const HEIGHT: i32 = 40;
    /// Distance between the drawing area and the toolbar
    pub const GAP: i32 = 10;
}

/// Toolbar rectangle for a drawing area.
///
/// Centered under the area when there is room below it, above it otherwise;
/// x is clamped to the screen.
pub fn toolbar_rect(area: Rect, screen: Rect) -> Rect {
    let area = area.normalized();
    let width = toolbar::MAX_WIDTH.min(area.width());
    let x = area.left + area.width() / 2 - width / 2;
    let y = if screen.bottom - area.bottom > toolbar::HEIGHT + toolbar::GAP {
        area.bottom + toolbar::GAP
    } else {
        area.top - toolbar::HEIGHT - toolbar::GAP
    };
    let x = x.min(screen.right - width).max(screen.left);
    Rect::new(x, y, x + width, y + toolbar::HEIGHT)
}

/// Dimmed panels around a selection: top, left, right, bottom.
///
/// Top and bottom span the full screen width; left and right fill the band
/// beside the selection.
pub fn overlay_panels(selection: Rect, screen: Rect) -> [Rect; 4] {
    let s = selection.normalized();
    [
        Rect::new(screen.left, screen.top, screen.right, s.top),
        Rect::new(screen.left, s.top, s.left, s.bottom),
        Rect::new(s.right, s.top, screen.right, s.bottom),
        Rect::new(screen.left, s.bottom, screen.right, screen.bottom),
    ]
}

/// "WxH" readout centered on the area
pub fn dimension_label(area: Rect) -> (Point, String) {
    let area = area.normalized();
    (
        area.center(),
        format!("{}x{}", area.width(), area.height()),
    )
}
