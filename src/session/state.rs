//! Capture session state
//!
//! One `Session` lives for the whole program. It sits in `Phase::Idle`
//! between captures; a capture moves it to `Selecting`, releasing the
//! selection drag moves it to `Drawing`, and cancel or a successful copy
//! brings it back to `Idle`, dropping the capture and the scene.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::capture::CapturedImage;
use crate::config::{MAX_STROKE_WIDTH, Settings, ShapeColor};
use crate::domain::{Handle, Point, Rect};
use crate::scene::Scene;
use crate::scene::canvas::ItemId;

/// Font family used for text annotations
pub const DEFAULT_FONT_FAMILY: &str = "Meiryo";

/// Toolbar tools
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Drag the drawing area around
    #[default]
    Move,
    Rectangle,
    Arrow,
    Text,
}

/// Rate limiter for drag feedback
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// True if at least one interval passed since the last accepted tick;
    /// accepting records `now`
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Record a refresh that bypassed the limiter
    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }
}

/// Transient live view items shown while selecting
#[derive(Debug)]
pub struct Selecting {
    /// Drag start and current end, once the button went down
    pub(super) drag: Option<(Point, Point)>,
    pub(super) overlay: Vec<ItemId>,
    pub(super) label: Option<ItemId>,
    pub(super) throttle: Throttle,
}

impl Selecting {
    /// Current selection, if a drag started
    pub fn selection(&self) -> Option<Rect> {
        self.drag.map(|(start, end)| Rect::from_points(start, end))
    }
}

/// Rectangle or arrow being dragged out
#[derive(Debug)]
pub struct ShapeDraft {
    pub(super) tool: Tool,
    pub(super) start: Point,
    pub(super) end: Point,
    pub(super) items: Vec<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPhase {
    /// Dragging out the box
    Sizing,
    /// Text field open
    Typing,
}

#[derive(Debug)]
pub struct TextEdit {
    pub(super) phase: TextPhase,
    pub(super) start: Point,
    pub(super) end: Point,
    pub(super) text: String,
    /// Dashed box outline
    pub(super) frame: ItemId,
    pub(super) preview: Option<ItemId>,
}

impl TextEdit {
    pub fn phase(&self) -> TextPhase {
        self.phase
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn frame(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }
}

/// Sub-modes of `Phase::Drawing`; exactly one is active
#[derive(Debug)]
pub enum Mode {
    Idle,
    Moving {
        last: Point,
    },
    Resizing {
        active: Handle,
        /// Opposite corner, fixed for the whole drag
        anchor: Point,
    },
    DrawingShape(ShapeDraft),
    EditingText(TextEdit),
}

#[derive(Debug)]
pub struct Drawing {
    pub(super) scene: Scene,
    pub(super) mode: Mode,
    pub(super) handles: Vec<ItemId>,
    pub(super) label: Option<ItemId>,
    /// Hidden while resizing
    pub(super) toolbar: Option<Rect>,
}

#[derive(Debug)]
pub enum Phase {
    Idle,
    Selecting(Selecting),
    Drawing(Drawing),
}

#[derive(Debug)]
pub struct Session {
    pub(super) tool: Tool,
    pub(super) color: ShapeColor,
    pub(super) stroke_width: u32,
    pub(super) font_size: u32,
    pub(super) font_family: String,
    pub(super) refresh_interval: Duration,
    pub(super) color_picker_open: bool,
    /// Screen rectangle of the current capture
    pub(super) bounds: Rect,
    pub(super) captured: Option<CapturedImage>,
    pub(super) phase: Phase,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self {
            tool: Tool::default(),
            color: settings.color,
            stroke_width: settings.stroke_width.clamp(1, MAX_STROKE_WIDTH),
            font_size: settings.font_size,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            refresh_interval: settings.refresh_interval(),
            color_picker_open: false,
            bounds: Rect::default(),
            captured: None,
            phase: Phase::Idle,
        }
    }

    /// Take over new settings; the current capture, if any, is untouched
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.color = settings.color;
        self.stroke_width = settings.stroke_width.clamp(1, MAX_STROKE_WIDTH);
        self.font_size = settings.font_size;
        self.refresh_interval = settings.refresh_interval();
    }

    /// Write the session's current choices back into `settings`
    pub fn store_settings(&self, settings: &mut Settings) {
        settings.color = self.color;
        settings.stroke_width = self.stroke_width;
        settings.font_size = self.font_size;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> ShapeColor {
        self.color
    }

    pub fn stroke_width(&self) -> u32 {
        self.stroke_width
    }

    /// Stroke width as a share of the maximum, for the toolbar readout
    pub fn stroke_percentage(&self) -> u32 {
        self.stroke_width * 100 / MAX_STROKE_WIDTH
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn color_picker_open(&self) -> bool {
        self.color_picker_open
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.phase, Phase::Selecting(_))
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.phase, Phase::Drawing(_))
    }

    pub fn captured(&self) -> Option<&CapturedImage> {
        self.captured.as_ref()
    }

    /// Screen rectangle of the current capture
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn scene(&self) -> Option<&Scene> {
        match &self.phase {
            Phase::Drawing(d) => Some(&d.scene),
            _ => None,
        }
    }

    /// Active sub-mode while drawing
    pub fn mode(&self) -> Option<&Mode> {
        match &self.phase {
            Phase::Drawing(d) => Some(&d.mode),
            _ => None,
        }
    }

    pub fn text_edit(&self) -> Option<&TextEdit> {
        match self.mode() {
            Some(Mode::EditingText(edit)) => Some(edit),
            _ => None,
        }
    }

    /// A text field is open and takes keyboard input
    pub fn is_typing(&self) -> bool {
        self.text_edit()
            .is_some_and(|edit| edit.phase == TextPhase::Typing)
    }

    /// Toolbar placement, when shown
    pub fn toolbar(&self) -> Option<Rect> {
        match &self.phase {
            Phase::Drawing(d) => d.toolbar,
            _ => None,
        }
    }

    /// Selection in progress, while selecting
    pub fn selection(&self) -> Option<Rect> {
        match &self.phase {
            Phase::Selecting(s) => s.selection(),
            _ => None,
        }
    }
}
