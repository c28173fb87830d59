//! Application shell
//!
//! `App` owns the session, the live view and the collaborators, and turns
//! every failure into either a silent correction or a user-visible notice.

use std::fmt;
use std::time::Instant;

use crossbeam_channel::Receiver;

use crate::capture::CaptureService;
use crate::config::{Settings, SettingsForm, SettingsStore, ShapeColor};
use crate::export::ExportSink;
use crate::render::{FontBook, STROKE_BORDER, flatten};
use crate::scene::canvas::DisplayList;
use crate::scene::command::Command;
use crate::session::messages::{KeyPress, PointerMsg, TextMsg, ToolMsg};
use crate::session::{Escape, Msg, Session, Tool, shortcuts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{}", self.message),
            NoticeLevel::Error => write!(f, "error: {}", self.message),
        }
    }
}

pub struct App {
    settings: Settings,
    session: Session,
    canvas: DisplayList,
    fonts: FontBook,
    capture: Box<dyn CaptureService>,
    sink: Box<dyn ExportSink>,
    store: Box<dyn SettingsStore>,
    notices: Vec<Notice>,
    quitting: bool,
}

impl App {
    /// Build the app with settings loaded from `store`; a broken store
    /// falls back to defaults with a notice
    pub fn new(
        capture: Box<dyn CaptureService>,
        sink: Box<dyn ExportSink>,
        store: Box<dyn SettingsStore>,
        fonts: FontBook,
    ) -> Self {
        let mut notices = Vec::new();
        let settings = match store.load() {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("Failed to load settings: {err}");
                notices.push(Notice::error(format!("settings not loaded: {err}")));
                Settings::default()
            }
        };
        log::debug!("Settings: {settings:?}");
        Self {
            session: Session::new(&settings),
            settings,
            canvas: DisplayList::new(),
            fonts,
            capture,
            sink,
            store,
            notices,
            quitting: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Live view contents
    pub fn canvas(&self) -> &DisplayList {
        &self.canvas
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => log::info!("{}", notice.message),
            NoticeLevel::Error => log::error!("{}", notice.message),
        }
        self.notices.push(notice);
    }

    /// Process queued messages until `Msg::Quit` or until every sender is
    /// gone, handing notices to `on_notice` as they come up
    pub fn run(&mut self, rx: Receiver<Msg>, mut on_notice: impl FnMut(Notice)) {
        for notice in self.take_notices() {
            on_notice(notice);
        }
        for msg in rx.iter() {
            self.update(msg);
            for notice in self.take_notices() {
                on_notice(notice);
            }
            if self.quitting {
                break;
            }
        }
        log::debug!("Event loop finished");
    }

    pub fn update(&mut self, msg: Msg) {
        self.update_at(msg, Instant::now());
    }

    /// Handle one message; `now` drives drag throttling
    pub fn update_at(&mut self, msg: Msg, now: Instant) {
        match msg {
            Msg::CaptureRequested => self.on_capture_requested(),
            Msg::CancelRequested => self.on_cancel_requested(),
            Msg::Pointer(pointer) => self.on_pointer(pointer, now),
            Msg::Key(press) => self.on_key(press, now),
            Msg::Text(text) => self.on_text(text),
            Msg::Tool(tool) => self.on_tool(tool),
            Msg::Undo => self.on_undo(),
            Msg::Redo => self.on_redo(),
            Msg::Copy => self.on_copy_requested(),
            Msg::OpenSettings => self.on_open_settings(),
            Msg::SettingsSubmitted(form) => self.on_settings_submitted(&form),
            Msg::Quit => self.on_quit(),
        }
    }

    pub fn on_capture_requested(&mut self) {
        if !self.session.is_idle() {
            log::debug!("Capture already in progress, ignoring request");
            return;
        }
        let result = self
            .capture
            .screen_bounds()
            .and_then(|bounds| Ok((bounds, self.capture.capture(bounds)?)));
        match result {
            Ok((bounds, image)) => self.session.begin(image, bounds),
            Err(err) => self.notify(Notice::error(err.to_string())),
        }
    }

    pub fn on_cancel_requested(&mut self) {
        if self.session.escape(&mut self.canvas) == Escape::Cancelled {
            self.notify(Notice::info("Capture cancelled"));
        }
    }

    fn on_pointer(&mut self, pointer: PointerMsg, now: Instant) {
        match pointer {
            PointerMsg::Down(p) => self.session.pointer_down(p, now, &mut self.canvas),
            PointerMsg::Move(p) => self.session.pointer_move(p, now, &mut self.canvas),
            PointerMsg::Up(p) => self.session.pointer_up(p, now, &mut self.canvas),
        }
    }

    fn on_key(&mut self, press: KeyPress, now: Instant) {
        if let Some(msg) = shortcuts::handle_key_event(&self.session, &press) {
            self.update_at(msg, now);
        }
    }

    fn on_text(&mut self, text: TextMsg) {
        match text {
            TextMsg::Changed(text) => self.session.text_changed(&text, &mut self.canvas),
            TextMsg::Insert(text) => self.session.insert_text(&text, &mut self.canvas),
            TextMsg::Backspace => self.session.backspace(&mut self.canvas),
            TextMsg::FocusLost => self.session.finish_text_edit(&mut self.canvas),
        }
    }

    fn on_tool(&mut self, tool: ToolMsg) {
        match tool {
            ToolMsg::Select(tool) => self.on_tool_selected(tool),
            ToolMsg::OpenColorPicker => self.session.open_color_picker(),
            ToolMsg::SetColor(color) => self.on_color_changed(color),
            ToolMsg::StrokeWidth(delta) => self.on_stroke_width_changed(delta),
            ToolMsg::FontSize(size) => self.on_font_size_changed(size),
        }
    }

    pub fn on_undo(&mut self) {
        self.session.undo(&mut self.canvas);
    }

    pub fn on_redo(&mut self) {
        self.session.redo(&mut self.canvas);
    }

    /// Flatten the drawing area and publish it. Success ends the session;
    /// on failure the scene stays for another attempt.
    pub fn on_copy_requested(&mut self) {
        if !self.session.is_drawing() {
            log::debug!("Nothing to copy");
            return;
        }
        self.session.finish_text_edit(&mut self.canvas);

        let (Some(captured), Some(scene)) = (self.session.captured(), self.session.scene()) else {
            return;
        };
        // Shapes live in screen space, the capture starts at the screen origin
        let origin = self.session.bounds().top_left();
        let area = scene.drawing_area().translate(-origin.x, -origin.y);
        let commands: Vec<Command> = scene
            .commands()
            .cloned()
            .map(|mut command| {
                command.translate(-origin.x, -origin.y);
                command
            })
            .collect();
        let image = flatten(
            &captured.rgba,
            area,
            &commands,
            self.session.color(),
            &mut self.fonts,
            STROKE_BORDER,
        );

        match self.sink.publish(&image) {
            Ok(()) => {
                self.notify(Notice::info(format!(
                    "Copied {}x{} image",
                    image.width(),
                    image.height()
                )));
                self.session.reset(&mut self.canvas);
            }
            Err(err) => self.notify(Notice::error(err.to_string())),
        }
    }

    pub fn on_tool_selected(&mut self, tool: Tool) {
        self.session.select_tool(tool, &mut self.canvas);
    }

    pub fn on_color_changed(&mut self, color: ShapeColor) {
        self.session.set_color(color, &mut self.canvas);
    }

    pub fn on_stroke_width_changed(&mut self, delta: i32) {
        if self.session.change_stroke_width(delta) {
            self.save_settings();
        }
    }

    pub fn on_font_size_changed(&mut self, size: u32) {
        if self.session.set_font_size(size, &mut self.canvas) {
            self.save_settings();
        }
    }

    fn on_open_settings(&mut self) {
        let form = SettingsForm::from_settings(&self.settings);
        match serde_json::to_string(&form) {
            Ok(json) => self.notify(Notice::info(format!("Settings: {json}"))),
            Err(err) => log::error!("Failed to show settings: {err}"),
        }
    }

    /// Validate and persist a submitted settings form. Invalid input is
    /// rejected whole and the previous settings stay in effect.
    pub fn on_settings_submitted(&mut self, form: &SettingsForm) {
        let settings = match form.parse() {
            Ok(settings) => settings,
            Err(err) => {
                self.notify(Notice::error(err.to_string()));
                return;
            }
        };
        self.session.apply_settings(&settings);
        self.settings = settings;
        match self.store.save(&self.settings) {
            Ok(()) => self.notify(Notice::info("Settings saved")),
            Err(err) => self.notify(Notice::error(format!("settings not saved: {err}"))),
        }
    }

    fn on_quit(&mut self) {
        self.session.reset(&mut self.canvas);
        self.save_settings();
        self.quitting = true;
    }

    /// Persist the session's current choices; failures are only logged
    fn save_settings(&mut self) {
        self.session.store_settings(&mut self.settings);
        if let Err(err) = self.store.save(&self.settings) {
            log::warn!("Failed to save settings: {err}");
        }
    }
}
