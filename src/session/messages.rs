//! Message types for the capture session
//!
//! This module contains:
//! - Msg enum with nested sub-enums for organized message handling
//! - Keyboard input types consumed by the shortcut mapper
//!
//! Every message deserializes from JSON so scripted input can drive the core,
//! e.g. `"capture_requested"` or `{"pointer":{"down":{"x":10,"y":20}}}`.

use serde::Deserialize;

use crate::config::{SettingsForm, ShapeColor};
use crate::domain::Point;

use super::state::Tool;

// ============================================================================
// Input Types
// ============================================================================

/// Keys with a name rather than a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Named {
    Escape,
    Enter,
    Backspace,
}

/// A pressed key: a named key, or the character it produces
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Named(Named),
    Character(String),
}

/// Modifier state at the time of a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        alt: false,
    };
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
        alt: false,
    };

    pub fn control(&self) -> bool {
        self.ctrl
    }

    pub fn shift(&self) -> bool {
        self.shift
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

// ============================================================================
// Sub-messages
// ============================================================================

/// Primary button pointer events, in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerMsg {
    Down(Point),
    Move(Point),
    Up(Point),
}

/// Toolbar interactions
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMsg {
    /// Switch the active tool
    Select(Tool),
    /// The external color dialog was opened
    OpenColorPicker,
    /// A color was picked (also closes the picker)
    SetColor(ShapeColor),
    /// Grow or shrink the stroke width by a step
    StrokeWidth(i32),
    /// Pick a font size from the menu
    FontSize(u32),
}

/// Text field input while a text annotation is open
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMsg {
    /// Whole field content replaced
    Changed(String),
    /// Typed at the end of the field
    Insert(String),
    /// Delete the last character
    Backspace,
    /// The field lost focus
    FocusLost,
}

// ============================================================================
// Main Message Enum
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Msg {
    /// Hotkey: grab the screen and start selecting
    CaptureRequested,
    /// Escape from an outside source
    CancelRequested,
    Pointer(PointerMsg),
    Key(KeyPress),
    Text(TextMsg),
    Tool(ToolMsg),
    Undo,
    Redo,
    /// Flatten and publish the drawing area
    Copy,
    OpenSettings,
    SettingsSubmitted(SettingsForm),
    Quit,
}

impl Msg {
    pub fn pointer_down(x: i32, y: i32) -> Self {
        Msg::Pointer(PointerMsg::Down(Point::new(x, y)))
    }
    pub fn pointer_move(x: i32, y: i32) -> Self {
        Msg::Pointer(PointerMsg::Move(Point::new(x, y)))
    }
    pub fn pointer_up(x: i32, y: i32) -> Self {
        Msg::Pointer(PointerMsg::Up(Point::new(x, y)))
    }

    pub fn key(key: Key, modifiers: Modifiers) -> Self {
        Msg::Key(KeyPress { key, modifiers })
    }
    pub fn character(c: &str) -> Self {
        Msg::key(Key::Character(c.to_string()), Modifiers::NONE)
    }
    pub fn named(key: Named) -> Self {
        Msg::key(Key::Named(key), Modifiers::NONE)
    }

    pub fn text_changed(text: impl Into<String>) -> Self {
        Msg::Text(TextMsg::Changed(text.into()))
    }
    pub fn focus_lost() -> Self {
        Msg::Text(TextMsg::FocusLost)
    }

    pub fn select_tool(tool: Tool) -> Self {
        Msg::Tool(ToolMsg::Select(tool))
    }
    pub fn set_color(color: ShapeColor) -> Self {
        Msg::Tool(ToolMsg::SetColor(color))
    }
    pub fn stroke_width(delta: i32) -> Self {
        Msg::Tool(ToolMsg::StrokeWidth(delta))
    }
    pub fn font_size(size: u32) -> Self {
        Msg::Tool(ToolMsg::FontSize(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unit_messages() {
        let msg: Msg = serde_json::from_str(r#""capture_requested""#).unwrap();
        assert_eq!(msg, Msg::CaptureRequested);
        let msg: Msg = serde_json::from_str(r#""copy""#).unwrap();
        assert_eq!(msg, Msg::Copy);
    }

    #[test]
    fn test_parse_pointer() {
        let msg: Msg = serde_json::from_str(r#"{"pointer":{"down":{"x":10,"y":-2}}}"#).unwrap();
        assert_eq!(msg, Msg::pointer_down(10, -2));
    }

    #[test]
    fn test_parse_keys() {
        let msg: Msg =
            serde_json::from_str(r#"{"key":{"key":"z","modifiers":{"ctrl":true}}}"#).unwrap();
        assert_eq!(msg, Msg::key(Key::Character("z".into()), Modifiers::CTRL));
        let msg: Msg = serde_json::from_str(r#"{"key":{"key":"escape"}}"#).unwrap();
        assert_eq!(msg, Msg::named(Named::Escape));
    }

    #[test]
    fn test_parse_tool_messages() {
        let msg: Msg = serde_json::from_str(r#"{"tool":{"select":"arrow"}}"#).unwrap();
        assert_eq!(msg, Msg::select_tool(Tool::Arrow));
        let msg: Msg = serde_json::from_str(r##"{"tool":{"set_color":"#00ff00"}}"##).unwrap();
        assert_eq!(msg, Msg::set_color(ShapeColor::from_rgb_u8(0, 255, 0)));
        let msg: Msg = serde_json::from_str(r#"{"tool":{"stroke_width":-1}}"#).unwrap();
        assert_eq!(msg, Msg::stroke_width(-1));
    }

    #[test]
    fn test_parse_settings_form() {
        let msg: Msg = serde_json::from_str(
            r#"{"settings_submitted":{"hotkey":"prtscn","color":"blue","font_size":"14","stroke_width":"3","refresh_rate":"30"}}"#,
        )
        .unwrap();
        let Msg::SettingsSubmitted(form) = msg else {
            panic!("expected settings form");
        };
        assert_eq!(form.font_size, "14");
    }
}
