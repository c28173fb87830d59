//! Configuration persistence for quicksnip settings

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Serializable color representation for config storage
///
/// Stored on disk as a string, either a color name (`red`) or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
];

impl Default for ShapeColor {
    fn default() -> Self {
        Self::RED
    }
}

impl ShapeColor {
    pub const RED: ShapeColor = ShapeColor {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            255,
        ]
    }
}

impl FromStr for ShapeColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(Error::invalid_setting("color", s));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::invalid_setting("color", s))
            };
            return Ok(Self::from_rgb_u8(channel(0)?, channel(2)?, channel(4)?));
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, [r, g, b])| Self::from_rgb_u8(*r, *g, *b))
            .ok_or_else(|| Error::invalid_setting("color", s))
    }
}

impl fmt::Display for ShapeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, _] = self.to_rgba_u8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl TryFrom<String> for ShapeColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ShapeColor> for String {
    fn from(c: ShapeColor) -> Self {
        c.to_string()
    }
}

/// Capture hotkey names the hotkey source understands, mapped to its key id
pub const HOTKEYS: &[(&str, &str)] = &[
    ("print screen", "print_screen"),
    ("prtscn", "print_screen"),
    ("prt sc", "print_screen"),
    ("prnt scrn", "print_screen"),
    ("print_screen", "print_screen"),
    ("ctrl+shift+s", "ctrl+shift+s"),
];

/// Values offered by the font size menu
pub const FONT_SIZES: [u32; 16] = [8, 9, 10, 11, 12, 14, 16, 18, 20, 22, 24, 26, 28, 36, 48, 72];

/// Upper bound for the annotation stroke width
pub const MAX_STROKE_WIDTH: u32 = 10;

/// Accepted selection overlay refresh rates, in Hz
pub const REFRESH_RATE_RANGE: std::ops::RangeInclusive<f64> = 1.0..=1000.0;

fn valid_refresh_rate(rate: f64) -> bool {
    REFRESH_RATE_RANGE.contains(&rate)
}

/// Key id for a hotkey name, if known
pub fn hotkey_id(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    HOTKEYS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, id)| *id)
}

/// Application settings persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Hotkey that triggers a capture
    #[serde(default = "default_hotkey", rename = "screenshot_key")]
    pub hotkey: String,
    /// Annotation color
    #[serde(default)]
    pub color: ShapeColor,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Annotation stroke width in pixels
    #[serde(default = "default_stroke_width", rename = "line_thickness")]
    pub stroke_width: u32,
    /// Selection overlay refresh rate in Hz
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: f64,
}

fn default_hotkey() -> String {
    "print screen".to_string()
}

fn default_font_size() -> u32 {
    12
}

fn default_stroke_width() -> u32 {
    2
}

fn default_refresh_rate() -> f64 {
    60.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hotkey: default_hotkey(),
            color: ShapeColor::default(),
            font_size: default_font_size(),
            stroke_width: default_stroke_width(),
            refresh_rate: default_refresh_rate(),
        }
    }
}

impl Settings {
    /// Minimum time between selection overlay recomputations
    pub fn refresh_interval(&self) -> std::time::Duration {
        let rate = if valid_refresh_rate(self.refresh_rate) {
            self.refresh_rate
        } else {
            default_refresh_rate()
        };
        std::time::Duration::try_from_secs_f64(1.0 / rate)
            .unwrap_or(std::time::Duration::from_millis(16))
    }

    /// Repair values a hand-edited file may carry
    fn sanitized(mut self) -> Self {
        if hotkey_id(&self.hotkey).is_none() {
            log::warn!("Unknown hotkey {:?}, using default", self.hotkey);
            self.hotkey = default_hotkey();
        }
        self.hotkey = self.hotkey.to_lowercase();
        self.stroke_width = self.stroke_width.clamp(1, MAX_STROKE_WIDTH);
        if self.font_size == 0 {
            self.font_size = default_font_size();
        }
        if !valid_refresh_rate(self.refresh_rate) {
            log::warn!("Refresh rate {} out of range, using default", self.refresh_rate);
            self.refresh_rate = default_refresh_rate();
        }
        self
    }
}

/// Raw field values as typed into the settings dialog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsForm {
    pub hotkey: String,
    pub color: String,
    pub font_size: String,
    pub stroke_width: String,
    pub refresh_rate: String,
}

impl SettingsForm {
    /// Form prefilled from the current settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            hotkey: settings.hotkey.clone(),
            color: settings.color.to_string(),
            font_size: settings.font_size.to_string(),
            stroke_width: settings.stroke_width.to_string(),
            refresh_rate: settings.refresh_rate.to_string(),
        }
    }

    /// Validate every field; the first bad one is reported
    pub fn parse(&self) -> Result<Settings> {
        let hotkey = self.hotkey.trim().to_lowercase();
        if hotkey_id(&hotkey).is_none() {
            return Err(Error::invalid_setting("hotkey", &self.hotkey));
        }
        let color: ShapeColor = self.color.parse()?;
        let font_size = self
            .font_size
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| Error::invalid_setting("font_size", &self.font_size))?;
        let stroke_width = self
            .stroke_width
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|w| (1..=MAX_STROKE_WIDTH).contains(w))
            .ok_or_else(|| Error::invalid_setting("stroke_width", &self.stroke_width))?;
        let refresh_rate = self
            .refresh_rate
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|r| valid_refresh_rate(*r))
            .ok_or_else(|| Error::invalid_setting("refresh_rate", &self.refresh_rate))?;

        Ok(Settings {
            hotkey,
            color,
            font_size,
            stroke_width,
            refresh_rate,
        })
    }
}

/// Plain key-value persistence for `Settings`
pub trait SettingsStore {
    /// Load settings; a missing store yields defaults
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Settings kept as a JSON file
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub const FILE_NAME: &'static str = "settings.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user config dir, or the working directory if none
    pub fn in_config_dir() -> Self {
        let path = dirs::config_dir()
            .map(|dir| dir.join("quicksnip").join(Self::FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(Self::FILE_NAME));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                let settings: Settings = serde_json::from_str(&text)?;
                Ok(settings.sanitized())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", self.path.display());
                Ok(Settings::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, text)?;
        log::debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        assert_eq!("red".parse::<ShapeColor>().unwrap(), ShapeColor::RED);
        assert_eq!("#FF0000".parse::<ShapeColor>().unwrap(), ShapeColor::RED);
        assert_eq!(
            "#0080ff".parse::<ShapeColor>().unwrap().to_rgba_u8(),
            [0, 128, 255, 255]
        );
        assert!("#12345".parse::<ShapeColor>().is_err());
        assert!("chartreuse-ish".parse::<ShapeColor>().is_err());
        assert_eq!(ShapeColor::RED.to_string(), "#ff0000");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("nope").join("settings.json"));
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("cfg").join("settings.json"));
        let settings = Settings {
            hotkey: "ctrl+shift+s".into(),
            color: "blue".parse().unwrap(),
            font_size: 18,
            stroke_width: 4,
            refresh_rate: 30.0,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_legacy_file_keys_and_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"screenshot_key": "PrtScn", "color": "red", "line_thickness": 40}"#,
        )
        .unwrap();
        let settings = JsonSettingsStore::new(&path).load().unwrap();
        assert_eq!(settings.hotkey, "prtscn");
        assert_eq!(settings.stroke_width, MAX_STROKE_WIDTH);
        assert_eq!(settings.font_size, 12);
        assert_eq!(settings.refresh_rate, 60.0);
    }

    #[test]
    fn test_form_rejects_non_numeric_refresh_rate() {
        let mut form = SettingsForm::from_settings(&Settings::default());
        form.refresh_rate = "fast".into();
        match form.parse() {
            Err(Error::InvalidSettingsValue { field, value }) => {
                assert_eq!(field, "refresh_rate");
                assert_eq!(value, "fast");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_form_rejects_refresh_rate_out_of_range() {
        for rate in ["1e-20", "0", "-5", "5000", "NaN", "inf"] {
            let mut form = SettingsForm::from_settings(&Settings::default());
            form.refresh_rate = rate.into();
            assert!(
                matches!(
                    form.parse(),
                    Err(Error::InvalidSettingsValue { field: "refresh_rate", .. })
                ),
                "{rate} accepted"
            );
        }
    }

    #[test]
    fn test_tiny_refresh_rate_in_file_is_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"refresh_rate": 1e-20}"#).unwrap();
        let settings = JsonSettingsStore::new(&path).load().unwrap();
        assert_eq!(settings.refresh_rate, 60.0);
        settings.refresh_interval();
    }

    #[test]
    fn test_refresh_interval_never_panics() {
        for rate in [1e-20, 0.0, -1.0, f64::NAN, f64::INFINITY] {
            let settings = Settings {
                refresh_rate: rate,
                ..Settings::default()
            };
            assert_eq!(settings.refresh_interval(), Settings::default().refresh_interval());
        }
    }

    #[test]
    fn test_form_rejects_unknown_hotkey() {
        let mut form = SettingsForm::from_settings(&Settings::default());
        form.hotkey = "f13".into();
        assert!(matches!(
            form.parse(),
            Err(Error::InvalidSettingsValue { field: "hotkey", .. })
        ));
    }

    #[test]
    fn test_refresh_interval() {
        let settings = Settings::default();
        let interval = settings.refresh_interval();
        assert!(interval.as_millis() >= 16 && interval.as_millis() <= 17);
    }
}
