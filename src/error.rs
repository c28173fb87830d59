//! Error taxonomy for the capture/annotate core
//!
//! Every interactive-path failure ends up here and is turned into a
//! user-visible notice (or a silent correction) by `core::app`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Monitor enumeration or the screen grab failed
    #[error("screen capture failed: {0}")]
    Capture(String),

    /// A settings field could not be parsed or is out of range
    #[error("invalid value {value:?} for setting `{field}`")]
    InvalidSettingsValue { field: &'static str, value: String },

    /// The composited image could not be written to the clipboard
    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Png(#[from] png::EncodingError),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn invalid_setting(field: &'static str, value: impl Into<String>) -> Self {
        Error::InvalidSettingsValue {
            field,
            value: value.into(),
        }
    }
}
