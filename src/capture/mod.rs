//! Screen capture collaborators
//!
//! The grab itself belongs to the platform; the core only sees the
//! `CaptureService` trait. `StillCapture` serves a fixed image, which is what
//! the headless driver and the tests use.

pub mod image;

use std::path::Path;

use ::image::RgbaImage;

use crate::domain::Rect;
use crate::error::{Error, Result};

pub use self::image::CapturedImage;

/// Source of screen pixels
pub trait CaptureService {
    /// Union of all monitors, in screen pixels
    fn screen_bounds(&self) -> Result<Rect>;
    /// Grab `rect` (clipped to the screen)
    fn capture(&mut self, rect: Rect) -> Result<CapturedImage>;
}

/// Serves crops of one fixed image as the "screen"
#[derive(Clone, Debug)]
pub struct StillCapture {
    screen: CapturedImage,
}

impl StillCapture {
    pub fn new(rgba: RgbaImage) -> Self {
        Self {
            screen: CapturedImage::new(rgba),
        }
    }

    /// Load the screen image from a file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rgba = ::image::open(path)?.to_rgba8();
        log::info!(
            "Loaded {} as a {}x{} screen",
            path.display(),
            rgba.width(),
            rgba.height()
        );
        Ok(Self::new(rgba))
    }
}

impl CaptureService for StillCapture {
    fn screen_bounds(&self) -> Result<Rect> {
        Ok(self.screen.bounds())
    }

    fn capture(&mut self, rect: Rect) -> Result<CapturedImage> {
        self.screen
            .crop(rect)
            .ok_or_else(|| Error::Capture(format!("{rect:?} is outside the screen")))
    }
}
