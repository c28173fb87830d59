//! Destinations for the composed image

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use image::RgbaImage;

use crate::error::{Error, Result};

/// Receives the flattened image. Sinks know the output format, the compositor
/// does not.
pub trait ExportSink {
    fn publish(&mut self, image: &RgbaImage) -> Result<()>;
}

/// System clipboard, as a raw RGBA image
#[derive(Default)]
pub struct ClipboardSink {
    clipboard: Option<arboard::Clipboard>,
}

impl ClipboardSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn clipboard(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.clipboard.is_none() {
            let cb = arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
            self.clipboard = Some(cb);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| Error::Clipboard("clipboard unavailable".to_string()))
    }
}

impl ExportSink for ClipboardSink {
    fn publish(&mut self, image: &RgbaImage) -> Result<()> {
        let data = arboard::ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: Cow::Borrowed(image.as_raw()),
        };
        let result = self
            .clipboard()?
            .set_image(data)
            .map_err(|e| Error::Clipboard(e.to_string()));
        if result.is_err() {
            // Reconnect on the next attempt
            self.clipboard = None;
        }
        result?;
        log::info!(
            "Copied {}x{} image to clipboard",
            image.width(),
            image.height()
        );
        Ok(())
    }
}

/// Timestamped PNG files in a directory
#[derive(Clone, Debug)]
pub struct PngFileSink {
    dir: PathBuf,
    last_path: Option<PathBuf>,
}

impl PngFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_path: None,
        }
    }

    /// The user's pictures directory, if one can be found
    pub fn in_pictures_dir() -> Option<Self> {
        dirs::picture_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
            .map(Self::new)
    }

    /// Where the most recent image was written
    pub fn last_path(&self) -> Option<&PathBuf> {
        self.last_path.as_ref()
    }

    fn img_path(&self) -> PathBuf {
        let name = chrono::Local::now()
            .format("Screenshot_%Y-%m-%d_%H-%M-%S.png")
            .to_string();
        let mut path = self.dir.join(&name);
        // Several exports within one second
        let mut n = 1;
        while path.exists() {
            path = self
                .dir
                .join(name.replace(".png", &format!("_{n}.png")));
            n += 1;
        }
        path
    }
}

impl ExportSink for PngFileSink {
    fn publish(&mut self, image: &RgbaImage) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.img_path();
        let file = File::create(&path)?;
        write_png(BufWriter::new(file), image)?;
        log::info!("Saved screenshot to {}", path.display());
        self.last_path = Some(path);
        Ok(())
    }
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}
