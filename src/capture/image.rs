//! Captured screen image

use image::RgbaImage;

use crate::domain::Rect;

/// A captured screen region; immutable once taken
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedImage {
    pub rgba: RgbaImage,
}

impl CapturedImage {
    pub fn new(rgba: RgbaImage) -> Self {
        log::debug!(
            "CapturedImage captured: {}x{} pixels",
            rgba.width(),
            rgba.height()
        );
        Self { rgba }
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Rectangle covering the whole image
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }

    /// Copy of the part of the image inside `rect`, clipped to the image
    pub fn crop(&self, rect: Rect) -> Option<CapturedImage> {
        let r = rect.intersect(self.bounds())?;
        let view = image::imageops::crop_imm(
            &self.rgba,
            r.left as u32,
            r.top as u32,
            r.width() as u32,
            r.height() as u32,
        );
        Some(CapturedImage {
            rgba: view.to_image(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_clips_to_image() {
        let img = CapturedImage::new(RgbaImage::from_fn(10, 8, |x, y| {
            image::Rgba([x as u8, y as u8, 0, 255])
        }));
        let crop = img.crop(Rect::new(6, 4, 20, 20)).unwrap();
        assert_eq!((crop.width(), crop.height()), (4, 4));
        assert_eq!(crop.rgba.get_pixel(0, 0).0, [6, 4, 0, 255]);
        assert!(img.crop(Rect::new(10, 0, 12, 5)).is_none());
    }
}
