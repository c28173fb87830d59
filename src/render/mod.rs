//! Annotation rendering module
//!
//! This module contains:
//! - Geometry calculations shared between the live view and image rendering
//! - Image rendering using tiny-skia (for export)
//! - Text rasterization with ab_glyph and system font lookup

pub mod fonts;
pub mod geometry;
pub mod image;
pub mod text;

pub use fonts::FontBook;
pub use image::{STROKE_BORDER, flatten};
