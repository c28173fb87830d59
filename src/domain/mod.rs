//! Pure domain types with minimal dependencies
//!
//! This module contains core types used throughout the application.
//! Types here carry no rendering or platform dependencies.

pub mod annotation;
pub mod geometry;
pub mod selection;

pub use annotation::*;
pub use geometry::*;
pub use selection::{Handle, handle_rects};
