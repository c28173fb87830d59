//! Capture a screen region, annotate it with rectangles, arrows and text,
//! then copy the flattened result.

pub mod capture;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod export;
pub mod logging;
pub mod render;
pub mod scene;
pub mod session;

pub use error::{Error, Result};
