//! Core application module
//!
//! This module contains:
//! - The application shell that routes messages to the session
//! - The control queue feeding it from other threads

pub mod app;
pub mod control;

pub use app::{App, Notice, NoticeLevel};
pub use control::Control;
