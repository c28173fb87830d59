//! Capture session management module
//!
//! This module contains:
//! - Session state and the interaction state machine
//! - Message types for session interactions
//! - Overlay and toolbar layout
//! - Keyboard shortcut mapping

pub mod handlers;
pub mod layout;
pub mod messages;
pub mod shortcuts;
pub mod state;

pub use handlers::Escape;
pub use messages::Msg;
pub use state::{Mode, Phase, Session, Tool};
