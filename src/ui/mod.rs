//! Terminal UI components.
//!
//! This module contains all UI-related code:
//! - [`render`]: the full-frame view function (menu bar, document blocks,
//!   embedded code widgets, tooltip overlay, status line)
//! - [`status`]: footer bars (status, toasts)

mod render;
mod status;

pub use render::{render, scroll_to_focus};

/// Left padding before document content.
pub const DOCUMENT_LEFT_PADDING: u16 = 2;
