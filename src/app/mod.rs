//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! IO (saving, starting uploads) runs in a separate effects pass after
//! each update, and upload deadlines are polled by the loop itself.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use input::handle_event;
pub use model::{Focus, Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: Option<PathBuf>,
    image_path: Option<PathBuf>,
}

impl App {
    /// Create a new application, optionally backed by a markdown file.
    pub const fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            file_path,
            image_path: None,
        }
    }

    /// Set the image the Insert image command uploads.
    pub fn with_image(mut self, image_path: Option<PathBuf>) -> Self {
        self.image_path = image_path;
        self
    }
}
