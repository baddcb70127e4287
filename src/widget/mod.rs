//! Embedded plain-text code widget.
//!
//! A rope-backed editing surface designed to live inside a node of a larger
//! structured document. The widget knows nothing about the outer document;
//! it reports what its operations did via [`WidgetNotice`] and lets callers
//! decline keys back to the host via [`KeyOutcome`].

mod buffer;

pub use buffer::{CodeWidget, Cursor, Direction, KeyOutcome, WidgetNotice};
