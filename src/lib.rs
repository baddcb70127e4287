// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. widget::CodeWidget)
    clippy::module_name_repetitions
)]

//! # Codefence
//!
//! Live embedded code editors inside a structured terminal document.
//!
//! The core of the crate is the node ↔ widget synchronizer ([`sync`]): a
//! binding that keeps a plain-text code widget and a code node of a host
//! document textually and selection-wise consistent in both directions,
//! propagating edits as minimal diffs and escaping focus at the widget's
//! buffer boundaries. Everything else is the demo suite around it: a
//! flat-block reference document, a menu bar, a selection tooltip,
//! placeholder decorations with simulated image upload, and a markdown
//! source-view toggle.
//!
//! ## Architecture
//!
//! The demo application uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`sync`]: The node ↔ widget synchronizer and its minimal diff
//! - [`widget`]: The rope-backed embedded code widget
//! - [`doc`]: The document-host contract bindings consume
//! - [`document`]: The flat-block reference document and markdown IO
//! - [`placeholder`]: Upload placeholder decorations
//! - [`upload`]: Simulated image upload
//! - [`tooltip`]: Selection-size tooltip
//! - [`menu`]: Menu bar with enable predicates
//! - [`highlight`]: Syntax highlighting
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components

pub mod app;
pub mod doc;
pub mod document;
pub mod highlight;
pub mod menu;
pub mod placeholder;
pub mod sync;
pub mod tooltip;
pub mod ui;
pub mod upload;
pub mod widget;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::doc::{DocSelection, DocumentHost, NodeId, NodeSnapshot};
    pub use crate::sync::{CodeBlockSync, TextChange, compute_change};
    pub use crate::widget::CodeWidget;
}
