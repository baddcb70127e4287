//! Node ↔ widget synchronization.
//!
//! A [`CodeBlockSync`] binds one [`CodeWidget`] to one code node inside a
//! host document, keeping buffer content and selection consistent in both
//! directions. Edits flow as minimal diffs ([`compute_change`]): widget
//! edits become host range replacements at the node's base offset, and
//! external node changes are replayed into the widget buffer.
//!
//! Two flags prevent feedback loops. `updating` is set while an incoming
//! document change is applied to the widget, so the resulting widget
//! notifications are not echoed back as document mutations. `incoming` is
//! set while a batch of widget changes is in flight, so selection activity
//! observed mid-batch is not forwarded against a half-applied buffer.
//! Suppressed notifications are dropped, not queued; the suppressed side
//! re-reads final state on its next event.
//!
//! At any quiescent point the widget buffer equals the node's text content;
//! this module is the only writer of that invariant.

mod diff;

pub use diff::{TextChange, apply_change, compute_change};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::doc::{Bias, DocSelection, DocumentHost, NodeId, NodeSnapshot};
use crate::widget::{CodeWidget, KeyOutcome};

/// Granularity of a boundary-escape check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeUnit {
    /// Escape when the cursor is on the first/last line.
    Line,
    /// Escape when the cursor is at the first/last char of that line.
    Char,
}

/// Direction of a boundary escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeDir {
    /// Toward the position before the node.
    Backward,
    /// Toward the position after the node.
    Forward,
}

/// Binding between one code node and one embedded widget.
pub struct CodeBlockSync {
    node_id: NodeId,
    /// Last node state confirmed by the host.
    node: NodeSnapshot,
    widget: CodeWidget,
    /// An incoming document → widget change is being applied.
    updating: bool,
    /// Widget changes have arrived but are not yet reconciled.
    incoming: bool,
}

impl CodeBlockSync {
    /// Create a binding for `node`, seeding the widget with its text.
    pub fn new(node_id: NodeId, node: NodeSnapshot) -> Self {
        let widget = CodeWidget::from_text(&node.text);
        Self {
            node_id,
            node,
            widget,
            updating: false,
            incoming: false,
        }
    }

    /// The tracked node's id.
    pub const fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// The last node state confirmed by the host.
    pub const fn node(&self) -> &NodeSnapshot {
        &self.node
    }

    /// The embedded widget.
    pub const fn widget(&self) -> &CodeWidget {
        &self.widget
    }

    /// Mutable widget access for host-driven cursor placement. Changes made
    /// through this are not propagated; callers follow up with
    /// [`widget_focused`](Self::widget_focused) or a key event.
    pub const fn widget_mut(&mut self) -> &mut CodeWidget {
        &mut self.widget
    }

    /// Whether an incoming document change is currently being applied.
    pub const fn is_updating(&self) -> bool {
        self.updating
    }

    // --- Widget-originated events ---

    /// Note that widget changes have started arriving and are not yet
    /// reconciled. Selection activity is suppressed until the batch is
    /// handled by [`widget_changed`](Self::widget_changed).
    pub const fn begin_widget_change(&mut self) {
        self.incoming = true;
    }

    /// The widget buffer changed by user input.
    ///
    /// Computes the minimal diff against the node's last known text and
    /// submits one host mutation for the batch, then forwards the widget
    /// selection. No-op while an incoming change is being applied.
    pub fn widget_changed(&mut self, host: &mut dyn DocumentHost) {
        if !self.updating {
            self.value_changed(host);
            self.forward_selection(host);
        }
        self.incoming = false;
    }

    /// The widget cursor or selection moved by user interaction.
    pub fn selection_activity(&mut self, host: &mut dyn DocumentHost) {
        if !self.updating && !self.incoming {
            self.forward_selection(host);
        }
    }

    /// The widget acquired input focus.
    pub fn widget_focused(&mut self, host: &mut dyn DocumentHost) {
        self.widget.focus();
        self.forward_selection(host);
    }

    // --- Document-originated events ---

    /// The host reports new state for the tracked node.
    ///
    /// Returns `false` when the node kind no longer matches — the binding
    /// is stale and the host must tear it down and rebind; no text merge is
    /// attempted across structurally incompatible nodes. Otherwise the
    /// widget buffer is patched with the minimal diff while suppressing
    /// outgoing propagation.
    pub fn update_node(&mut self, node: NodeSnapshot) -> bool {
        if node.kind != self.node.kind {
            tracing::debug!(
                node = self.node_id.0,
                old_kind = %self.node.kind,
                new_kind = %node.kind,
                "stale binding: node kind changed"
            );
            return false;
        }
        self.node = node;
        if let Some(change) = compute_change(&self.widget.text(), &self.node.text) {
            self.updating = true;
            self.widget
                .replace_range(change.from, change.to, &change.text);
            self.updating = false;
        }
        true
    }

    /// Host-driven selection: move the widget selection to the given
    /// document-relative offsets and take focus.
    ///
    /// Widget notifications raised while applying are suppressed.
    pub fn set_selection(&mut self, host: &dyn DocumentHost, anchor: usize, head: usize) {
        let Some(base) = self.base_offset(host) else {
            return;
        };
        self.widget.focus();
        self.updating = true;
        self.widget
            .set_selection(anchor.saturating_sub(base), head.saturating_sub(base));
        self.updating = false;
    }

    // --- Keymap ---

    /// Offer a key to the binding.
    ///
    /// Boundary-crossing arrows are checked first
    /// ([`maybe_escape`](Self::maybe_escape)); declined keys fall through to the widget's
    /// default keymap, and the resulting widget notices are reconciled into
    /// host mutations and selection updates.
    pub fn handle_key(&mut self, host: &mut dyn DocumentHost, key: &KeyEvent) -> KeyOutcome {
        if key.modifiers.is_empty() {
            let escape = match key.code {
                KeyCode::Up => Some((EscapeUnit::Line, EscapeDir::Backward)),
                KeyCode::Down => Some((EscapeUnit::Line, EscapeDir::Forward)),
                KeyCode::Left => Some((EscapeUnit::Char, EscapeDir::Backward)),
                KeyCode::Right => Some((EscapeUnit::Char, EscapeDir::Forward)),
                _ => None,
            };
            if let Some((unit, dir)) = escape
                && self.maybe_escape(host, unit, dir) == KeyOutcome::Handled
            {
                return KeyOutcome::Handled;
            }
        }

        // Ctrl+Enter exits the code block downward, like closing the block.
        if key.code == KeyCode::Enter && key.modifiers.contains(KeyModifiers::CONTROL) {
            if let Some(pos) = host.node_pos(self.node_id) {
                self.widget.blur();
                host.focus_near(pos + self.node.size, Bias::After);
                return KeyOutcome::Handled;
            }
            return KeyOutcome::Pass;
        }

        let (outcome, notice) = self.widget.handle_key(key);
        if notice.buffer_changed {
            self.begin_widget_change();
            self.widget_changed(host);
        } else if notice.selection_moved {
            self.selection_activity(host);
        }
        outcome
    }

    /// Escape the widget at a buffer boundary.
    ///
    /// Handles the key only when there is no active selection and the
    /// cursor already sits at the boundary for `unit` in `dir`: first/last
    /// line for [`EscapeUnit::Line`], additionally first/last char of that
    /// line for [`EscapeUnit::Char`]. Focus then moves to the document at
    /// the position just before or after the node.
    pub fn maybe_escape(
        &mut self,
        host: &mut dyn DocumentHost,
        unit: EscapeUnit,
        dir: EscapeDir,
    ) -> KeyOutcome {
        if self.widget.has_selection() {
            return KeyOutcome::Pass;
        }
        let cursor = self.widget.cursor();
        let boundary_line = match dir {
            EscapeDir::Backward => 0,
            EscapeDir::Forward => self.widget.line_count() - 1,
        };
        if cursor.line != boundary_line {
            return KeyOutcome::Pass;
        }
        if unit == EscapeUnit::Char {
            let boundary_col = match dir {
                EscapeDir::Backward => 0,
                EscapeDir::Forward => self.widget.line_len(cursor.line),
            };
            if cursor.col != boundary_col {
                return KeyOutcome::Pass;
            }
        }

        let Some(pos) = host.node_pos(self.node_id) else {
            return KeyOutcome::Pass;
        };
        let (target, bias) = match dir {
            EscapeDir::Backward => (pos, Bias::Before),
            EscapeDir::Forward => (pos + self.node.size, Bias::After),
        };
        self.widget.blur();
        host.focus_near(target, bias);
        KeyOutcome::Handled
    }

    // --- Internals ---

    /// Document offset of the node's first content char, or `None` when
    /// the node cannot be resolved.
    fn base_offset(&self, host: &dyn DocumentHost) -> Option<usize> {
        // Content starts one past the node's opening boundary token.
        host.node_pos(self.node_id).map(|pos| pos + 1)
    }

    /// Push the widget buffer's divergence from the node into the host as
    /// a single range replacement.
    fn value_changed(&mut self, host: &mut dyn DocumentHost) {
        let widget_text = self.widget.text();
        let Some(change) = compute_change(&self.node.text, &widget_text) else {
            return;
        };
        let Some(base) = self.base_offset(host) else {
            tracing::debug!(node = self.node_id.0, "dropping edit: node position gone");
            return;
        };
        let text = (!change.text.is_empty()).then_some(change.text.as_str());
        host.replace_range(base + change.from, base + change.to, text);
    }

    /// Mirror the widget selection into the host, if it differs.
    fn forward_selection(&mut self, host: &mut dyn DocumentHost) {
        if !self.widget.has_focus() {
            return;
        }
        let Some(base) = self.base_offset(host) else {
            return;
        };
        let (anchor, head) = self.widget.selection();
        let selection = DocSelection {
            anchor: anchor + base,
            head: head + base,
        };
        if selection != host.selection() {
            host.set_selection(selection);
        }
    }
}

impl std::fmt::Debug for CodeBlockSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeBlockSync")
            .field("node_id", &self.node_id)
            .field("kind", &self.node.kind)
            .field("updating", &self.updating)
            .field("incoming", &self.incoming)
            .finish_non_exhaustive()
    }
}
