use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::doc::{Bias, DocSelection, DocumentHost, NodeId};
use crate::document::{Block, DocumentModel};
use crate::menu::{MenuBar, MenuContext};
use crate::placeholder::{PlaceholderId, PlaceholderSet};
use crate::sync::CodeBlockSync;
use crate::upload::PendingUpload;
use crate::widget::CodeWidget;

/// Where keyboard input goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Block-level navigation in the rich document view.
    Document,
    /// An embedded code widget owns input.
    Code(NodeId),
    /// The raw markdown source widget owns input.
    Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// The hosted document
    pub document: DocumentModel,
    /// One live binding per code block, keyed by node id
    pub syncs: HashMap<NodeId, CodeBlockSync>,
    /// Current input focus
    pub focus: Focus,
    /// Block highlighted by document-level navigation
    pub selected: Option<NodeId>,
    /// Menu bar state
    pub menu: MenuBar,
    /// Live placeholder decorations for in-flight uploads
    pub placeholders: PlaceholderSet,
    /// Uploads waiting on their simulated deadline
    pub uploads: Vec<PendingUpload>,
    /// Raw markdown widget, present while the source view is active
    pub source_widget: Option<CodeWidget>,
    /// Save target, when the document came from a file
    pub file_path: Option<PathBuf>,
    /// Image the Insert image command uploads
    pub image_path: Option<PathBuf>,
    /// The document changed since the last save
    pub dirty: bool,
    /// Placeholder waiting for an upload to be started by the effects pass
    pub(super) upload_request: Option<PlaceholderId>,
    toast: Option<Toast>,
    /// First visible content row
    pub scroll: usize,
    /// Whether the app should quit
    pub should_quit: bool,
    pub terminal_size: (u16, u16),
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("focus", &self.focus)
            .field("selected", &self.selected)
            .field("dirty", &self.dirty)
            .field("source_mode", &self.source_widget.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(DocumentModel::new(), (80, 24))
    }
}

impl Model {
    /// Create a model hosting `document`, with bindings for every code
    /// block and the first block selected.
    pub fn new(document: DocumentModel, terminal_size: (u16, u16)) -> Self {
        let selected = document.blocks().next().map(|(id, _)| id);
        let mut model = Self {
            document,
            syncs: HashMap::new(),
            focus: Focus::Document,
            selected,
            menu: MenuBar::standard(),
            placeholders: PlaceholderSet::new(),
            uploads: Vec::new(),
            source_widget: None,
            file_path: None,
            image_path: None,
            dirty: false,
            upload_request: None,
            toast: None,
            scroll: 0,
            should_quit: false,
            terminal_size,
        };
        model.reconcile();
        model
    }

    pub const fn source_mode(&self) -> bool {
        self.source_widget.is_some()
    }

    /// State slice the menu predicates evaluate against.
    pub fn menu_context(&self) -> MenuContext {
        MenuContext {
            source_mode: self.source_mode(),
            editing_code: matches!(self.focus, Focus::Code(_)),
            dirty: self.dirty,
            can_save: self.file_path.is_some(),
        }
    }

    /// Bring derived state back in line with the document.
    ///
    /// Drains the document's change log into the placeholder set, refreshes
    /// every code block binding (recreating stale ones), and applies any
    /// pending focus-out request from an escaped widget.
    pub fn reconcile(&mut self) {
        let changes = self.document.take_changes();
        if !changes.is_empty() {
            self.dirty = true;
        }
        for change in &changes {
            self.placeholders.map_through(change);
        }

        let ids = self.document.code_block_ids();
        self.syncs.retain(|id, _| ids.contains(id));
        for id in ids {
            let Some(snapshot) = self.document.snapshot(id) else {
                continue;
            };
            match self.syncs.get_mut(&id) {
                Some(sync) => {
                    if !sync.update_node(snapshot.clone()) {
                        self.syncs.insert(id, CodeBlockSync::new(id, snapshot));
                    }
                }
                None => {
                    self.syncs.insert(id, CodeBlockSync::new(id, snapshot));
                }
            }
        }
        // A node that stopped being a code block loses its binding above;
        // pull focus back to the document if it was inside one.
        if let Focus::Code(id) = self.focus
            && !self.syncs.contains_key(&id)
        {
            self.focus = Focus::Document;
            self.selected = self.document.block_at_pos(self.document.selection().head);
        }

        if let Some(request) = self.document.take_focus_request() {
            self.focus = Focus::Document;
            self.selected = match request.bias {
                Bias::Before => self
                    .document
                    .block_at_pos(request.pos.saturating_sub(1))
                    .or_else(|| self.document.blocks().next().map(|(id, _)| id)),
                Bias::After => self
                    .document
                    .block_at_pos(request.pos)
                    .or_else(|| self.document.blocks().last().map(|(id, _)| id)),
            };
        }
    }

    /// Ids of all blocks in document order.
    pub fn block_ids(&self) -> Vec<NodeId> {
        self.document.blocks().map(|(id, _)| id).collect()
    }

    /// Index of the selected block among all blocks.
    pub fn selected_index(&self) -> Option<usize> {
        let selected = self.selected?;
        self.document.blocks().position(|(id, _)| id == selected)
    }

    /// Move document-level selection to `id`, placing the caret at the
    /// block's content start.
    pub fn select_block(&mut self, id: NodeId) {
        self.selected = Some(id);
        if let Some(pos) = self.document.node_pos(id) {
            self.document.set_selection(DocSelection::caret(pos + 1));
        }
    }

    /// Whether the selected block is a code block, and its id.
    pub fn selected_code_block(&self) -> Option<NodeId> {
        let id = self.selected?;
        matches!(self.document.block(id)?, Block::CodeBlock { .. }).then_some(id)
    }

    /// Document position where an inserted image placeholder belongs: the
    /// last position inside the selected block, so edits deleting the block
    /// take the placeholder with it.
    pub fn insertion_pos(&self) -> usize {
        self.selected
            .and_then(|id| {
                let pos = self.document.node_pos(id)?;
                let size = self.document.block(id)?.size();
                Some(pos + size - 1)
            })
            .unwrap_or_else(|| self.document.len().saturating_sub(1))
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}
