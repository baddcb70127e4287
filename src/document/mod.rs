//! Block-based reference document.
//!
//! This module handles:
//! - A flat sequence of paragraph, code block, and image nodes
//! - Char-offset position addressing with per-node boundary tokens
//! - The [`DocumentHost`] contract for embedded widget bindings
//! - Markdown round-tripping with comrak
//!
//! Every node occupies `content_len + 2` positions: an opening boundary
//! token, the content chars, and a closing token. Images have no editable
//! content, so they occupy exactly 2 positions.

pub mod markdown;

pub use markdown::{parse, serialize};

use crate::doc::{Bias, DocSelection, DocumentHost, NodeId, NodeSnapshot};
use crate::sync::{TextChange, apply_change};

/// One top-level node of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    CodeBlock { language: String, text: String },
    Image { src: String, alt: String },
}

impl Block {
    /// Number of editable content chars.
    pub fn content_len(&self) -> usize {
        match self {
            Self::Paragraph(text) | Self::CodeBlock { text, .. } => text.chars().count(),
            Self::Image { .. } => 0,
        }
    }

    /// Positions occupied, boundary tokens included.
    pub fn size(&self) -> usize {
        self.content_len() + 2
    }

    /// Node kind name, as reported in snapshots.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Paragraph(_) => "paragraph",
            Self::CodeBlock { .. } => "code_block",
            Self::Image { .. } => "image",
        }
    }

    fn text(&self) -> &str {
        match self {
            Self::Paragraph(text) | Self::CodeBlock { text, .. } => text,
            Self::Image { .. } => "",
        }
    }
}

/// A content mutation the document has applied, in document coordinates.
///
/// Consumers drain these with [`DocumentModel::take_changes`] to remap any
/// positions they track (widget bindings, decorations).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedChange {
    pub from: usize,
    pub to: usize,
    pub inserted: usize,
}

impl AppliedChange {
    /// Map a position through this change. Positions strictly inside the
    /// replaced range return `None`; everything else shifts.
    pub const fn map(&self, pos: usize) -> Option<usize> {
        if pos <= self.from {
            Some(pos)
        } else if pos >= self.to {
            Some(pos - (self.to - self.from) + self.inserted)
        } else {
            None
        }
    }

    /// Like [`map`](Self::map) but collapses deleted positions to the
    /// replacement start instead of dropping them.
    pub const fn map_clamped(&self, pos: usize) -> usize {
        match self.map(pos) {
            Some(mapped) => mapped,
            None => self.from,
        }
    }
}

/// A pending request to move focus out of a widget into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    pub pos: usize,
    pub bias: Bias,
}

#[derive(Debug, Clone)]
struct BlockEntry {
    id: NodeId,
    block: Block,
}

/// The document model: block sequence, selection, and change log.
#[derive(Debug, Clone)]
pub struct DocumentModel {
    blocks: Vec<BlockEntry>,
    selection: DocSelection,
    next_id: u64,
    changes: Vec<AppliedChange>,
    focus_request: Option<FocusRequest>,
}

impl Default for DocumentModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel {
    pub const fn new() -> Self {
        Self {
            blocks: Vec::new(),
            selection: DocSelection::caret(0),
            next_id: 1,
            changes: Vec::new(),
            focus_request: None,
        }
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = Self::new();
        for block in blocks {
            doc.push_block(block);
        }
        doc
    }

    /// Append a block, returning its stable id.
    pub fn push_block(&mut self, block: Block) -> NodeId {
        let id = self.fresh_id();
        self.blocks.push(BlockEntry { id, block });
        id
    }

    /// Insert a block after the block containing `pos` (or at the end when
    /// `pos` is past the last block). Returns the new block's id.
    pub fn insert_block_near(&mut self, pos: usize, block: Block) -> NodeId {
        let id = self.fresh_id();
        let index = match self.block_index_at(pos) {
            Some(index) => index + 1,
            None => self.blocks.len(),
        };
        self.blocks.insert(index, BlockEntry { id, block });
        id
    }

    /// Swap the block with `id` for a different one, keeping the id. Used
    /// when a node changes kind in place; bindings detect this as stale.
    pub fn replace_block(&mut self, id: NodeId, block: Block) -> bool {
        match self.blocks.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.block = block;
                true
            }
            None => false,
        }
    }

    pub fn remove_block(&mut self, id: NodeId) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|entry| entry.id != id);
        self.blocks.len() != before
    }

    /// Iterate blocks in document order with their ids.
    pub fn blocks(&self) -> impl Iterator<Item = (NodeId, &Block)> {
        self.blocks.iter().map(|entry| (entry.id, &entry.block))
    }

    pub fn block(&self, id: NodeId) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.block)
    }

    /// Ids of all code block nodes, in document order.
    pub fn code_block_ids(&self) -> Vec<NodeId> {
        self.blocks
            .iter()
            .filter(|entry| matches!(entry.block, Block::CodeBlock { .. }))
            .map(|entry| entry.id)
            .collect()
    }

    /// Id of the block whose span contains `pos`.
    pub fn block_at_pos(&self, pos: usize) -> Option<NodeId> {
        self.block_index_at(pos).map(|index| self.blocks[index].id)
    }

    /// Textual projection of a node, for widget bindings.
    pub fn snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        self.block(id).map(|block| NodeSnapshot {
            kind: block.kind().to_string(),
            text: block.text().to_string(),
            size: block.size(),
        })
    }

    /// Total positions in the document.
    pub fn len(&self) -> usize {
        self.blocks.iter().map(|entry| entry.block.size()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Drain the change log accumulated since the last call.
    pub fn take_changes(&mut self) -> Vec<AppliedChange> {
        std::mem::take(&mut self.changes)
    }

    /// Take the pending focus-out request, if a widget escaped since the
    /// last call.
    pub const fn take_focus_request(&mut self) -> Option<FocusRequest> {
        self.focus_request.take()
    }

    /// Index of the block whose span contains `pos`.
    fn block_index_at(&self, pos: usize) -> Option<usize> {
        let mut offset = 0;
        for (index, entry) in self.blocks.iter().enumerate() {
            let size = entry.block.size();
            if pos < offset + size {
                return Some(index);
            }
            offset += size;
        }
        None
    }

    fn pos_of_index(&self, index: usize) -> usize {
        self.blocks[..index]
            .iter()
            .map(|entry| entry.block.size())
            .sum()
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn map_selection(&mut self, change: AppliedChange) {
        self.selection = DocSelection {
            anchor: change.map_clamped(self.selection.anchor),
            head: change.map_clamped(self.selection.head),
        };
    }
}

impl DocumentHost for DocumentModel {
    fn node_pos(&self, node: NodeId) -> Option<usize> {
        let mut offset = 0;
        for entry in &self.blocks {
            if entry.id == node {
                return Some(offset);
            }
            offset += entry.block.size();
        }
        None
    }

    fn replace_range(&mut self, from: usize, to: usize, text: Option<&str>) {
        let Some(index) = self.block_index_at(from) else {
            tracing::warn!(from, to, "replace_range outside document, ignored");
            return;
        };
        let base = self.pos_of_index(index) + 1;
        let content_len = self.blocks[index].block.content_len();
        // A replacement must stay inside one node's content span.
        if from < base || to > base + content_len || to < from {
            tracing::warn!(from, to, base, "replace_range crosses node boundary, ignored");
            return;
        }
        let inserted = text.unwrap_or_default();
        let change = TextChange {
            from: from - base,
            to: to - base,
            text: inserted.to_string(),
        };
        match &mut self.blocks[index].block {
            Block::Paragraph(old) | Block::CodeBlock { text: old, .. } => {
                *old = apply_change(old, &change);
            }
            Block::Image { .. } => {
                tracing::warn!(from, to, "replace_range targeting an image, ignored");
                return;
            }
        }
        let applied = AppliedChange {
            from,
            to,
            inserted: inserted.chars().count(),
        };
        self.map_selection(applied);
        self.changes.push(applied);
    }

    fn selection(&self) -> DocSelection {
        self.selection
    }

    fn set_selection(&mut self, selection: DocSelection) {
        self.selection = selection;
    }

    fn focus_near(&mut self, pos: usize, bias: Bias) {
        let pos = pos.min(self.len());
        self.selection = DocSelection::caret(pos);
        self.focus_request = Some(FocusRequest { pos, bias });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentModel {
        DocumentModel::from_blocks(vec![
            Block::Paragraph("intro".to_string()),
            Block::CodeBlock {
                language: "javascript".to_string(),
                text: "let x = 1".to_string(),
            },
            Block::Paragraph("outro".to_string()),
        ])
    }

    #[test]
    fn test_node_positions_accumulate_sizes() {
        let doc = sample();
        let ids: Vec<NodeId> = doc.blocks().map(|(id, _)| id).collect();
        // "intro" occupies 7 positions, the code block 11.
        assert_eq!(doc.node_pos(ids[0]), Some(0));
        assert_eq!(doc.node_pos(ids[1]), Some(7));
        assert_eq!(doc.node_pos(ids[2]), Some(18));
        assert_eq!(doc.len(), 25);
    }

    #[test]
    fn test_image_occupies_two_positions() {
        let block = Block::Image {
            src: "a.png".to_string(),
            alt: String::new(),
        };
        assert_eq!(block.size(), 2);
        assert_eq!(block.content_len(), 0);
    }

    #[test]
    fn test_replace_range_edits_code_text() {
        let mut doc = sample();
        let code_id = doc.code_block_ids()[0];
        // Content base is 7 + 1; replace "x" (offset 4 in the text).
        doc.replace_range(12, 13, Some("y"));
        let snap = doc.snapshot(code_id).unwrap();
        assert_eq!(snap.text, "let y = 1");
        assert_eq!(
            doc.take_changes(),
            vec![AppliedChange {
                from: 12,
                to: 13,
                inserted: 1
            }]
        );
    }

    #[test]
    fn test_replace_range_none_deletes() {
        let mut doc = sample();
        doc.replace_range(1, 3, None);
        let (_, first) = doc.blocks().next().unwrap();
        assert_eq!(first, &Block::Paragraph("tro".to_string()));
    }

    #[test]
    fn test_replace_range_rejects_cross_node_span() {
        let mut doc = sample();
        // 1..8 crosses from the paragraph into the code block.
        doc.replace_range(1, 8, Some("x"));
        let (_, first) = doc.blocks().next().unwrap();
        assert_eq!(first, &Block::Paragraph("intro".to_string()));
        assert!(doc.take_changes().is_empty());
    }

    #[test]
    fn test_replace_range_rejects_image_target() {
        let mut doc = DocumentModel::from_blocks(vec![Block::Image {
            src: "a.png".to_string(),
            alt: String::new(),
        }]);
        doc.replace_range(1, 1, Some("x"));
        assert!(doc.take_changes().is_empty());
    }

    #[test]
    fn test_selection_maps_through_changes() {
        let mut doc = sample();
        doc.set_selection(DocSelection::caret(20));
        // Delete two chars in the first paragraph: later positions shift.
        doc.replace_range(1, 3, None);
        assert_eq!(doc.selection(), DocSelection::caret(18));
    }

    #[test]
    fn test_selection_inside_deletion_collapses() {
        let mut doc = sample();
        doc.set_selection(DocSelection::caret(2));
        doc.replace_range(1, 4, None);
        assert_eq!(doc.selection(), DocSelection::caret(1));
    }

    #[test]
    fn test_focus_near_clamps_and_records() {
        let mut doc = sample();
        doc.focus_near(1000, Bias::After);
        assert_eq!(doc.selection(), DocSelection::caret(25));
        assert_eq!(
            doc.take_focus_request(),
            Some(FocusRequest {
                pos: 25,
                bias: Bias::After
            })
        );
        assert_eq!(doc.take_focus_request(), None);
    }

    #[test]
    fn test_insert_block_near_lands_after_containing_block() {
        let mut doc = sample();
        let id = doc.insert_block_near(
            3,
            Block::Image {
                src: "a.png".to_string(),
                alt: String::new(),
            },
        );
        let kinds: Vec<&str> = doc.blocks().map(|(_, b)| b.kind()).collect();
        assert_eq!(kinds, vec!["paragraph", "image", "code_block", "paragraph"]);
        assert_eq!(doc.node_pos(id), Some(7));
    }

    #[test]
    fn test_replace_block_keeps_id() {
        let mut doc = sample();
        let code_id = doc.code_block_ids()[0];
        assert!(doc.replace_block(code_id, Block::Paragraph("plain".to_string())));
        assert_eq!(doc.snapshot(code_id).unwrap().kind, "paragraph");
    }

    #[test]
    fn test_applied_change_map_drops_interior() {
        let change = AppliedChange {
            from: 5,
            to: 8,
            inserted: 1,
        };
        assert_eq!(change.map(4), Some(4));
        assert_eq!(change.map(5), Some(5));
        assert_eq!(change.map(6), None);
        assert_eq!(change.map(8), Some(6));
        assert_eq!(change.map(10), Some(8));
    }
}
