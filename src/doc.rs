//! Host document engine contract.
//!
//! The synchronizer never reaches into document internals. It sees the host
//! through [`DocumentHost`] and sees its bound node only as the textual
//! projection in [`NodeSnapshot`]. Any document engine that can resolve a
//! node position, accept a range replacement, and move its selection can
//! host an embedded code widget.
//!
//! All positions are char offsets in document coordinates. A node's content
//! starts one position after the node itself (the node's opening boundary
//! token occupies the first slot).

/// Identifier for a node tracked by a widget binding.
///
/// Node identity can shift as the document is edited elsewhere, so bindings
/// hold an id and re-resolve the position on every use rather than caching
/// an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Textual projection of a document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot {
    /// Node kind name. A binding is only valid while the kind at its
    /// tracked position stays the same.
    pub kind: String,
    /// Flat text content of the node.
    pub text: String,
    /// Total positions the node occupies, boundary tokens included.
    pub size: usize,
}

impl NodeSnapshot {
    /// Snapshot of a code block node: flat text plus two boundary tokens.
    pub fn code_block(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind: "code_block".to_string(),
            size: text.chars().count() + 2,
            text,
        }
    }
}

/// A selection in document char coordinates.
///
/// `anchor` is the fixed end, `head` the moving end; a caret has both equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocSelection {
    pub anchor: usize,
    pub head: usize,
}

impl DocSelection {
    /// A collapsed selection (caret) at `pos`.
    pub const fn caret(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Whether the selection is collapsed.
    pub const fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// The lower of the two ends.
    pub const fn from(&self) -> usize {
        if self.anchor < self.head {
            self.anchor
        } else {
            self.head
        }
    }

    /// The higher of the two ends.
    pub const fn to(&self) -> usize {
        if self.anchor > self.head {
            self.anchor
        } else {
            self.head
        }
    }
}

/// Which side of a boundary an escaping cursor should land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Before,
    After,
}

/// The contract a document engine exposes to widget bindings.
///
/// Mutations go through `replace_range` (the host's transactional API);
/// the binding never edits document state directly.
pub trait DocumentHost {
    /// Current start position of the node, or `None` when the node no
    /// longer exists. Callers treat `None` as "nothing to update".
    fn node_pos(&self, node: NodeId) -> Option<usize>;

    /// Submit a replacement of the chars in `from..to`. `None` deletes the
    /// range without inserting anything.
    fn replace_range(&mut self, from: usize, to: usize, text: Option<&str>);

    /// The host's current selection.
    fn selection(&self) -> DocSelection;

    /// Ask the host to move its selection.
    fn set_selection(&mut self, selection: DocSelection);

    /// Move focus out of the widget, landing the caret at the nearest valid
    /// position around `pos` on the `bias` side.
    fn focus_near(&mut self, pos: usize, bias: Bias);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_snapshot_size_counts_boundaries() {
        let snap = NodeSnapshot::code_block("abc");
        assert_eq!(snap.kind, "code_block");
        assert_eq!(snap.size, 5);
    }

    #[test]
    fn test_code_block_snapshot_size_is_char_based() {
        let snap = NodeSnapshot::code_block("héllo");
        assert_eq!(snap.size, 7);
    }

    #[test]
    fn test_caret_selection_is_empty() {
        assert!(DocSelection::caret(4).is_empty());
        assert!(!DocSelection { anchor: 1, head: 3 }.is_empty());
    }

    #[test]
    fn test_selection_from_to_normalize_order() {
        let sel = DocSelection { anchor: 7, head: 2 };
        assert_eq!(sel.from(), 2);
        assert_eq!(sel.to(), 7);
    }
}
