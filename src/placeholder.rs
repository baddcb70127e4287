//! Placeholder decorations for in-flight uploads.
//!
//! A placeholder marks a document position where an image will land once
//! its upload resolves. Placeholders are not document content: they live
//! beside the document and are remapped through every applied edit, the
//! way inline decorations track positions in a rich-text view. A
//! placeholder whose position is deleted drops out of the set.

use crate::document::AppliedChange;

/// Identifier for one pending placeholder decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceholderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub id: PlaceholderId,
    pub pos: usize,
}

/// The set of live placeholder decorations.
#[derive(Debug, Default)]
pub struct PlaceholderSet {
    items: Vec<Placeholder>,
    next_id: u64,
}

impl PlaceholderSet {
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Place a new decoration at `pos`, returning its id.
    pub fn add(&mut self, pos: usize) -> PlaceholderId {
        let id = PlaceholderId(self.next_id);
        self.next_id += 1;
        self.items.push(Placeholder { id, pos });
        id
    }

    /// Remove the decoration with `id`. Returns false when it is already
    /// gone (mapped away by a deletion).
    pub fn remove(&mut self, id: PlaceholderId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Current position of the decoration, or `None` when it dropped out.
    pub fn find(&self, id: PlaceholderId) -> Option<usize> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.pos)
    }

    /// Remap all decorations through an applied document edit. Decorations
    /// strictly inside the replaced range are removed.
    pub fn map_through(&mut self, change: &AppliedChange) {
        self.items.retain_mut(|item| match change.map(item.pos) {
            Some(pos) => {
                item.pos = pos;
                true
            }
            None => {
                tracing::debug!(id = item.id.0, "placeholder deleted by edit");
                false
            }
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placeholder> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
