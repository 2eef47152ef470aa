//! Registry of content ids and highlight fragments.
//!
//! The store answers two questions about any live DOM node: which content id
//! it carries, and, for text produced by highlight rewriting, which original
//! node it came from and where in that node it starts.

use std::collections::HashMap;

use crate::dom::DomNodeId;

/// Integer id of a node in the content tree.
pub type ContentId = i32;

/// Sentinel for an unknown or unresolved id (and offset).
pub const INVALID_ID: ContentId = -1;

/// Where a highlight fragment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AncestorRecord {
    /// The original text node the fragment was cut from.
    pub node: DomNodeId,
    /// Char offset in the original where the fragment starts.
    pub offset: usize,
}

/// Id <-> node registry plus the fragment side table.
#[derive(Debug, Default)]
pub struct NodeStore {
    ids: HashMap<DomNodeId, ContentId>,
    nodes: HashMap<ContentId, DomNodeId>,
    ancestors: HashMap<DomNodeId, AncestorRecord>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node under a content id, replacing any previous mapping
    /// for either side.
    pub fn register(&mut self, node: DomNodeId, id: ContentId) {
        if let Some(old_id) = self.ids.insert(node, id)
            && old_id != id
        {
            self.nodes.remove(&old_id);
        }
        if let Some(old_node) = self.nodes.insert(id, node)
            && old_node != node
        {
            self.ids.remove(&old_node);
        }
    }

    /// Forget a node's id mapping.
    pub fn unregister(&mut self, node: DomNodeId) {
        if let Some(id) = self.ids.remove(&node) {
            self.nodes.remove(&id);
        }
    }

    /// Content id of a node, or [`INVALID_ID`].
    pub fn content_id(&self, node: DomNodeId) -> ContentId {
        self.ids.get(&node).copied().unwrap_or(INVALID_ID)
    }

    pub fn is_registered(&self, node: DomNodeId) -> bool {
        self.ids.contains_key(&node)
    }

    pub fn dom_node(&self, id: ContentId) -> Option<DomNodeId> {
        self.nodes.get(&id).copied()
    }

    /// Number of registered content nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_ancestor(&mut self, fragment: DomNodeId, record: AncestorRecord) {
        self.ancestors.insert(fragment, record);
    }

    pub fn ancestor(&self, fragment: DomNodeId) -> Option<AncestorRecord> {
        self.ancestors.get(&fragment).copied()
    }

    pub fn remove_ancestor(&mut self, fragment: DomNodeId) {
        self.ancestors.remove(&fragment);
    }

    /// Fragments cut from `original`, ordered by their offset.
    pub fn fragments_of(&self, original: DomNodeId) -> Vec<(DomNodeId, usize)> {
        let mut fragments: Vec<_> = self
            .ancestors
            .iter()
            .filter(|(_, record)| record.node == original)
            .map(|(&fragment, record)| (fragment, record.offset))
            .collect();
        fragments.sort_by_key(|&(fragment, offset)| (offset, fragment));
        fragments
    }

    pub fn clear_ancestors(&mut self) {
        self.ancestors.clear();
    }

    /// Forget everything (content tree rebuilt).
    pub fn clear(&mut self) {
        self.ids.clear();
        self.nodes.clear();
        self.ancestors.clear();
    }
}
