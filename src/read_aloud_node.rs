//! Stable handle to an original content node.

use crate::dom::{Document, DomNodeId};
use crate::node_store::{ContentId, NodeStore};

/// Identity of one original content node.
///
/// Highlight rewriting replaces a text node with fragments; a handle made
/// from any of those fragments still denotes the original, so handles stay
/// equal across rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReadAloudNode(DomNodeId);

impl ReadAloudNode {
    /// Wrap a live node, folding a highlight fragment back to its original.
    pub fn resolve(store: &NodeStore, live: DomNodeId) -> Self {
        match store.ancestor(live) {
            Some(record) => Self(record.node),
            None => Self(live),
        }
    }

    /// Handle for a registered content id.
    pub fn from_content_id(store: &NodeStore, id: ContentId) -> Option<Self> {
        store.dom_node(id).map(Self)
    }

    pub(crate) fn from_original(node: DomNodeId) -> Self {
        Self(node)
    }

    /// The original node.
    pub fn dom_node(&self) -> DomNodeId {
        self.0
    }

    pub fn content_id(&self, store: &NodeStore) -> ContentId {
        store.content_id(self.0)
    }

    /// Own text of the original (empty for elements).
    pub fn text<'a>(&self, doc: &'a Document) -> &'a str {
        doc.text(self.0).unwrap_or("")
    }
}
