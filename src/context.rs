//! Shared state passed to every engine component.

use crate::node_store::NodeStore;
use crate::word_boundaries::WordBoundaries;

/// Node registry and boundary state for one engine instance.
#[derive(Debug, Default)]
pub struct SegmentationContext {
    pub node_store: NodeStore,
    pub word_boundaries: WordBoundaries,
}

impl SegmentationContext {
    pub fn new() -> Self {
        Self::default()
    }
}
