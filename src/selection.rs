//! Selection reconciler.
//!
//! The live selection points into the rewritten DOM, where highlight
//! fragments stand in for original text nodes. Reported selections use
//! content ids and offsets into the original text. This module maps
//! between the two, always reading the node store's current fragment
//! records.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::dom::{Document, DomNodeId};
use crate::node_store::{ContentId, INVALID_ID, NodeStore};
use crate::util::{byte_to_char, char_len};

/// A selection in the live DOM. Offsets are chars into text nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomSelection {
    pub anchor_node: DomNodeId,
    pub anchor_offset: usize,
    pub focus_node: DomNodeId,
    pub focus_offset: usize,
}

impl DomSelection {
    pub fn collapsed(node: DomNodeId, offset: usize) -> Self {
        Self {
            anchor_node: node,
            anchor_offset: offset,
            focus_node: node,
            focus_offset: offset,
        }
    }
}

/// A selection in content-id space; `-1` marks an endpoint that could not
/// be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedSelection {
    pub anchor_id: ContentId,
    pub anchor_offset: i32,
    pub focus_id: ContentId,
    pub focus_offset: i32,
}

impl ReportedSelection {
    pub const NONE: ReportedSelection = ReportedSelection {
        anchor_id: INVALID_ID,
        anchor_offset: -1,
        focus_id: INVALID_ID,
        focus_offset: -1,
    };

    pub fn new(anchor_id: ContentId, anchor_offset: i32, focus_id: ContentId, focus_offset: i32) -> Self {
        Self {
            anchor_id,
            anchor_offset,
            focus_id,
            focus_offset,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.anchor_id != INVALID_ID && self.focus_id != INVALID_ID
    }
}

impl Default for ReportedSelection {
    fn default() -> Self {
        Self::NONE
    }
}

/// Context for an offset: it counts from the start of `prefix` within
/// `prefix + text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAnchor {
    pub prefix: String,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct SelectionController {
    live: Option<DomSelection>,
    reported: Option<ReportedSelection>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live selection changed; returns it in content-id space.
    pub fn on_selection_change(
        &mut self,
        store: &NodeStore,
        selection: Option<DomSelection>,
    ) -> ReportedSelection {
        self.live = selection;
        let Some(selection) = selection else {
            self.reported = None;
            return ReportedSelection::NONE;
        };

        let (anchor_id, anchor_offset) =
            report_endpoint(store, selection.anchor_node, selection.anchor_offset);
        let (focus_id, focus_offset) =
            report_endpoint(store, selection.focus_node, selection.focus_offset);
        let reported = ReportedSelection::new(anchor_id, anchor_offset, focus_id, focus_offset);
        self.reported = Some(reported);
        reported
    }

    pub fn has_selection(&self) -> bool {
        self.live.is_some()
    }

    pub fn dom_selection(&self) -> Option<&DomSelection> {
        self.live.as_ref()
    }

    pub fn reported_selection(&self) -> Option<&ReportedSelection> {
        self.reported.as_ref()
    }

    /// The endpoint that comes first in document order.
    pub fn current_selection_start(&self, doc: &Document) -> Option<(DomNodeId, usize)> {
        let sel = self.live?;
        let anchor = (sel.anchor_node, sel.anchor_offset);
        let focus = (sel.focus_node, sel.focus_offset);
        let ordering = match doc.compare_document_position(sel.anchor_node, sel.focus_node) {
            Ordering::Equal => sel.anchor_offset.cmp(&sel.focus_offset),
            other => other,
        };
        Some(if ordering == Ordering::Greater {
            focus
        } else {
            anchor
        })
    }

    /// Select the live equivalent of `target` under `root`.
    ///
    /// Returns the new live selection, or `None` (leaving the previous one
    /// in place) when either endpoint cannot be resolved.
    pub fn update_selection(
        &mut self,
        doc: &Document,
        store: &NodeStore,
        root: DomNodeId,
        target: &ReportedSelection,
        hint: Option<&TextAnchor>,
    ) -> Option<&DomSelection> {
        let anchor = resolve_endpoint(doc, store, root, target.anchor_id, target.anchor_offset, hint);
        let focus = resolve_endpoint(doc, store, root, target.focus_id, target.focus_offset, hint);
        let (Some((anchor_node, anchor_offset)), Some((focus_node, focus_offset))) = (anchor, focus)
        else {
            log::debug!("selection {target:?} not resolvable; keeping current selection");
            return None;
        };

        self.live = Some(DomSelection {
            anchor_node,
            anchor_offset,
            focus_node,
            focus_offset,
        });
        self.reported = Some(*target);
        self.live.as_ref()
    }

    pub fn clear(&mut self) {
        self.live = None;
        self.reported = None;
    }
}

fn report_endpoint(store: &NodeStore, node: DomNodeId, offset: usize) -> (ContentId, i32) {
    let (id, offset) = if store.is_registered(node) {
        (store.content_id(node), offset)
    } else if let Some(record) = store.ancestor(node) {
        (store.content_id(record.node), record.offset + offset)
    } else {
        return (INVALID_ID, -1);
    };
    match i32::try_from(offset) {
        Ok(offset) if id != INVALID_ID => (id, offset),
        _ => (INVALID_ID, -1),
    }
}

fn resolve_endpoint(
    doc: &Document,
    store: &NodeStore,
    root: DomNodeId,
    id: ContentId,
    offset: i32,
    hint: Option<&TextAnchor>,
) -> Option<(DomNodeId, usize)> {
    let original = store.dom_node(id)?;
    let offset = usize::try_from(offset).ok()?;

    let resolved = if doc.is_text(original) {
        let text = doc.text(original).unwrap_or("");
        let offset = hint.map_or(offset, |hint| anchored_offset(text, hint, offset));
        resolve_text(doc, store, original, offset)?
    } else {
        let text = doc.text_content(original);
        let offset = hint.map_or(offset, |hint| anchored_offset(&text, hint, offset));
        resolve_container(doc, original, offset)?
    };

    doc.contains(root, resolved.0).then_some(resolved)
}

/// Offset into `text` for an offset measured from the start of the hint's
/// prefix. Falls back to the first occurrence of the bare text, then to the
/// offset as given.
fn anchored_offset(text: &str, hint: &TextAnchor, offset: usize) -> usize {
    let full = format!("{}{}", hint.prefix, hint.text);
    if !full.is_empty()
        && let Some(at) = text.find(&full)
    {
        return byte_to_char(text, at) + offset;
    }
    if !hint.text.is_empty()
        && let Some(at) = text.find(&hint.text)
    {
        return (byte_to_char(text, at) + offset).saturating_sub(char_len(&hint.prefix));
    }
    offset
}

/// A text node's offset: the node itself while it is in the tree, or the
/// highlight fragment covering the offset while it is rewritten.
fn resolve_text(
    doc: &Document,
    store: &NodeStore,
    original: DomNodeId,
    offset: usize,
) -> Option<(DomNodeId, usize)> {
    if offset > char_len(doc.text(original)?) {
        return None;
    }
    if doc.parent(original).is_some() {
        return Some((original, offset));
    }
    store
        .fragments_of(original)
        .into_iter()
        .find(|&(fragment, start)| {
            let len = doc.text(fragment).map_or(0, char_len);
            doc.parent(fragment).is_some() && offset >= start && offset <= start + len
        })
        .map(|(fragment, start)| (fragment, offset - start))
}

/// Walk a container's live text in document order until `offset` lands.
fn resolve_container(
    doc: &Document,
    container: DomNodeId,
    offset: usize,
) -> Option<(DomNodeId, usize)> {
    let mut consumed = 0;
    for leaf in doc.text_leaves(container) {
        let len = doc.text(leaf).map_or(0, char_len);
        if offset <= consumed + len {
            return Some((leaf, offset - consumed));
        }
        consumed += len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentTree;
    use crate::node_store::AncestorRecord;

    fn tree(html: &str) -> (ContentTree, NodeStore) {
        let mut store = NodeStore::new();
        let tree = ContentTree::parse(html, &mut store).unwrap();
        (tree, store)
    }

    #[test]
    fn test_reports_registered_nodes_as_is() {
        let (tree, store) = tree("<p>Hello there</p>");
        let p = tree.document().find_by_tag("p").unwrap();
        let text = tree.document().text_leaves(p)[0];

        let mut controller = SelectionController::new();
        let reported = controller.on_selection_change(
            &store,
            Some(DomSelection {
                anchor_node: text,
                anchor_offset: 2,
                focus_node: text,
                focus_offset: 5,
            }),
        );
        assert_eq!(reported, ReportedSelection::new(2, 2, 2, 5));
        assert!(controller.has_selection());
    }

    #[test]
    fn test_fragment_offsets_are_shifted() {
        let (mut tree, mut store) = tree("<p>Hello there</p>");
        let p = tree.document().find_by_tag("p").unwrap();
        let original = tree.document().text_leaves(p)[0];
        let fragment = tree.document_mut().create_text("there");
        store.set_ancestor(
            fragment,
            AncestorRecord {
                node: original,
                offset: 6,
            },
        );

        let mut controller = SelectionController::new();
        let reported =
            controller.on_selection_change(&store, Some(DomSelection::collapsed(fragment, 3)));
        assert_eq!(reported, ReportedSelection::new(2, 9, 2, 9));
    }

    #[test]
    fn test_unknown_nodes_report_sentinel() {
        let (mut tree, store) = tree("<p>Hello</p>");
        let stray = tree.document_mut().create_text("stray");

        let mut controller = SelectionController::new();
        let reported =
            controller.on_selection_change(&store, Some(DomSelection::collapsed(stray, 1)));
        assert_eq!(reported, ReportedSelection::NONE);
        assert_eq!(
            controller.on_selection_change(&store, None),
            ReportedSelection::NONE
        );
        assert!(!controller.has_selection());
    }

    #[test]
    fn test_selection_start_handles_backward_selection() {
        let (tree, store) = tree("<p>One</p><p>Two</p>");
        let doc = tree.document();
        let leaves = doc.text_leaves(tree.root());

        let mut controller = SelectionController::new();
        controller.on_selection_change(
            &store,
            Some(DomSelection {
                anchor_node: leaves[1],
                anchor_offset: 1,
                focus_node: leaves[0],
                focus_offset: 2,
            }),
        );
        assert_eq!(controller.current_selection_start(doc), Some((leaves[0], 2)));

        controller.on_selection_change(
            &store,
            Some(DomSelection {
                anchor_node: leaves[0],
                anchor_offset: 3,
                focus_node: leaves[0],
                focus_offset: 1,
            }),
        );
        assert_eq!(controller.current_selection_start(doc), Some((leaves[0], 1)));
    }

    #[test]
    fn test_anchored_offset() {
        let hint = TextAnchor {
            prefix: "b ".to_string(),
            text: "cat".to_string(),
        };
        // "cat" first appears at 2, but "b cat" starts at 10.
        assert_eq!(anchored_offset("a cat and b cat", &hint, 3), 13);

        let hint = TextAnchor {
            prefix: "x ".to_string(),
            text: "cat".to_string(),
        };
        assert_eq!(anchored_offset("a cat", &hint, 3), 3);
        assert_eq!(anchored_offset("no match", &hint, 4), 4);
    }

    #[test]
    fn test_out_of_range_keeps_selection() {
        let (tree, store) = tree("<p>Hello</p>");
        let doc = tree.document();
        let text = doc.text_leaves(tree.root())[0];

        let mut controller = SelectionController::new();
        controller.on_selection_change(&store, Some(DomSelection::collapsed(text, 1)));

        let target = ReportedSelection::new(2, 0, 2, 40);
        assert!(
            controller
                .update_selection(doc, &store, tree.root(), &target, None)
                .is_none()
        );
        assert_eq!(
            controller.dom_selection(),
            Some(&DomSelection::collapsed(text, 1))
        );

        let target = ReportedSelection::new(99, 0, 2, 1);
        assert!(
            controller
                .update_selection(doc, &store, tree.root(), &target, None)
                .is_none()
        );
    }

    #[test]
    fn test_reported_selection_json_shape() {
        let json = serde_json::to_string(&ReportedSelection::new(3, 1, 4, 7)).unwrap();
        assert_eq!(
            json,
            r#"{"anchorId":3,"anchorOffset":1,"focusId":4,"focusOffset":7}"#
        );
    }
}
