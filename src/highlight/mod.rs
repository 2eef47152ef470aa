//! Highlight renderer.
//!
//! Highlights are drawn by rewriting text nodes in place. An original text
//! node is replaced by up to three sibling runs: a previous run wrapped in
//! `<span class="previous-read-highlight">`, a current run wrapped in
//! `<span class="current-read-highlight">`, and a plain run. The original
//! is detached, not destroyed, and comes back when its decoration goes.
//! Every fragment is recorded in the [`NodeStore`] so selections and the
//! segmentation model can map it back to the original.

mod granularity;
mod scroll;
mod variant;

pub use granularity::MovementGranularity;
pub use scroll::{Layout, Rect, Viewport};
pub use variant::{
    Decoration, Highlight, HighlightKind, HighlightState, is_invalid_highlight_for_word_highlighting,
};

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::Granularity;
use crate::context::SegmentationContext;
use crate::dom::{Attribute, Document, DomNodeId};
use crate::node_store::{AncestorRecord, NodeStore};
use crate::segmentation::ReadAloudModel;
use crate::util::{char_len, char_slice};

pub const PREVIOUS_HIGHLIGHT_CLASS: &str = "previous-read-highlight";
pub const CURRENT_HIGHLIGHT_CLASS: &str = "current-read-highlight";

/// Live rewrite of one original text node.
#[derive(Debug, Clone)]
struct Rendered {
    decoration: Decoration,
    /// Top-level nodes inserted in place of the original.
    tops: Vec<DomNodeId>,
    /// Text runs recorded in the node store.
    fragments: Vec<DomNodeId>,
    current_span: Option<DomNodeId>,
}

/// Draws and undoes read-aloud highlights.
#[derive(Debug, Default)]
pub struct Highlighter {
    granularity: Granularity,
    active: MovementGranularity,
    /// Read extent of every original touched by a finished unit.
    read: HashMap<DomNodeId, usize>,
    /// Originals whose read extent changed since the last render.
    dirty: HashSet<DomNodeId>,
    /// Originals the active highlights styled at the last render.
    active_nodes: HashSet<DomNodeId>,
    rendered: HashMap<DomNodeId, Rendered>,
}

impl Highlighter {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            ..Self::default()
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Change granularity; takes effect at the next highlight.
    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
    }

    /// Highlight the model's current unit.
    ///
    /// Sentence granularity (or word and phrase granularity on a voice
    /// without boundary events) highlights the whole unit; with
    /// `update_sentence_highlight` an existing sentence highlight is
    /// replaced. Otherwise the word or phrase at the last boundary is
    /// highlighted, sized by the engine's reported length when it gave one.
    pub fn highlight_current_granularity(
        &mut self,
        doc: &mut Document,
        ctx: &mut SegmentationContext,
        model: &ReadAloudModel,
        update_sentence_highlight: bool,
    ) {
        if self.granularity == Granularity::Off || model.current_unit_range().is_none() {
            return;
        }

        let words = matches!(self.granularity, Granularity::Word | Granularity::Phrase)
            && ctx.word_boundaries.has_boundaries();

        if update_sentence_highlight || !self.active.has_sentence() {
            if update_sentence_highlight {
                self.move_active_to_history();
            }
            let sentence = Highlight::new(
                HighlightKind::Sentence,
                model.current_text_segments(),
                doc,
            );
            self.active.add(sentence);
        }

        if words {
            self.add_word_highlight(doc, ctx, model);
        }

        self.render(doc, &mut ctx.node_store);
    }

    fn add_word_highlight(
        &mut self,
        doc: &Document,
        ctx: &SegmentationContext,
        model: &ReadAloudModel,
    ) {
        let index = ctx.word_boundaries.current_index();
        let unit_len = model.current_unit_len();
        if index >= unit_len {
            log::warn!("ignoring boundary at {index}: unit has {unit_len} chars");
            return;
        }

        let phrase = self.granularity == Granularity::Phrase;
        let range = match ctx.word_boundaries.reported_length() {
            Some(len) if !phrase => index..(index + len).min(unit_len),
            _ => match model.highlight_range_for_index(index, phrase) {
                Some(range) => range,
                None => return,
            },
        };

        let kind = if phrase {
            HighlightKind::Phrase
        } else {
            HighlightKind::Word
        };
        let segments = model.segments_for_unit_range(range);
        self.active.add(Highlight::new(kind, segments, doc));
    }

    /// Current styling becomes previous (pause mid-unit).
    pub fn remove_current_highlight(&mut self, doc: &mut Document, store: &mut NodeStore) {
        self.active.remove_current();
        self.render(doc, store);
    }

    /// The unit is done: everything in it is now read.
    pub fn reset_previous_highlight(&mut self, doc: &mut Document, store: &mut NodeStore) {
        self.move_active_to_history();
        self.render(doc, store);
    }

    /// Fold the active highlights into the per-node read extents.
    fn move_active_to_history(&mut self) {
        self.active.set_previous();
        let mut decorations = HashMap::new();
        for highlight in self.active.take() {
            highlight.decorate(&mut decorations);
        }
        for (node, decoration) in decorations {
            let end = self.read.entry(node).or_default();
            *end = (*end).max(decoration.previous_end);
            self.dirty.insert(node);
        }
    }

    /// Remove every highlight and put all original nodes back.
    pub fn clear_highlight_formatting(&mut self, doc: &mut Document, store: &mut NodeStore) {
        let nodes: Vec<_> = self.rendered.keys().copied().collect();
        for node in nodes {
            self.restore(doc, store, node);
        }
        self.active.clear();
        self.read.clear();
        self.dirty.clear();
        self.active_nodes.clear();
        store.clear_ancestors();
        log::trace!("highlight formatting cleared");
    }

    pub fn has_current_highlights(&self) -> bool {
        self.active.has_current()
    }

    pub fn has_current_granularity(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn active(&self) -> &MovementGranularity {
        &self.active
    }

    /// Whether an original text node is currently rewritten.
    pub fn is_decorated(&self, node: DomNodeId) -> bool {
        self.rendered.contains_key(&node)
    }

    /// Current-highlight spans in document order.
    pub fn current_elements(&self, doc: &Document) -> Vec<DomNodeId> {
        let mut spans: Vec<_> = self
            .rendered
            .values()
            .filter_map(|r| r.current_span)
            .collect();
        spans.sort_by(|&a, &b| doc.compare_document_position(a, b));
        spans
    }

    /// Scroll the first current element into view.
    pub fn scroll_into_view(
        &self,
        doc: &Document,
        layout: &dyn Layout,
        viewport: &mut Viewport,
    ) -> bool {
        self.current_rect(doc, layout)
            .is_some_and(|rect| viewport.reveal(rect))
    }

    /// Whether the first current element intersects the viewport.
    pub fn is_visible(&self, doc: &Document, layout: &dyn Layout, viewport: &Viewport) -> bool {
        self.current_rect(doc, layout)
            .is_some_and(|rect| viewport.intersects(rect))
    }

    fn current_rect(&self, doc: &Document, layout: &dyn Layout) -> Option<Rect> {
        let first = self.current_elements(doc).into_iter().next()?;
        layout.bounding_rect(doc, first)
    }

    /// The subtree at `node` is about to be removed: put its originals back
    /// and forget their highlight segments.
    pub fn on_node_will_be_deleted(
        &mut self,
        doc: &mut Document,
        store: &mut NodeStore,
        node: DomNodeId,
    ) {
        let originals: BTreeSet<_> = doc
            .descendants(node)
            .map(|live| store.ancestor(live).map_or(live, |record| record.node))
            .collect();
        let originals: Vec<_> = originals.into_iter().collect();

        for &original in &originals {
            self.restore(doc, store, original);
        }
        self.active.remove_nodes(&originals);
        for original in &originals {
            self.read.remove(original);
            self.dirty.remove(original);
            self.active_nodes.remove(original);
        }
    }

    /// Bring the DOM in line with the highlights. Only originals styled by
    /// the active highlights, now or at the last render, and originals whose
    /// read extent moved are revisited.
    fn render(&mut self, doc: &mut Document, store: &mut NodeStore) {
        let mut decorations = HashMap::new();
        self.active.decorate(&mut decorations);

        let mut nodes: BTreeSet<DomNodeId> = decorations.keys().copied().collect();
        nodes.extend(self.active_nodes.drain());
        nodes.extend(self.dirty.drain());

        for node in nodes {
            let mut decoration = decorations.get(&node).copied().unwrap_or_default();
            if let Some(&read_end) = self.read.get(&node) {
                decoration.previous_end = decoration.previous_end.max(read_end);
            }
            if decoration.is_empty() {
                self.restore(doc, store, node);
            } else if self.rendered.get(&node).map(|r| r.decoration) != Some(decoration) {
                self.restore(doc, store, node);
                self.split(doc, store, node, decoration);
            }
        }
        self.active_nodes = decorations.into_keys().collect();
    }

    /// Replace `node` with its previous/current/plain runs.
    fn split(
        &mut self,
        doc: &mut Document,
        store: &mut NodeStore,
        node: DomNodeId,
        decoration: Decoration,
    ) {
        if doc.parent(node).is_none() {
            return;
        }
        let text = doc.text(node).unwrap_or("").to_string();
        let len = char_len(&text);
        let previous_end = decoration.previous_end.min(len);
        let current_end = decoration.current_end.clamp(previous_end, len);

        let runs = [
            (0, previous_end, Some(PREVIOUS_HIGHLIGHT_CLASS)),
            (previous_end, current_end, Some(CURRENT_HIGHLIGHT_CLASS)),
            (current_end, len, None),
        ];

        let mut tops = Vec::new();
        let mut fragments = Vec::new();
        let mut current_span = None;
        for (start, end, class) in runs {
            if start >= end {
                continue;
            }
            let fragment = doc.create_text(char_slice(&text, start..end));
            store.set_ancestor(
                fragment,
                AncestorRecord {
                    node,
                    offset: start,
                },
            );
            fragments.push(fragment);
            let top = match class {
                Some(class) => {
                    let span = doc.create_html_element("span", vec![Attribute::new("class", class)]);
                    doc.append(span, fragment);
                    if class == CURRENT_HIGHLIGHT_CLASS {
                        current_span = Some(span);
                    }
                    span
                }
                None => fragment,
            };
            doc.insert_before(node, top);
            tops.push(top);
        }
        doc.detach(node);

        log::trace!(
            "split node {} at {}/{} of {}",
            node.0,
            previous_end,
            current_end,
            len
        );
        self.rendered.insert(
            node,
            Rendered {
                decoration,
                tops,
                fragments,
                current_span,
            },
        );
    }

    /// Put the original back in place of its fragments.
    fn restore(&mut self, doc: &mut Document, store: &mut NodeStore, node: DomNodeId) {
        let Some(rendered) = self.rendered.remove(&node) else {
            return;
        };
        if let Some(&anchor) = rendered.tops.first()
            && doc.parent(anchor).is_some()
        {
            doc.insert_before(anchor, node);
        }
        for top in rendered.tops {
            doc.detach(top);
        }
        for fragment in rendered.fragments {
            store.remove_ancestor(fragment);
        }
    }
}
