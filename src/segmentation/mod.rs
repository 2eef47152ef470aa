//! Segmentation model: splits content into speakable units and tracks the
//! unit being read.
//!
//! The model flattens the content root once (see [`pieces`]) and keeps a
//! cursor into that buffer. Only the current unit is computed; moving
//! recomputes it from the new cursor position.
//!
//! # Example
//!
//! ```
//! use readaloud::{ContentTree, ReadAloudModel, SegmentationContext};
//!
//! let mut ctx = SegmentationContext::new();
//! let tree = ContentTree::parse("<p>Run, take cover. I'm gonna come up with a plan.</p>", &mut ctx.node_store).unwrap();
//!
//! let mut model = ReadAloudModel::new();
//! model.init(tree.document(), &ctx.node_store, tree.root());
//! assert_eq!(model.current_text_content(), "Run, take cover. ");
//!
//! model.move_speech_forward();
//! assert_eq!(model.current_text_content(), "I'm gonna come up with a plan.");
//!
//! model.move_speech_forward();
//! assert_eq!(model.current_text_content(), "");
//! ```

pub mod pieces;
mod sentence;
mod words;

use std::collections::HashSet;
use std::ops::Range;

use crate::dom::{Document, DomNodeId};
use crate::node_store::NodeStore;
use crate::read_aloud_node::ReadAloudNode;
use crate::util::char_slice;

use pieces::{Flattened, PieceKind, flatten};

pub use words::{phrase_range, word_range};

/// A char range `[start, start + length)` of one original node's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub node: ReadAloudNode,
    pub start: usize,
    pub length: usize,
}

impl Segment {
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// The text this segment covers.
    pub fn text<'a>(&self, doc: &'a Document) -> &'a str {
        char_slice(self.node.text(doc), self.start..self.end())
    }
}

/// Cursor over the speakable units of a content root.
#[derive(Debug, Default)]
pub struct ReadAloudModel {
    root: Option<DomNodeId>,
    flat: Flattened,
    /// Buffer offset of the current unit's start.
    position: usize,
    /// Start offsets of units moved past, most recent last.
    history: Vec<usize>,
    current: Option<Range<usize>>,
    deleted: HashSet<DomNodeId>,
}

impl ReadAloudModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start reading `root` at its first unit. Calling again with the same
    /// root does nothing; a root without text leaves the model
    /// uninitialized.
    pub fn init(&mut self, doc: &Document, store: &NodeStore, root: DomNodeId) {
        if self.root == Some(root) {
            return;
        }

        let flat = flatten(doc, store, root, &self.deleted);
        if !flat.has_text() {
            log::debug!("init skipped: content root has no text");
            return;
        }

        self.root = Some(root);
        self.flat = flat;
        self.position = 0;
        self.history.clear();
        self.recompute();
        log::debug!(
            "initialized with {} chars in {} pieces",
            self.flat.len,
            self.flat.pieces.len()
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    /// Forget the content; the next `init` starts from scratch.
    pub fn reset_model(&mut self) {
        *self = Self::default();
        log::debug!("model reset");
    }

    /// Go back to the first unit, keeping the content.
    pub fn reset_speech_to_beginning(&mut self) {
        if !self.is_initialized() {
            return;
        }
        self.position = 0;
        self.history.clear();
        self.recompute();
    }

    /// The content changed. With `reset_on_content_update` the model starts
    /// over; otherwise it re-reads the content and keeps its place.
    pub fn on_content_updated(
        &mut self,
        doc: &Document,
        store: &NodeStore,
        reset_on_content_update: bool,
    ) {
        if reset_on_content_update {
            self.reset_model();
            return;
        }
        self.reflatten(doc, store);
    }

    /// Text of the current unit, or `""` when there is none.
    pub fn current_text_content(&self) -> String {
        self.current
            .as_ref()
            .map(|range| char_slice(&self.flat.text, range.clone()).to_string())
            .unwrap_or_default()
    }

    /// Segments backing the current unit.
    pub fn current_text_segments(&self) -> Vec<Segment> {
        match &self.current {
            Some(range) => self.segments_for_range(range.clone()),
            None => Vec::new(),
        }
    }

    /// Buffer range of the current unit.
    pub fn current_unit_range(&self) -> Option<Range<usize>> {
        self.current.clone()
    }

    /// Length in chars of the current unit.
    pub fn current_unit_len(&self) -> usize {
        self.current.as_ref().map_or(0, |r| r.len())
    }

    pub fn move_speech_forward(&mut self) {
        let Some(current) = self.current.clone() else {
            return;
        };
        self.history.push(current.start);
        self.position = current.end;
        self.recompute();
        log::debug!("moved forward to offset {}", self.position);
    }

    /// Back one unit; at the first unit this stays put.
    pub fn move_speech_backwards(&mut self) {
        if !self.is_initialized() {
            return;
        }
        self.position = self.history.pop().unwrap_or(0);
        self.recompute();
        log::debug!("moved backwards to offset {}", self.position);
    }

    /// Segments of the word (or phrase) at `index` of the current unit.
    /// Negative or out-of-range indices give an empty list.
    pub fn highlight_for_current_segment_index(
        &self,
        index: i64,
        use_phrase_boundary: bool,
    ) -> Vec<Segment> {
        let Ok(index) = usize::try_from(index) else {
            return Vec::new();
        };
        let (Some(unit), Some(range)) = (
            self.current.as_ref(),
            self.highlight_range_for_index(index, use_phrase_boundary),
        ) else {
            return Vec::new();
        };
        self.segments_for_range(unit.start + range.start..unit.start + range.end)
    }

    /// Unit-relative range of the word (or phrase) at `index`.
    pub fn highlight_range_for_index(
        &self,
        index: usize,
        use_phrase_boundary: bool,
    ) -> Option<Range<usize>> {
        let unit = self.current.as_ref()?;
        if index >= unit.len() {
            return None;
        }
        let text = char_slice(&self.flat.text, unit.clone());
        if use_phrase_boundary {
            phrase_range(text, index)
        } else {
            word_range(text, index)
        }
    }

    /// Segments covering a unit-relative range of the current unit.
    pub fn segments_for_unit_range(&self, range: Range<usize>) -> Vec<Segment> {
        let Some(unit) = self.current.as_ref() else {
            return Vec::new();
        };
        let start = (unit.start + range.start).min(unit.end);
        let end = (unit.start + range.end).min(unit.end);
        self.segments_for_range(start..end)
    }

    /// Segments covering a buffer range. Separators and list markers have
    /// no node and are skipped.
    pub fn segments_for_range(&self, range: Range<usize>) -> Vec<Segment> {
        if range.is_empty() {
            return Vec::new();
        }
        let Some(first) = self.flat.piece_at(range.start) else {
            return Vec::new();
        };

        let mut segments = Vec::new();
        for piece in &self.flat.pieces[first..] {
            if piece.start >= range.end {
                break;
            }
            let PieceKind::Text(node) = piece.kind else {
                continue;
            };
            let start = range.start.max(piece.start);
            let end = range.end.min(piece.end());
            if start < end {
                segments.push(Segment {
                    node: ReadAloudNode::from_original(node),
                    start: start - piece.start,
                    length: end - start,
                });
            }
        }
        segments
    }

    /// The node is about to leave the tree: drop its text and keep the
    /// cursor on the first surviving text at or after its old place.
    pub fn on_node_will_be_deleted(&mut self, doc: &Document, store: &NodeStore, node: DomNodeId) {
        self.deleted.extend(doc.descendants(node));
        if self.is_initialized() {
            self.reflatten(doc, store);
        }
    }

    fn reflatten(&mut self, doc: &Document, store: &NodeStore) {
        let Some(root) = self.root else {
            return;
        };
        let old = std::mem::replace(&mut self.flat, flatten(doc, store, root, &self.deleted));

        let had_unit = self.current.is_some();
        self.position = remap_position(&old, &self.flat, self.position);
        let mut history: Vec<usize> = self
            .history
            .iter()
            .map(|&pos| remap_position(&old, &self.flat, pos))
            .filter(|&pos| pos < self.position)
            .collect();
        history.dedup();
        self.history = history;

        if had_unit {
            self.recompute();
        }
        log::debug!(
            "content re-read: {} chars, cursor at {}",
            self.flat.len,
            self.position
        );
    }

    fn recompute(&mut self) {
        self.current = sentence::unit_at(&self.flat, self.position);
    }
}

/// Map an offset in `old` to the first surviving text of `new` at or after
/// it. Offsets inside a surviving node keep their distance into the node.
/// Offsets on a separator or list marker stay on the matching piece in
/// front of the next surviving text.
fn remap_position(old: &Flattened, new: &Flattened, pos: usize) -> usize {
    let Some(idx) = old.piece_at(pos) else {
        return new.len;
    };
    let piece = &old.pieces[idx];

    match piece.node() {
        Some(node) => {
            if let Some(start) = new.start_of(node) {
                return start + (pos - piece.start);
            }
            next_surviving_text(old, new, idx + 1).map_or(new.len, |(_, at)| lead_in_start(new, at))
        }
        None => remap_structural(old, new, idx, pos),
    }
}

/// First text piece of `old` from `from` on whose node is still in `new`,
/// as `(old index, new index)`.
fn next_surviving_text(old: &Flattened, new: &Flattened, from: usize) -> Option<(usize, usize)> {
    old.pieces[from..]
        .iter()
        .enumerate()
        .find_map(|(i, piece)| new.piece_of(piece.node()?).map(|at| (from + i, at)))
}

fn remap_structural(old: &Flattened, new: &Flattened, idx: usize, pos: usize) -> usize {
    let piece = &old.pieces[idx];
    let within = pos - piece.start;

    let Some((next_old, next_new)) = next_surviving_text(old, new, idx + 1) else {
        // Trailing structure: count forward from the last surviving text.
        let (old_base, new_base) = old.pieces[..idx]
            .iter()
            .rev()
            .find_map(|p| {
                let at = new.piece_of(p.node()?)?;
                Some((p.end(), new.pieces[at].end()))
            })
            .unwrap_or((0, 0));
        return (new_base + (pos - old_base)).min(new.len);
    };

    // Distance from this piece to the text it leads into, in pieces.
    let back = next_old - idx;
    let leads_in = old.pieces[idx..next_old].iter().all(|p| p.node().is_none());
    if leads_in
        && let Some(at) = next_new.checked_sub(back)
        && new.pieces[at..next_new].iter().all(|p| p.node().is_none())
        && new.pieces[at].kind == piece.kind
    {
        let target = &new.pieces[at];
        return target.start + within.min(target.len.saturating_sub(1));
    }

    lead_in_start(new, next_new)
}

/// Start of the text piece at `at`, or of the list number right in front
/// of it.
fn lead_in_start(new: &Flattened, at: usize) -> usize {
    new.pieces[..at]
        .iter()
        .rev()
        .take_while(|p| p.node().is_none())
        .find(|p| p.kind == PieceKind::Marker)
        .unwrap_or(&new.pieces[at])
        .start
}
