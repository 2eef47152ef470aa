//! A single highlight and how it styles the nodes it covers.

use std::collections::HashMap;

use crate::dom::{Document, DomNodeId};
use crate::segmentation::Segment;
use crate::util::has_meaningful_content;

/// Unit size of a highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    Sentence,
    Word,
    Phrase,
}

/// How a highlight is currently styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightState {
    /// Being read.
    Current,
    /// Already read.
    Previous,
    /// Replaced by a finer highlight layered on the same text; draws nothing.
    Superseded,
}

/// Per-node styling derived from all highlights: chars `[0, previous_end)`
/// are previous, `[previous_end, current_end)` current, the rest plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoration {
    pub previous_end: usize,
    pub current_end: usize,
}

impl Decoration {
    pub fn is_empty(&self) -> bool {
        self.previous_end == 0 && self.current_end == 0
    }
}

/// Text is too meaningless to be the current word or phrase.
pub fn is_invalid_highlight_for_word_highlighting(text: Option<&str>) -> bool {
    text.is_none_or(|t| !has_meaningful_content(t))
}

#[derive(Debug, Clone)]
pub struct Highlight {
    kind: HighlightKind,
    segments: Vec<Segment>,
    state: HighlightState,
}

impl Highlight {
    /// A new current highlight. Word and phrase highlights over
    /// punctuation-only text start out as previous instead.
    pub fn new(kind: HighlightKind, segments: Vec<Segment>, doc: &Document) -> Self {
        let mut highlight = Self {
            kind,
            segments,
            state: HighlightState::Current,
        };
        if kind != HighlightKind::Sentence
            && is_invalid_highlight_for_word_highlighting(Some(&highlight.text(doc)))
        {
            highlight.state = HighlightState::Previous;
        }
        highlight
    }

    pub(crate) fn with_state(
        kind: HighlightKind,
        segments: Vec<Segment>,
        state: HighlightState,
    ) -> Self {
        Self {
            kind,
            segments,
            state,
        }
    }

    pub fn kind(&self) -> HighlightKind {
        self.kind
    }

    pub fn state(&self) -> HighlightState {
        self.state
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut Vec<Segment> {
        &mut self.segments
    }

    pub fn is_current(&self) -> bool {
        self.state == HighlightState::Current
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenated text of the segments.
    pub fn text(&self, doc: &Document) -> String {
        self.segments.iter().map(|s| s.text(doc)).collect()
    }

    pub fn set_previous(&mut self) {
        self.state = HighlightState::Previous;
    }

    pub fn supersede(&mut self) {
        if self.state == HighlightState::Current {
            self.state = HighlightState::Superseded;
        }
    }

    /// Drop segments of the given originals.
    pub fn remove_nodes(&mut self, nodes: &[DomNodeId]) {
        self.segments.retain(|s| !nodes.contains(&s.node.dom_node()));
    }

    /// Fold this highlight's styling into per-node decorations.
    pub fn decorate(&self, decorations: &mut HashMap<DomNodeId, Decoration>) {
        for segment in &self.segments {
            let entry = decorations.entry(segment.node.dom_node()).or_default();
            match self.state {
                HighlightState::Current => {
                    entry.previous_end = entry.previous_end.max(segment.start);
                    entry.current_end = entry.current_end.max(segment.end());
                }
                HighlightState::Previous => {
                    entry.previous_end = entry.previous_end.max(segment.end());
                }
                HighlightState::Superseded => {}
            }
        }
    }
}
