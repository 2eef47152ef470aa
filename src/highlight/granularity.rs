//! Highlights active on the unit being read.

use std::collections::HashMap;

use crate::dom::DomNodeId;

use super::variant::{Decoration, Highlight, HighlightKind, HighlightState};

/// The highlights layered on the current unit: usually one sentence
/// highlight, plus the word or phrase highlights spoken so far.
#[derive(Debug, Clone, Default)]
pub struct MovementGranularity {
    highlights: Vec<Highlight>,
}

impl MovementGranularity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a highlight, keeping a single current range.
    ///
    /// A word or phrase supersedes the current sentence: the sentence's
    /// segments before the word's first node become previous, the rest stop
    /// drawing. Any earlier current highlight becomes previous.
    pub fn add(&mut self, highlight: Highlight) {
        if highlight.is_empty() {
            return;
        }

        if highlight.kind() == HighlightKind::Sentence {
            for existing in &mut self.highlights {
                existing.set_previous();
            }
            self.highlights.push(highlight);
            return;
        }

        let first_node = highlight.segments()[0].node;
        let mut split_off = Vec::new();
        for existing in &mut self.highlights {
            match (existing.kind(), existing.state()) {
                (HighlightKind::Sentence, HighlightState::Current | HighlightState::Superseded) => {
                    existing.supersede();
                    let Some(at) = existing.segments().iter().position(|s| s.node == first_node)
                    else {
                        continue;
                    };
                    let before: Vec<_> = existing.segments_mut().drain(..at).collect();
                    if !before.is_empty() {
                        split_off.push(Highlight::with_state(
                            HighlightKind::Sentence,
                            before,
                            HighlightState::Previous,
                        ));
                    }
                }
                (_, HighlightState::Current) => existing.set_previous(),
                _ => {}
            }
        }
        self.highlights.extend(split_off);
        self.highlights.push(highlight);
    }

    /// Current styling becomes previous styling.
    pub fn remove_current(&mut self) {
        for highlight in &mut self.highlights {
            if highlight.is_current() {
                highlight.set_previous();
            }
        }
    }

    /// Everything, including superseded text, is now read.
    pub fn set_previous(&mut self) {
        for highlight in &mut self.highlights {
            highlight.set_previous();
        }
    }

    /// Remove and return all highlights.
    pub fn take(&mut self) -> Vec<Highlight> {
        std::mem::take(&mut self.highlights)
    }

    pub fn clear(&mut self) {
        self.highlights.clear();
    }

    pub fn has_current(&self) -> bool {
        self.highlights.iter().any(Highlight::is_current)
    }

    pub fn has_sentence(&self) -> bool {
        self.highlights
            .iter()
            .any(|h| h.kind() == HighlightKind::Sentence)
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn remove_nodes(&mut self, nodes: &[DomNodeId]) {
        for highlight in &mut self.highlights {
            highlight.remove_nodes(nodes);
        }
        self.highlights.retain(|h| !h.is_empty());
    }

    pub fn decorate(&self, decorations: &mut HashMap<DomNodeId, Decoration>) {
        for highlight in &self.highlights {
            highlight.decorate(decorations);
        }
    }
}
