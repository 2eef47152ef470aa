//! Flattens the live DOM into one readable text buffer.
//!
//! The buffer is a list of pieces: the text of original text nodes,
//! synthesized line separators, and list markers. Separators and markers
//! have no backing node and never show up in segments.

use std::collections::{HashMap, HashSet};

use crate::dom::{Document, DomNodeId, Role, role_of};
use crate::node_store::NodeStore;
use crate::util::{char_len, char_to_byte, is_structural_whitespace};

/// What a piece of the buffer stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    /// Full text of an original text node.
    Text(DomNodeId),
    /// Synthesized `"\n"` between blocks and list items.
    Separator,
    /// Ordered-list number such as `"5. "`.
    Marker,
}

/// A run of the flattened buffer.
#[derive(Debug, Clone)]
pub struct Piece {
    pub kind: PieceKind,
    /// Char offset of the piece in the buffer.
    pub start: usize,
    /// Length in chars.
    pub len: usize,
    /// Text sits under a `<sup>`.
    pub superscript: bool,
}

impl Piece {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn node(&self) -> Option<DomNodeId> {
        match self.kind {
            PieceKind::Text(node) => Some(node),
            _ => None,
        }
    }
}

/// The flattened buffer of one content root.
#[derive(Debug, Clone, Default)]
pub struct Flattened {
    pub text: String,
    pub pieces: Vec<Piece>,
    /// Total length in chars.
    pub len: usize,
    /// Piece index of every original text node.
    node_pieces: HashMap<DomNodeId, usize>,
}

impl Flattened {
    /// Whether any original text made it into the buffer.
    pub fn has_text(&self) -> bool {
        !self.node_pieces.is_empty()
    }

    /// Byte offset of a char offset.
    pub fn byte_offset(&self, char_idx: usize) -> usize {
        char_to_byte(&self.text, char_idx)
    }

    /// Piece containing the char at `pos`.
    pub fn piece_at(&self, pos: usize) -> Option<usize> {
        let idx = self.pieces.partition_point(|p| p.end() <= pos);
        (idx < self.pieces.len()).then_some(idx)
    }

    /// Index of the piece that starts exactly at `pos`.
    pub fn piece_starting_at(&self, pos: usize) -> Option<usize> {
        self.pieces
            .binary_search_by_key(&pos, |p| p.start)
            .ok()
            .filter(|&i| self.pieces[i].len > 0)
    }

    /// Piece index of an original text node.
    pub fn piece_of(&self, node: DomNodeId) -> Option<usize> {
        self.node_pieces.get(&node).copied()
    }

    /// Buffer offset of an original text node.
    pub fn start_of(&self, node: DomNodeId) -> Option<usize> {
        self.piece_of(node).map(|i| self.pieces[i].start)
    }

    /// The char just before `pos`.
    pub fn char_before(&self, pos: usize) -> Option<char> {
        if pos == 0 {
            return None;
        }
        self.text[..self.byte_offset(pos)].chars().next_back()
    }
}

/// Flatten `root` in document order, skipping `deleted` nodes.
pub fn flatten(
    doc: &Document,
    store: &NodeStore,
    root: DomNodeId,
    deleted: &HashSet<DomNodeId>,
) -> Flattened {
    let mut ctx = FlattenContext {
        doc,
        store,
        deleted,
        out: Flattened::default(),
        list_stack: Vec::new(),
        pending_newline: false,
        superscript_depth: 0,
        last_original: None,
    };
    for child in doc.children(root) {
        ctx.walk_node(child);
    }
    ctx.out
}

struct ListState {
    ordered: bool,
    next: i64,
    step: i64,
}

struct FlattenContext<'a> {
    doc: &'a Document,
    store: &'a NodeStore,
    deleted: &'a HashSet<DomNodeId>,
    out: Flattened,
    list_stack: Vec<ListState>,
    /// A line break is owed before the next text.
    pending_newline: bool,
    superscript_depth: usize,
    /// Original behind the last text piece, so fragments of one
    /// rewritten node fold into a single piece.
    last_original: Option<DomNodeId>,
}

impl FlattenContext<'_> {
    fn walk_node(&mut self, id: DomNodeId) {
        if self.deleted.contains(&id) {
            return;
        }

        if self.doc.is_text(id) {
            self.walk_text(id);
            return;
        }

        let role = role_of(self.doc, id);
        match role {
            Role::Ignored => {}
            Role::Break => self.request_newline(),
            Role::Inline => self.walk_children(id),
            Role::Superscript => {
                self.superscript_depth += 1;
                self.walk_children(id);
                self.superscript_depth -= 1;
            }
            Role::Block => {
                self.request_newline();
                self.walk_children(id);
                self.request_newline();
            }
            Role::OrderedList | Role::UnorderedList => {
                self.list_stack.push(self.list_state(id, role));
                self.request_newline();
                self.walk_children(id);
                self.request_newline();
                self.list_stack.pop();
            }
            Role::ListItem => {
                self.pending_newline = false;
                self.push_piece(PieceKind::Separator, "\n");
                if let Some(marker) = self.next_marker(id) {
                    self.push_piece(PieceKind::Marker, &marker);
                }
                self.walk_children(id);
                self.request_newline();
            }
        }
    }

    fn walk_children(&mut self, id: DomNodeId) {
        for child in self.doc.children(id) {
            self.walk_node(child);
        }
    }

    fn walk_text(&mut self, id: DomNodeId) {
        // Highlight fragments stand in for their original.
        let (original, text) = match self.store.ancestor(id) {
            Some(record) => {
                if self.last_original == Some(record.node) || self.deleted.contains(&record.node) {
                    return;
                }
                (record.node, self.doc.text(record.node).unwrap_or(""))
            }
            None => (id, self.doc.text(id).unwrap_or("")),
        };

        if text.is_empty() || is_structural_whitespace(text) {
            return;
        }

        if self.pending_newline {
            self.pending_newline = false;
            self.push_piece(PieceKind::Separator, "\n");
        }

        let idx = self.out.pieces.len();
        self.push_piece(PieceKind::Text(original), text);
        self.out.node_pieces.insert(original, idx);
        self.last_original = Some(original);
    }

    /// Owe a line break, but only once something has been read.
    fn request_newline(&mut self) {
        if self.out.has_text() {
            self.pending_newline = true;
        }
    }

    fn push_piece(&mut self, kind: PieceKind, text: &str) {
        let len = char_len(text);
        self.out.pieces.push(Piece {
            kind,
            start: self.out.len,
            len,
            superscript: self.superscript_depth > 0 && matches!(kind, PieceKind::Text(_)),
        });
        self.out.text.push_str(text);
        self.out.len += len;
        if !matches!(kind, PieceKind::Text(_)) {
            self.last_original = None;
        }
    }

    fn list_state(&self, list: DomNodeId, role: Role) -> ListState {
        let ordered = role == Role::OrderedList;
        let reversed = self.doc.get_attr(list, "reversed").is_some();
        let step = if reversed { -1 } else { 1 };
        let start = self
            .doc
            .get_attr(list, "start")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or_else(|| {
                if reversed {
                    self.doc
                        .children(list)
                        .filter(|&c| self.doc.is_tag(c, "li"))
                        .count() as i64
                } else {
                    1
                }
            });
        ListState {
            ordered,
            next: start,
            step,
        }
    }

    fn next_marker(&mut self, item: DomNodeId) -> Option<String> {
        let value = self
            .doc
            .get_attr(item, "value")
            .and_then(|v| v.trim().parse::<i64>().ok());
        let state = self.list_stack.last_mut()?;
        if !state.ordered {
            return None;
        }
        let number = value.unwrap_or(state.next);
        state.next = number + state.step;
        Some(format!("{number}. "))
    }
}
