//! Arena-based live DOM.
//!
//! Every node lives in one contiguous vector and links to its relatives by
//! index. Nodes are never freed: a detached node keeps its data, which lets
//! the highlighter park an original text node while its fragments are shown
//! and put it back later.

use std::cmp::Ordering;
use std::collections::HashMap;

use html5ever::{LocalName, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomNodeId(pub u32);

impl DomNodeId {
    /// Sentinel value for no node.
    pub const NONE: DomNodeId = DomNodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted classes.
        classes: Vec<String>,
    },
    /// Text content.
    Text(String),
    /// Comment (kept so the tree sink has somewhere to put them).
    Comment(String),
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Build an attribute in the null namespace.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.into(),
        }
    }
}

/// A node in the arena.
#[derive(Debug)]
pub struct DomNode {
    pub data: NodeData,
    pub parent: DomNodeId,
    pub first_child: DomNodeId,
    pub last_child: DomNodeId,
    pub prev_sibling: DomNodeId,
    pub next_sibling: DomNodeId,
}

impl DomNode {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: DomNodeId::NONE,
            first_child: DomNodeId::NONE,
            last_child: DomNodeId::NONE,
            prev_sibling: DomNodeId::NONE,
            next_sibling: DomNodeId::NONE,
        }
    }
}

/// Arena-backed document tree.
pub struct Document {
    nodes: Vec<DomNode>,
    document: DomNodeId,
    /// Map from id attribute to node.
    id_map: HashMap<String, DomNodeId>,
}

impl Document {
    /// Create a new empty document with a root node.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            document: DomNodeId::NONE,
            id_map: HashMap::new(),
        };
        doc.document = doc.alloc(DomNode::new(NodeData::Document));
        doc
    }

    fn alloc(&mut self, node: DomNode) -> DomNodeId {
        let id = DomNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// The document root.
    pub fn document(&self) -> DomNodeId {
        self.document
    }

    pub fn get(&self, id: DomNodeId) -> Option<&DomNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: DomNodeId) -> Option<&mut DomNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> DomNodeId {
        let mut id = None;
        let mut classes = Vec::new();
        for attr in &attrs {
            match attr.name.local.as_ref() {
                "id" => id = Some(attr.value.clone()),
                "class" => {
                    classes = attr
                        .value
                        .split_whitespace()
                        .map(|s| s.to_string())
                        .collect();
                }
                _ => {}
            }
        }

        let node_id = self.alloc(DomNode::new(NodeData::Element {
            name,
            attrs,
            classes,
        }));
        if let Some(id_str) = id {
            self.id_map.insert(id_str, node_id);
        }
        node_id
    }

    /// Create a detached HTML element by tag name.
    pub fn create_html_element(&mut self, tag: &str, attrs: Vec<Attribute>) -> DomNodeId {
        self.create_element(QualName::new(None, ns!(html), LocalName::from(tag)), attrs)
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> DomNodeId {
        self.alloc(DomNode::new(NodeData::Text(text.into())))
    }

    pub fn create_comment(&mut self, text: String) -> DomNodeId {
        self.alloc(DomNode::new(NodeData::Comment(text)))
    }

    /// Append a child to a parent node. The child must be detached.
    pub fn append(&mut self, parent: DomNodeId, child: DomNodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(DomNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = DomNodeId::NONE;
        }

        if last_child.is_some()
            && let Some(last_node) = self.get_mut(last_child)
        {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a detached node before a sibling.
    pub fn insert_before(&mut self, sibling: DomNodeId, new_node: DomNodeId) {
        let Some((parent, prev)) = self.get(sibling).map(|n| (n.parent, n.prev_sibling)) else {
            return;
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to the last child if it is a text node, else create one.
    pub fn append_text(&mut self, parent: DomNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(DomNodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text);
        self.append(parent, text_node);
    }

    /// Unlink a node from its parent and siblings. Its subtree stays intact.
    pub fn detach(&mut self, target: DomNodeId) {
        let Some((parent, prev, next)) = self
            .get(target)
            .map(|n| (n.parent, n.prev_sibling, n.next_sibling))
        else {
            return;
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = DomNodeId::NONE;
            node.prev_sibling = DomNodeId::NONE;
            node.next_sibling = DomNodeId::NONE;
        }
    }

    /// Move every child of `node` to the end of `new_parent`.
    pub fn reparent_children(&mut self, node: DomNodeId, new_parent: DomNodeId) {
        let children: Vec<_> = self.children(node).collect();
        for child in children {
            self.detach(child);
            self.append(new_parent, child);
        }
    }

    /// Whether the node currently hangs off the document root.
    pub fn is_connected(&self, id: DomNodeId) -> bool {
        self.ancestors_inclusive(id).last() == Some(&self.document)
    }

    pub fn parent(&self, id: DomNodeId) -> Option<DomNodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_some())
    }

    pub fn get_by_id(&self, id: &str) -> Option<DomNodeId> {
        self.id_map.get(id).copied()
    }

    /// Number of nodes ever allocated.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the document only has its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: DomNodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(DomNodeId::NONE);
        ChildrenIter {
            doc: self,
            current: first,
        }
    }

    /// Preorder traversal of `root` and everything below it.
    pub fn descendants(&self, root: DomNodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root,
            next: if self.get(root).is_some() {
                root
            } else {
                DomNodeId::NONE
            },
        }
    }

    /// `id`, its parent, its grandparent, and so on up to the root.
    pub fn ancestors_inclusive(&self, id: DomNodeId) -> Vec<DomNodeId> {
        let mut chain = Vec::new();
        let mut current = id;
        while let Some(node) = self.get(current) {
            chain.push(current);
            current = node.parent;
        }
        chain
    }

    /// Whether `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: DomNodeId, node: DomNodeId) -> bool {
        self.ancestors_inclusive(node).contains(&ancestor)
    }

    /// Order two nodes by document position (preorder). Nodes in disjoint
    /// trees compare by id so the ordering stays total.
    pub fn compare_document_position(&self, a: DomNodeId, b: DomNodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let mut chain_a = self.ancestors_inclusive(a);
        let mut chain_b = self.ancestors_inclusive(b);
        chain_a.reverse();
        chain_b.reverse();

        if chain_a.first() != chain_b.first() {
            return a.cmp(&b);
        }

        let common = chain_a
            .iter()
            .zip(&chain_b)
            .take_while(|(x, y)| x == y)
            .count();

        // One node is an ancestor of the other: the ancestor comes first.
        let (Some(&child_a), Some(&child_b)) = (chain_a.get(common), chain_b.get(common)) else {
            return chain_a.len().cmp(&chain_b.len());
        };

        let parent = chain_a[common - 1];
        for child in self.children(parent) {
            if child == child_a {
                return Ordering::Less;
            }
            if child == child_b {
                return Ordering::Greater;
            }
        }
        a.cmp(&b)
    }

    /// Find the first node in the whole document matching a predicate.
    pub fn find<F>(&self, predicate: F) -> Option<DomNodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.descendants(self.document)
            .find(|&id| self.get(id).is_some_and(&predicate))
    }

    /// Find element by tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<DomNodeId> {
        self.find(|node| {
            matches!(&node.data, NodeData::Element { name, .. } if name.local.as_ref() == tag)
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    doc: &'a Document,
    current: DomNodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = DomNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .doc
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(DomNodeId::NONE);
        Some(id)
    }
}

/// Preorder iterator bounded to one subtree.
pub struct Descendants<'a> {
    doc: &'a Document,
    root: DomNodeId,
    next: DomNodeId,
}

impl Iterator for Descendants<'_> {
    type Item = DomNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next;
        let node = self.doc.get(current)?;

        if node.first_child.is_some() {
            self.next = node.first_child;
            return Some(current);
        }

        // Climb until a next sibling exists, without leaving the root.
        let mut cursor = current;
        self.next = DomNodeId::NONE;
        while cursor != self.root {
            let Some(n) = self.doc.get(cursor) else { break };
            if n.next_sibling.is_some() {
                self.next = n.next_sibling;
                break;
            }
            cursor = n.parent;
        }
        Some(current)
    }
}

/// Element and text accessors.
impl Document {
    /// Element's local name (tag).
    pub fn element_name(&self, id: DomNodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Whether the node is an element with the given tag.
    pub fn is_tag(&self, id: DomNodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    pub fn get_attr(&self, id: DomNodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    pub fn element_classes(&self, id: DomNodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    pub fn has_class(&self, id: DomNodeId, class: &str) -> bool {
        self.element_classes(id).iter().any(|c| c == class)
    }

    pub fn is_element(&self, id: DomNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    pub fn is_text(&self, id: DomNodeId) -> bool {
        self.get(id).is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Own text of a text node.
    pub fn text(&self, id: DomNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of every text node in the subtree.
    pub fn text_content(&self, id: DomNodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Text nodes of a subtree in document order.
    pub fn text_leaves(&self, id: DomNodeId) -> Vec<DomNodeId> {
        self.descendants(id).filter(|&n| self.is_text(n)).collect()
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: DomNodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Serialize a node and its subtree.
    pub fn outer_html(&self, id: DomNodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: DomNodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => {
                for child in self.children(id) {
                    self.write_html(child, out);
                }
            }
            NodeData::Element { name, attrs, .. } => {
                out.push('<');
                out.push_str(&name.local);
                for attr in attrs {
                    out.push(' ');
                    out.push_str(&attr.name.local);
                    out.push_str("=\"");
                    out.push_str(&attr.value.replace('&', "&amp;").replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if is_void_element(&name.local) {
                    return;
                }
                for child in self.children(id) {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(&name.local);
                out.push('>');
            }
            NodeData::Text(text) => {
                for c in text.chars() {
                    match c {
                        '&' => out.push_str("&amp;"),
                        '<' => out.push_str("&lt;"),
                        '>' => out.push_str("&gt;"),
                        _ => out.push(c),
                    }
                }
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
    }
}

fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}
