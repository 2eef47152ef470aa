//! Content tree: the rendered DOM plus its content-id registration.

use std::path::Path;

use html5ever::{LocalName, QualName, ns};

use crate::dom::{Attribute, Document, DomNodeId, parse_html};
use crate::error::{Error, Result};
use crate::node_store::{ContentId, NodeStore};

/// The renderable tree the engine reads.
///
/// Every element and text node under the root gets a content id, handed out
/// in document order starting at 1.
pub struct ContentTree {
    doc: Document,
    root: DomNodeId,
    next_id: ContentId,
}

impl ContentTree {
    /// An empty tree whose root is a bare `<body>`.
    pub fn new() -> Self {
        let mut doc = Document::new();
        let html = doc.create_html_element("html", Vec::new());
        let body = doc.create_html_element("body", Vec::new());
        doc.append(doc.document(), html);
        doc.append(html, body);
        Self {
            doc,
            root: body,
            next_id: 1,
        }
    }

    /// Parse HTML and register every node under `<body>`.
    pub fn parse(html: &str, store: &mut NodeStore) -> Result<Self> {
        let doc = parse_html(html);
        let root = doc.find_by_tag("body").ok_or(Error::MissingBody)?;
        let mut tree = Self {
            doc,
            root,
            next_id: 1,
        };
        tree.register_all(store);
        Ok(tree)
    }

    /// Read and parse an HTML file.
    pub fn read_html_file(path: impl AsRef<Path>, store: &mut NodeStore) -> Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Self::parse(&html, store)
    }

    fn register_all(&mut self, store: &mut NodeStore) {
        let nodes: Vec<_> = self.doc.descendants(self.root).skip(1).collect();
        for node in nodes {
            if self.doc.is_element(node) || self.doc.is_text(node) {
                self.register(store, node);
            }
        }
        log::debug!("registered {} content nodes", self.next_id - 1);
    }

    fn register(&mut self, store: &mut NodeStore, node: DomNodeId) -> ContentId {
        let id = self.next_id;
        self.next_id += 1;
        store.register(node, id);
        id
    }

    /// The content root (`<body>`).
    pub fn root(&self) -> DomNodeId {
        self.root
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Append a registered element.
    pub fn append_element(
        &mut self,
        store: &mut NodeStore,
        parent: DomNodeId,
        tag: &str,
    ) -> DomNodeId {
        self.append_element_with_attrs(store, parent, tag, &[])
    }

    /// Append a registered element with attributes.
    pub fn append_element_with_attrs(
        &mut self,
        store: &mut NodeStore,
        parent: DomNodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> DomNodeId {
        let name = QualName::new(None, ns!(html), LocalName::from(tag));
        let attrs = attrs
            .iter()
            .map(|&(name, value)| Attribute::new(name, value))
            .collect();
        let node = self.doc.create_element(name, attrs);
        self.doc.append(parent, node);
        self.register(store, node);
        node
    }

    /// Append a registered text node. Adjacent text nodes stay separate.
    pub fn append_text(
        &mut self,
        store: &mut NodeStore,
        parent: DomNodeId,
        text: &str,
    ) -> DomNodeId {
        let node = self.doc.create_text(text);
        self.doc.append(parent, node);
        self.register(store, node);
        node
    }

    /// Append an element holding a single registered text node; returns the
    /// element and its text.
    pub fn append_element_with_text(
        &mut self,
        store: &mut NodeStore,
        parent: DomNodeId,
        tag: &str,
        text: &str,
    ) -> (DomNodeId, DomNodeId) {
        let element = self.append_element(store, parent, tag);
        let text = self.append_text(store, element, text);
        (element, text)
    }

    /// Remove a subtree from the live tree and forget its ids.
    pub fn remove(&mut self, store: &mut NodeStore, node: DomNodeId) {
        let subtree: Vec<_> = self.doc.descendants(node).collect();
        for id in subtree {
            store.unregister(id);
        }
        self.doc.detach(node);
    }

    /// Serialized content of the root.
    pub fn inner_html(&self) -> String {
        self.doc.inner_html(self.root)
    }
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}
