//! Live DOM the engine reads and rewrites.
//!
//! # Example
//!
//! ```
//! use readaloud::dom::parse_html;
//!
//! let doc = parse_html("<p>Hello, <b>World</b>!</p>");
//! let p = doc.find_by_tag("p").unwrap();
//! assert_eq!(doc.text_content(p), "Hello, World!");
//! ```

mod arena;
mod role_map;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, Descendants, Document, DomNode, DomNodeId, NodeData};
pub use role_map::{Role, element_to_role};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::DocumentSink;

/// Parse an HTML document or fragment. Fragments end up inside `<body>`.
pub fn parse_html(html: &str) -> Document {
    let sink = DocumentSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_document()
}

/// Role of a node: elements map through [`element_to_role`], text is inline.
pub fn role_of(doc: &Document, id: DomNodeId) -> Role {
    match doc.element_name(id) {
        Some(name) => element_to_role(name),
        None if doc.is_text(id) => Role::Inline,
        None => Role::Ignored,
    }
}
