//! # readaloud
//!
//! Segmentation and highlight synchronization for reading web content aloud.
//!
//! The engine walks a live DOM, divides its text into speakable units,
//! keeps a cursor over those units while the tree changes, draws the unit
//! being spoken as an in-place highlight, and maps user selections between
//! the highlighted DOM and the original content.
//!
//! ## Quick Start
//!
//! ```
//! use readaloud::{Granularity, ReadAloudConfig, ReadAloudSession};
//!
//! let mut config = ReadAloudConfig::default();
//! config.highlight.granularity = Granularity::Sentence;
//!
//! let html = "<h1>Title</h1><p>First sentence. Second one.</p>";
//! let mut session = ReadAloudSession::from_html(html, config).unwrap();
//! session.init();
//!
//! session.highlight_current();
//! assert_eq!(session.current_text(), "Title\n");
//!
//! session.advance();
//! assert_eq!(session.current_text(), "First sentence. ");
//! assert!(session.html().contains("<span class=\"current-read-highlight\">First sentence. </span>"));
//! ```
//!
//! ## Components
//!
//! - [`ContentTree`] and [`NodeStore`]: the DOM and its content ids
//! - [`ReadAloudModel`]: unit segmentation and the reading cursor
//! - [`WordBoundaries`]: speech-engine boundary events
//! - [`Highlighter`]: non-destructive highlight rendering
//! - [`SelectionController`]: selection mapping in both directions
//! - [`ReadAloudSession`]: all of the above wired together

pub mod config;
pub mod content;
pub mod context;
pub mod dom;
pub mod error;
pub mod highlight;
pub mod node_store;
pub mod read_aloud_node;
pub mod segmentation;
pub mod selection;
pub mod session;
pub(crate) mod util;
pub mod word_boundaries;

pub use config::{Granularity, HighlightConfig, ReadAloudConfig, SegmentationConfig};
pub use content::ContentTree;
pub use context::SegmentationContext;
pub use dom::{Document, DomNodeId, parse_html};
pub use error::{Error, Result};
pub use highlight::{
    CURRENT_HIGHLIGHT_CLASS, Highlighter, Layout, PREVIOUS_HIGHLIGHT_CLASS, Rect, Viewport,
};
pub use node_store::{AncestorRecord, ContentId, INVALID_ID, NodeStore};
pub use read_aloud_node::ReadAloudNode;
pub use segmentation::{ReadAloudModel, Segment};
pub use selection::{DomSelection, ReportedSelection, SelectionController, TextAnchor};
pub use session::ReadAloudSession;
pub use word_boundaries::{WordBoundaries, WordBoundaryMode};
