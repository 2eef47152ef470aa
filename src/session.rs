//! One read-aloud session over a content tree.
//!
//! [`ReadAloudSession`] owns the content, the segmentation model, the
//! highlighter, and the selection controller, and sequences them the way a
//! speech controller drives them: speak a unit, receive boundary events,
//! pause, move on.
//!
//! ```
//! use readaloud::{ReadAloudConfig, ReadAloudSession};
//!
//! let mut session = ReadAloudSession::from_html("<p>Hi there. Bye now.</p>", ReadAloudConfig::default()).unwrap();
//! session.init();
//! session.highlight_current();
//! assert_eq!(session.current_text(), "Hi there. ");
//!
//! session.on_word_boundary(3, None);
//! assert_eq!(
//!     session.html(),
//!     "<p><span class=\"previous-read-highlight\">Hi </span><span class=\"current-read-highlight\">there</span>. Bye now.</p>"
//! );
//!
//! assert_eq!(session.advance(), "Bye now.");
//! ```

use std::path::Path;

use crate::config::{Granularity, ReadAloudConfig};
use crate::content::ContentTree;
use crate::context::SegmentationContext;
use crate::dom::DomNodeId;
use crate::error::{Error, Result};
use crate::highlight::{Highlighter, Layout, Viewport};
use crate::node_store::ContentId;
use crate::segmentation::{ReadAloudModel, Segment};
use crate::selection::{DomSelection, ReportedSelection, SelectionController, TextAnchor};

pub struct ReadAloudSession {
    tree: ContentTree,
    ctx: SegmentationContext,
    model: ReadAloudModel,
    highlighter: Highlighter,
    selection: SelectionController,
    config: ReadAloudConfig,
}

impl ReadAloudSession {
    /// A session over an already registered tree.
    pub fn new(tree: ContentTree, ctx: SegmentationContext, config: ReadAloudConfig) -> Self {
        Self {
            tree,
            ctx,
            model: ReadAloudModel::new(),
            highlighter: Highlighter::new(config.highlight.granularity),
            selection: SelectionController::new(),
            config,
        }
    }

    pub fn from_html(html: &str, config: ReadAloudConfig) -> Result<Self> {
        let mut ctx = SegmentationContext::new();
        let tree = ContentTree::parse(html, &mut ctx.node_store)?;
        Ok(Self::new(tree, ctx, config))
    }

    pub fn open(path: impl AsRef<Path>, config: ReadAloudConfig) -> Result<Self> {
        let mut ctx = SegmentationContext::new();
        let tree = ContentTree::read_html_file(path, &mut ctx.node_store)?;
        Ok(Self::new(tree, ctx, config))
    }

    /// Start at the first unit of the content root.
    pub fn init(&mut self) {
        self.model
            .init(self.tree.document(), &self.ctx.node_store, self.tree.root());
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn context(&self) -> &SegmentationContext {
        &self.ctx
    }

    pub fn model(&self) -> &ReadAloudModel {
        &self.model
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn config(&self) -> &ReadAloudConfig {
        &self.config
    }

    pub fn current_text(&self) -> String {
        self.model.current_text_content()
    }

    pub fn current_segments(&self) -> Vec<Segment> {
        self.model.current_text_segments()
    }

    /// Serialized content, highlights included.
    pub fn html(&self) -> String {
        self.tree.inner_html()
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.config.highlight.granularity = granularity;
        self.highlighter.set_granularity(granularity);
    }

    /// Speech of the current unit starts.
    pub fn highlight_current(&mut self) {
        self.highlighter.highlight_current_granularity(
            self.tree.document_mut(),
            &mut self.ctx,
            &self.model,
            true,
        );
    }

    /// The engine reached the word at `char_index` of the active utterance.
    pub fn on_word_boundary(&mut self, char_index: usize, reported_length: Option<usize>) {
        self.ctx
            .word_boundaries
            .update_boundary(char_index, reported_length);
        self.highlighter.highlight_current_granularity(
            self.tree.document_mut(),
            &mut self.ctx,
            &self.model,
            false,
        );
    }

    /// An utterance finished without any boundary event.
    pub fn on_utterance_end_without_boundaries(&mut self) {
        self.ctx.word_boundaries.notify_no_boundaries();
    }

    /// Mark the current unit read and move to the next one. Returns the new
    /// unit's text (empty past the end).
    pub fn advance(&mut self) -> String {
        self.highlighter
            .reset_previous_highlight(self.tree.document_mut(), &mut self.ctx.node_store);
        self.ctx.word_boundaries.reset_for_new_unit();
        self.model.move_speech_forward();
        self.highlight_current();
        self.current_text()
    }

    /// Back up one unit. Highlights of later text are dropped.
    pub fn back(&mut self) -> String {
        self.highlighter
            .clear_highlight_formatting(self.tree.document_mut(), &mut self.ctx.node_store);
        self.ctx.word_boundaries.reset_for_new_unit();
        self.model.move_speech_backwards();
        self.highlight_current();
        self.current_text()
    }

    /// Speech paused mid-unit; resuming continues from the last boundary.
    pub fn pause(&mut self) {
        self.highlighter
            .remove_current_highlight(self.tree.document_mut(), &mut self.ctx.node_store);
        self.ctx.word_boundaries.update_for_pause();
    }

    /// Drop every highlight and return to the first unit.
    pub fn reset(&mut self) {
        self.highlighter
            .clear_highlight_formatting(self.tree.document_mut(), &mut self.ctx.node_store);
        self.ctx.word_boundaries.reset_to_default_state();
        self.model.reset_speech_to_beginning();
    }

    /// Remove a subtree from the content.
    pub fn delete_node(&mut self, node: DomNodeId) {
        self.highlighter.on_node_will_be_deleted(
            self.tree.document_mut(),
            &mut self.ctx.node_store,
            node,
        );
        self.model
            .on_node_will_be_deleted(self.tree.document(), &self.ctx.node_store, node);

        if let Some(sel) = self.selection.dom_selection()
            && (self.tree.document().contains(node, sel.anchor_node)
                || self.tree.document().contains(node, sel.focus_node))
        {
            self.selection.clear();
        }
        self.tree.remove(&mut self.ctx.node_store, node);
    }

    /// Remove the subtree registered under `id`.
    pub fn delete_content(&mut self, id: ContentId) -> Result<()> {
        let node = self
            .ctx
            .node_store
            .dom_node(id)
            .ok_or(Error::UnknownContentId(id))?;
        self.delete_node(node);
        Ok(())
    }

    /// The content changed outside the engine.
    pub fn content_updated(&mut self) {
        let reset = self.config.segmentation.reset_on_content_update;
        if reset {
            self.highlighter
                .clear_highlight_formatting(self.tree.document_mut(), &mut self.ctx.node_store);
        }
        self.model
            .on_content_updated(self.tree.document(), &self.ctx.node_store, reset);
        if !self.model.is_initialized() {
            self.init();
        }
    }

    /// Scroll the current highlight into view when configured to.
    pub fn scroll(&self, layout: &dyn Layout, viewport: &mut Viewport) -> bool {
        self.config.highlight.scroll_into_view
            && self
                .highlighter
                .scroll_into_view(self.tree.document(), layout, viewport)
    }

    pub fn on_selection_change(&mut self, selection: Option<DomSelection>) -> ReportedSelection {
        self.selection
            .on_selection_change(&self.ctx.node_store, selection)
    }

    pub fn update_selection(
        &mut self,
        target: &ReportedSelection,
        hint: Option<&TextAnchor>,
    ) -> Option<DomSelection> {
        self.selection
            .update_selection(
                self.tree.document(),
                &self.ctx.node_store,
                self.tree.root(),
                target,
                hint,
            )
            .copied()
    }
}
