//! Keeping the current highlight on screen.

use crate::dom::{Document, DomNodeId};

/// Vertical extent of a laid-out element, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Supplies element geometry. The engine has no layout of its own.
pub trait Layout {
    fn bounding_rect(&self, doc: &Document, node: DomNodeId) -> Option<Rect>;
}

/// The scrollable ancestor's visible window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_top: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(height: f64) -> Self {
        Self {
            scroll_top: 0.0,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.scroll_top + self.height
    }

    /// Scroll so `rect` is fully visible, or its top is when it is taller
    /// than the viewport. Returns whether the offset changed.
    pub fn reveal(&mut self, rect: Rect) -> bool {
        let target = if rect.height >= self.height || rect.top < self.scroll_top {
            rect.top
        } else if rect.bottom() > self.bottom() {
            rect.bottom() - self.height
        } else {
            self.scroll_top
        };
        let changed = target != self.scroll_top;
        self.scroll_top = target;
        changed
    }

    pub fn intersects(&self, rect: Rect) -> bool {
        rect.top < self.bottom() && rect.bottom() > self.scroll_top
    }
}
