#![forbid(unsafe_code)]

//! Read-completion tracking for the open section's content area.
//!
//! The tracker is attached to at most one element at a time. Scroll events
//! from any other element (including one it was attached to before) are
//! stale and rejected with `DetachedObserverUse`.

use foldline_core::{AccordionError, Result};

use crate::element::ElementId;

/// Raw scroll geometry of a scrollable element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top of the content.
    pub scroll_offset: f64,
    /// Height of the element's visible box.
    pub visible_height: f64,
    /// Total scrollable content height.
    pub content_height: f64,
}

impl ScrollMetrics {
    #[must_use]
    pub const fn new(scroll_offset: f64, visible_height: f64, content_height: f64) -> Self {
        Self {
            scroll_offset,
            visible_height,
            content_height,
        }
    }

    /// Fraction of the content scrolled past the bottom edge, in `[0, 1]`.
    ///
    /// Content with no height counts as fully read; a non-finite offset or
    /// box height counts as unread.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if !(self.content_height > 0.0) {
            return 1.0;
        }
        let ratio = (self.scroll_offset + self.visible_height) / self.content_height;
        if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Listener for the currently open section's scroll position.
#[derive(Debug, Clone, Default)]
pub struct ScrollProgressTracker {
    attached: Option<ElementId>,
}

impl ScrollProgressTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { attached: None }
    }

    /// Listen to `target`, dropping any previous attachment.
    pub fn attach(&mut self, target: ElementId) {
        if let Some(previous) = self.attached.replace(target) {
            if previous != target {
                tracing::trace!(message = "scroll.reattach", from = %previous, to = %target);
            }
        } else {
            tracing::trace!(message = "scroll.attach", target = %target);
        }
    }

    /// Stop listening. Returns the element that was attached.
    pub fn detach(&mut self) -> Option<ElementId> {
        let previous = self.attached.take();
        if let Some(target) = previous {
            tracing::trace!(message = "scroll.detach", target = %target);
        }
        previous
    }

    #[must_use]
    pub const fn target(&self) -> Option<ElementId> {
        self.attached
    }

    /// Handle one scroll event and return the completion ratio.
    pub fn on_scroll(&self, target: ElementId, metrics: ScrollMetrics) -> Result<f64> {
        match self.attached {
            Some(attached) if attached == target => Ok(metrics.ratio()),
            _ => Err(AccordionError::DetachedObserverUse { observer: "scroll" }),
        }
    }
}
