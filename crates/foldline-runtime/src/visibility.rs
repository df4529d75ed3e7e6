#![forbid(unsafe_code)]

//! One-shot "became visible" latch over a viewport intersection signal.
//!
//! The platform's visibility primitive (an intersection observer, a scroll
//! position check, a test script) pushes samples into
//! [`VisibilityWatcher::intersect`]. The watcher answers `true` exactly once:
//! the first time a non-zero fraction of the target, at or above the lowest
//! configured threshold, is inside the viewport grown by the root margin.
//!
//! # Invariants
//!
//! 1. At most one `Ok(true)` per watcher.
//! 2. After [`stop`](VisibilityWatcher::stop), every sample is
//!    `Err(DetachedObserverUse)`; stopping twice is a no-op.
//! 3. Samples for another element are ignored.

use foldline_core::{AccordionError, Result};

use crate::element::ElementId;

/// Extra space added to the viewport before intersecting, in pixels.
///
/// A positive `bottom` triggers before the element scrolls in from below; a
/// positive `top` does the same for elements entering from above.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
    pub top: f64,
    pub bottom: f64,
}

impl RootMargin {
    #[must_use]
    pub const fn top(px: f64) -> Self {
        Self {
            top: px,
            bottom: 0.0,
        }
    }
}

/// Observation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserveOptions {
    /// Intersection ratios that count as a crossing. The lowest one is the
    /// trigger; `0.0` means any non-zero fraction.
    pub thresholds: Vec<f64>,
    pub root_margin: RootMargin,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            thresholds: vec![0.05],
            root_margin: RootMargin::top(50.0),
        }
    }
}

impl ObserveOptions {
    /// Lowest threshold, clamped to `[0, 1]`.
    #[must_use]
    pub fn trigger_ratio(&self) -> f64 {
        self.thresholds
            .iter()
            .copied()
            .filter(|t| t.is_finite())
            .fold(None, |min: Option<f64>, t| Some(min.map_or(t, |m| m.min(t))))
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }

    /// Fraction of `bounds` inside the margin-expanded viewport.
    #[must_use]
    pub fn intersection_ratio(&self, bounds: ElementBounds, viewport_height: f64) -> f64 {
        if bounds.height <= 0.0 {
            return 0.0;
        }
        let view_top = -self.root_margin.top;
        let view_bottom = viewport_height.max(0.0) + self.root_margin.bottom;
        let top = bounds.top.max(view_top);
        let bottom = (bounds.top + bounds.height).min(view_bottom);
        ((bottom - top).max(0.0) / bounds.height).clamp(0.0, 1.0)
    }
}

/// Vertical extent of an element relative to the top of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementBounds {
    pub top: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchState {
    Watching,
    Fired,
    Stopped,
}

/// Fires once when its target first becomes visible.
#[derive(Debug, Clone)]
pub struct VisibilityWatcher {
    target: ElementId,
    options: ObserveOptions,
    state: WatchState,
}

impl VisibilityWatcher {
    /// Start watching `target`.
    #[must_use]
    pub fn observe(target: ElementId, options: ObserveOptions) -> Self {
        tracing::trace!(message = "visibility.observe", target = %target);
        Self {
            target,
            options,
            state: WatchState::Watching,
        }
    }

    #[must_use]
    pub const fn target(&self) -> ElementId {
        self.target
    }

    #[must_use]
    pub fn options(&self) -> &ObserveOptions {
        &self.options
    }

    /// Feed an intersection ratio for `target`.
    ///
    /// Returns `Ok(true)` the one time the watcher fires.
    pub fn intersect(&mut self, target: ElementId, ratio: f64) -> Result<bool> {
        match self.state {
            WatchState::Stopped => Err(AccordionError::DetachedObserverUse {
                observer: "visibility",
            }),
            WatchState::Fired => Ok(false),
            WatchState::Watching if target != self.target => Ok(false),
            WatchState::Watching => {
                if ratio > 0.0 && ratio >= self.options.trigger_ratio() {
                    self.state = WatchState::Fired;
                    tracing::debug!(message = "visibility.fired", target = %target, ratio);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
        }
    }

    /// Feed raw element geometry; the ratio is computed against the options.
    pub fn intersect_bounds(
        &mut self,
        target: ElementId,
        bounds: ElementBounds,
        viewport_height: f64,
    ) -> Result<bool> {
        let ratio = self.options.intersection_ratio(bounds, viewport_height);
        self.intersect(target, ratio)
    }

    /// Release the watch. Idempotent.
    pub fn stop(&mut self) {
        if self.state != WatchState::Stopped {
            tracing::trace!(message = "visibility.stop", target = %self.target);
            self.state = WatchState::Stopped;
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != WatchState::Stopped
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.state == WatchState::Fired
    }
}
