#![forbid(unsafe_code)]

//! The accordion state machine.
//!
//! # States
//!
//! `Closed` (`open_index = None`) and `Open(i)`. The machine starts `Closed`
//! with the auto-open still available and runs until [`unmount`].
//!
//! # Transitions
//!
//! | Input | Guard | Effect |
//! |-------|-------|--------|
//! | `toggle(i)` | `i` in range | cancel pending (a pending auto-open is consumed); `Open(i)` → `Closed`, otherwise → `Open(i)` |
//! | root became visible | auto-open unused, `Closed` | schedule auto-open after the settle delay |
//! | auto-open fires | still `Closed`, still unused | → `Open(0)` |
//! | scroll ratio `>= threshold` | `Open(i)`, `i` not last | replace pending with advance after the advance delay |
//! | advance fires | still `Open(i)` | → `Open(i + 1)` |
//!
//! # Invariants
//!
//! 1. At most one section is open.
//! 2. `auto_open_consumed` flips `false → true` once and never reverts. A
//!    manual toggle consumes it only when it cancels a scheduled auto-open.
//! 3. At most one pending action. Scheduling a new one cancels the previous.
//!
//! # Regressing scroll
//!
//! Once an advance is scheduled, scrolling back above the threshold does not
//! cancel it. Only a manual toggle (or unmount) does. This mirrors the page
//! the controller was built for and is covered by
//! `scroll_regression_does_not_cancel_advance`.
//!
//! # Time
//!
//! Every input takes `now`. Deferred actions fire only inside [`tick`], so a
//! callback can never re-enter a transition that is still running.
//!
//! [`unmount`]: AccordionController::unmount
//! [`tick`]: AccordionController::tick

use foldline_core::{
    AccordionError, GeometryEngine, Placement, PositionInfo, Result, SectionLayout,
    SectionRegistry,
};
use foldline_runtime::{
    DeferredHandle, DeferredQueue, ElementBounds, ElementId, ScrollMetrics,
    ScrollProgressTracker, VisibilityWatcher,
};
use web_time::Instant;

use crate::config::ControllerConfig;

/// What a deferred action does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum PendingAction {
    /// Open the first section after the settle delay.
    AutoOpen,
    /// Move from `from` to `from + 1` after the advance delay.
    Advance { from: usize },
}

/// Why the open index changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum TransitionCause {
    Manual,
    AutoOpen,
    AutoAdvance,
}

/// One change of the open index, for renderers that animate.
///
/// A `Manual` transition into `Some(i)` is also the cue to scroll section `i`
/// into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct Transition {
    pub from: Option<usize>,
    pub to: Option<usize>,
    pub cause: TransitionCause,
}

/// Read-only view of the controller for the rendering layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct AccordionSnapshot {
    pub open_index: Option<usize>,
    pub auto_open_consumed: bool,
    pub pending: Option<PendingAction>,
    pub position: Option<PositionInfo>,
    pub placements: Vec<Placement>,
}

/// Progressive-disclosure accordion controller.
#[derive(Debug)]
pub struct AccordionController {
    registry: SectionRegistry,
    config: ControllerConfig,
    geometry: GeometryEngine,
    viewport_height: i32,

    open_index: Option<usize>,
    auto_open_consumed: bool,
    pending: Option<DeferredHandle>,

    deferred: DeferredQueue<PendingAction>,
    visibility: VisibilityWatcher,
    scroll: ScrollProgressTracker,
    position: Option<PositionInfo>,
    transitions: Vec<Transition>,
    mounted: bool,
}

impl AccordionController {
    /// Mount a controller over `registry`, watching the root element.
    #[must_use]
    pub fn new(registry: SectionRegistry, config: ControllerConfig, viewport_height: i32) -> Self {
        let visibility = VisibilityWatcher::observe(ElementId::Root, config.observe_options());
        tracing::debug!(
            message = "accordion.mount",
            sections = registry.len(),
            viewport_height
        );
        Self {
            geometry: config.geometry(),
            registry,
            config,
            viewport_height,
            open_index: None,
            auto_open_consumed: false,
            pending: None,
            deferred: DeferredQueue::new(),
            visibility,
            scroll: ScrollProgressTracker::new(),
            position: None,
            transitions: Vec::new(),
            mounted: true,
        }
    }

    /// Controller over the built-in landing page with default tunables.
    #[must_use]
    pub fn with_defaults(viewport_height: i32) -> Self {
        Self::new(
            SectionRegistry::default_page(),
            ControllerConfig::default(),
            viewport_height,
        )
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    /// Manual open/close of section `index`.
    ///
    /// Fails with `IndexOutOfRange` and leaves the state untouched when
    /// `index` is not a section.
    pub fn toggle(&mut self, index: usize) -> Result<()> {
        self.registry.check(index)?;
        if !self.mounted {
            tracing::debug!(message = "accordion.toggle_after_unmount", index);
            return Ok(());
        }

        // Beating a scheduled auto-open to it consumes the auto-open; a toggle
        // with nothing scheduled leaves it armed.
        if self.pending_action() == Some(PendingAction::AutoOpen) {
            self.visibility.stop();
            self.auto_open_consumed = true;
        }
        self.cancel_pending();

        let target = if self.open_index == Some(index) {
            None
        } else {
            Some(index)
        };
        self.transition(target, TransitionCause::Manual)
    }

    /// Intersection ratio for `target` from the platform's visibility source.
    pub fn on_intersection(&mut self, target: ElementId, ratio: f64, now: Instant) {
        if self.holds_visibility() {
            return;
        }
        let fired = self.visibility.intersect(target, ratio);
        self.on_visibility_result(fired, now);
    }

    /// Raw root geometry; the ratio is computed with the configured margin.
    pub fn on_root_bounds(&mut self, bounds: ElementBounds, viewport_height: f64, now: Instant) {
        if self.holds_visibility() {
            return;
        }
        let fired = self
            .visibility
            .intersect_bounds(ElementId::Root, bounds, viewport_height);
        self.on_visibility_result(fired, now);
    }

    /// Samples taken while a section is open are not fed to the latch, so the
    /// auto-open stays available until the accordion is seen closed.
    fn holds_visibility(&self) -> bool {
        self.mounted && self.open_index.is_some() && self.visibility.is_active()
    }

    fn on_visibility_result(&mut self, fired: Result<bool>, now: Instant) {
        match fired {
            Ok(true) => self.schedule_auto_open(now),
            Ok(false) => {}
            Err(err) => Self::drop_stale(&err),
        }
    }

    /// Scroll event from a section's content area.
    pub fn on_content_scroll(&mut self, target: ElementId, metrics: ScrollMetrics, now: Instant) {
        let ratio = match self.scroll.on_scroll(target, metrics) {
            Ok(ratio) => ratio,
            Err(err) => return Self::drop_stale(&err),
        };
        let Some(open) = self.open_index else {
            return;
        };
        if open + 1 >= self.registry.len() || ratio < self.config.completion_threshold {
            return;
        }

        self.replace_pending(now, PendingAction::Advance { from: open });
        tracing::debug!(message = "accordion.advance.scheduled", from = open, ratio);
    }

    /// Fire every deferred action due at `now`.
    ///
    /// Returns how many fired.
    pub fn tick(&mut self, now: Instant) -> Result<usize> {
        let due = self.deferred.poll(now);
        let fired = due.len();
        for entry in due {
            if self.pending == Some(entry.handle) {
                self.pending = None;
            }
            match entry.action {
                PendingAction::AutoOpen => self.fire_auto_open()?,
                PendingAction::Advance { from } => self.fire_advance(from)?,
            }
        }
        Ok(fired)
    }

    /// Ambient viewport change.
    pub fn set_viewport_height(&mut self, viewport_height: i32) -> Result<()> {
        self.viewport_height = viewport_height;
        self.refresh_position()
    }

    /// Tear down: stop observers and cancel the pending action.
    ///
    /// Signals arriving afterwards are ignored.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.cancel_pending();
        self.deferred.clear();
        self.visibility.stop();
        self.scroll.detach();
        self.mounted = false;
        tracing::debug!(message = "accordion.unmount", open_index = ?self.open_index);
    }

    // -----------------------------------------------------------------------
    // Outputs
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn open_index(&self) -> Option<usize> {
        self.open_index
    }

    /// Geometry of the open section; `None` while closed.
    #[must_use]
    pub const fn position_info(&self) -> Option<PositionInfo> {
        self.position
    }

    /// Classification of one section.
    pub fn placement(&self, ordinal: usize) -> Result<Placement> {
        self.registry.check(ordinal)?;
        Ok(Placement::classify(self.open_index, ordinal))
    }

    /// Classification of every section, in order.
    #[must_use]
    pub fn placements(&self) -> Vec<Placement> {
        (0..self.registry.len())
            .map(|ordinal| Placement::classify(self.open_index, ordinal))
            .collect()
    }

    /// Full per-section render instructions.
    pub fn section_layouts(&self) -> Result<Vec<SectionLayout>> {
        self.geometry
            .layouts(self.open_index, self.registry.len(), self.viewport_height)
    }

    /// Content area the platform should deliver scroll events for.
    #[must_use]
    pub const fn scroll_target(&self) -> Option<ElementId> {
        self.scroll.target()
    }

    #[must_use]
    pub const fn auto_open_consumed(&self) -> bool {
        self.auto_open_consumed
    }

    #[must_use]
    pub fn has_pending_action(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending_action(&self) -> Option<PendingAction> {
        self.pending
            .and_then(|handle| self.deferred.action(handle).copied())
    }

    /// When the host should call [`tick`](Self::tick) next.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred.next_deadline()
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn sections(&self) -> &SectionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub const fn viewport_height(&self) -> i32 {
        self.viewport_height
    }

    /// Transitions since the last drain, oldest first.
    pub fn drain_transitions(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.transitions)
    }

    #[must_use]
    pub fn snapshot(&self) -> AccordionSnapshot {
        AccordionSnapshot {
            open_index: self.open_index,
            auto_open_consumed: self.auto_open_consumed,
            pending: self.pending_action(),
            position: self.position,
            placements: self.placements(),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn schedule_auto_open(&mut self, now: Instant) {
        if self.auto_open_consumed || self.open_index.is_some() || !self.mounted {
            return;
        }
        self.replace_pending(now, PendingAction::AutoOpen);
        tracing::debug!(
            message = "accordion.auto_open.scheduled",
            settle_delay_ms = self.config.settle_delay_ms
        );
    }

    fn fire_auto_open(&mut self) -> Result<()> {
        if self.auto_open_consumed || self.open_index.is_some() {
            return Ok(());
        }
        self.auto_open_consumed = true;
        self.visibility.stop();
        if self.registry.is_empty() {
            return Ok(());
        }
        self.transition(Some(0), TransitionCause::AutoOpen)
    }

    fn fire_advance(&mut self, from: usize) -> Result<()> {
        if self.open_index != Some(from) || from + 1 >= self.registry.len() {
            return Ok(());
        }
        self.transition(Some(from + 1), TransitionCause::AutoAdvance)
    }

    fn replace_pending(&mut self, now: Instant, action: PendingAction) {
        self.cancel_pending();
        let delay = match action {
            PendingAction::AutoOpen => self.config.settle_delay(),
            PendingAction::Advance { .. } => self.config.advance_delay(),
        };
        self.pending = Some(self.deferred.schedule(now, delay, action));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            if self.deferred.cancel(handle) {
                tracing::debug!(message = "accordion.pending.canceled", handle = handle.id());
            }
        }
    }

    fn transition(&mut self, to: Option<usize>, cause: TransitionCause) -> Result<()> {
        let from = self.open_index;
        self.open_index = to;
        self.refresh_position()?;
        match to {
            Some(index) => self.scroll.attach(ElementId::Content(index)),
            None => {
                self.scroll.detach();
            }
        }
        self.transitions.push(Transition { from, to, cause });
        tracing::debug!(
            message = "accordion.transition",
            from = ?from,
            to = ?to,
            cause = ?cause
        );
        Ok(())
    }

    fn refresh_position(&mut self) -> Result<()> {
        self.position = match self.open_index {
            Some(index) => Some(self.geometry.compute(
                index,
                self.registry.len(),
                self.viewport_height,
            )?),
            None => None,
        };
        Ok(())
    }

    fn drop_stale(err: &AccordionError) {
        tracing::trace!(message = "accordion.stale_signal", error = %err);
    }
}

impl Drop for AccordionController {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldline_core::Section;
    use web_time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn four() -> AccordionController {
        AccordionController::with_defaults(960)
    }

    fn read_to_end(ctl: &mut AccordionController, ordinal: usize, now: Instant) {
        ctl.on_content_scroll(
            ElementId::Content(ordinal),
            ScrollMetrics::new(600.0, 400.0, 1000.0),
            now,
        );
    }

    #[test]
    fn starts_closed() {
        let ctl = four();
        assert_eq!(ctl.open_index(), None);
        assert_eq!(ctl.position_info(), None);
        assert!(!ctl.auto_open_consumed());
        assert!(!ctl.has_pending_action());
        assert_eq!(ctl.scroll_target(), None);
    }

    #[test]
    fn toggle_opens_and_closes() {
        let mut ctl = four();
        ctl.toggle(2).unwrap();
        assert_eq!(ctl.open_index(), Some(2));
        assert_eq!(ctl.scroll_target(), Some(ElementId::Content(2)));
        ctl.toggle(2).unwrap();
        assert_eq!(ctl.open_index(), None);
        assert_eq!(ctl.position_info(), None);
        assert_eq!(ctl.scroll_target(), None);
    }

    #[test]
    fn toggle_switches_between_sections() {
        let mut ctl = four();
        ctl.toggle(0).unwrap();
        ctl.toggle(3).unwrap();
        assert_eq!(ctl.open_index(), Some(3));
        assert_eq!(ctl.placements()[0], Placement::CollapsedAbove);
        assert_eq!(ctl.placements()[3], Placement::Open);
    }

    #[test]
    fn visibility_schedules_then_opens_first() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.on_intersection(ElementId::Root, 0.2, t0);
        assert_eq!(ctl.pending_action(), Some(PendingAction::AutoOpen));
        assert_eq!(ctl.tick(t0 + ms(199)).unwrap(), 0);
        assert_eq!(ctl.open_index(), None);
        assert_eq!(ctl.tick(t0 + ms(200)).unwrap(), 1);
        assert_eq!(ctl.open_index(), Some(0));
        assert!(ctl.auto_open_consumed());
        assert!(!ctl.has_pending_action());
    }

    #[test]
    fn manual_toggle_before_settle_wins() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.on_intersection(ElementId::Root, 0.2, t0);
        ctl.toggle(2).unwrap();
        assert!(!ctl.has_pending_action());
        assert_eq!(ctl.tick(t0 + ms(500)).unwrap(), 0);
        assert_eq!(ctl.open_index(), Some(2));

        // Closing again does not re-arm the auto-open.
        ctl.toggle(2).unwrap();
        ctl.on_intersection(ElementId::Root, 1.0, t0 + ms(700));
        ctl.tick(t0 + ms(2000)).unwrap();
        assert_eq!(ctl.open_index(), None);
    }

    #[test]
    fn toggle_without_pending_auto_open_keeps_it_armed() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(1).unwrap();
        ctl.toggle(1).unwrap();
        assert!(!ctl.auto_open_consumed());

        ctl.on_intersection(ElementId::Root, 1.0, t0);
        assert_eq!(ctl.pending_action(), Some(PendingAction::AutoOpen));
        ctl.tick(t0 + ms(200)).unwrap();
        assert_eq!(ctl.open_index(), Some(0));
        assert!(ctl.auto_open_consumed());
    }

    #[test]
    fn visibility_while_open_does_not_use_up_auto_open() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(2).unwrap();
        ctl.on_intersection(ElementId::Root, 1.0, t0);
        assert!(!ctl.has_pending_action());
        ctl.toggle(2).unwrap();

        ctl.on_intersection(ElementId::Root, 1.0, t0 + ms(100));
        ctl.tick(t0 + ms(300)).unwrap();
        assert_eq!(ctl.open_index(), Some(0));
    }

    #[test]
    fn nan_scroll_offset_does_not_advance() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(0).unwrap();
        ctl.on_content_scroll(
            ElementId::Content(0),
            ScrollMetrics::new(f64::NAN, 400.0, 1000.0),
            t0,
        );
        assert!(!ctl.has_pending_action());
    }

    #[test]
    fn auto_open_ignored_when_already_open() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(1).unwrap();
        ctl.on_intersection(ElementId::Root, 1.0, t0);
        assert!(!ctl.has_pending_action());
    }

    #[test]
    fn completion_schedules_advance() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(0).unwrap();
        read_to_end(&mut ctl, 0, t0);
        assert_eq!(ctl.pending_action(), Some(PendingAction::Advance { from: 0 }));
        ctl.tick(t0 + ms(300)).unwrap();
        assert_eq!(ctl.open_index(), Some(1));
        assert_eq!(ctl.scroll_target(), Some(ElementId::Content(1)));
    }

    #[test]
    fn partial_scroll_does_not_advance() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(0).unwrap();
        ctl.on_content_scroll(
            ElementId::Content(0),
            ScrollMetrics::new(100.0, 400.0, 1000.0),
            t0,
        );
        assert!(!ctl.has_pending_action());
    }

    #[test]
    fn last_section_never_advances() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(3).unwrap();
        read_to_end(&mut ctl, 3, t0);
        assert!(!ctl.has_pending_action());
    }

    #[test]
    fn repeated_completion_keeps_one_pending() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(0).unwrap();
        read_to_end(&mut ctl, 0, t0);
        read_to_end(&mut ctl, 0, t0 + ms(200));
        assert_eq!(ctl.next_deadline(), Some(t0 + ms(500)));
        assert_eq!(ctl.tick(t0 + ms(300)).unwrap(), 0);
        assert_eq!(ctl.tick(t0 + ms(500)).unwrap(), 1);
        assert_eq!(ctl.open_index(), Some(1));
    }

    #[test]
    fn scroll_regression_does_not_cancel_advance() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(0).unwrap();
        read_to_end(&mut ctl, 0, t0);
        ctl.on_content_scroll(
            ElementId::Content(0),
            ScrollMetrics::new(0.0, 400.0, 1000.0),
            t0 + ms(100),
        );
        assert!(ctl.has_pending_action());
        ctl.tick(t0 + ms(300)).unwrap();
        assert_eq!(ctl.open_index(), Some(1));
    }

    #[test]
    fn stale_scroll_from_previous_section_is_ignored() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(0).unwrap();
        ctl.toggle(1).unwrap();
        read_to_end(&mut ctl, 0, t0);
        assert!(!ctl.has_pending_action());
    }

    #[test]
    fn toggle_out_of_range_leaves_state() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(1).unwrap();
        read_to_end(&mut ctl, 1, t0);
        let before = ctl.snapshot();
        assert_eq!(
            ctl.toggle(5),
            Err(AccordionError::IndexOutOfRange { index: 5, len: 4 })
        );
        assert_eq!(ctl.snapshot(), before);
    }

    #[test]
    fn unmount_cancels_and_ignores_signals() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.toggle(0).unwrap();
        read_to_end(&mut ctl, 0, t0);
        ctl.unmount();
        assert!(!ctl.has_pending_action());
        assert_eq!(ctl.tick(t0 + ms(1000)).unwrap(), 0);
        assert_eq!(ctl.open_index(), Some(0));

        read_to_end(&mut ctl, 0, t0 + ms(1000));
        ctl.on_intersection(ElementId::Root, 1.0, t0 + ms(1000));
        assert!(!ctl.has_pending_action());
        ctl.toggle(1).unwrap();
        assert_eq!(ctl.open_index(), Some(0));
    }

    #[test]
    fn viewport_change_recomputes_geometry() {
        let mut ctl = four();
        ctl.toggle(0).unwrap();
        ctl.set_viewport_height(600).unwrap();
        assert_eq!(ctl.position_info().map(|p| p.available_height), Some(456));
    }

    #[test]
    fn transitions_are_recorded_with_causes() {
        let t0 = Instant::now();
        let mut ctl = four();
        ctl.on_intersection(ElementId::Root, 1.0, t0);
        ctl.tick(t0 + ms(200)).unwrap();
        read_to_end(&mut ctl, 0, t0 + ms(250));
        ctl.tick(t0 + ms(550)).unwrap();
        ctl.toggle(1).unwrap();

        let causes: Vec<_> = ctl.drain_transitions().iter().map(|t| t.cause).collect();
        assert_eq!(
            causes,
            vec![
                TransitionCause::AutoOpen,
                TransitionCause::AutoAdvance,
                TransitionCause::Manual
            ]
        );
        assert!(ctl.drain_transitions().is_empty());
    }

    #[test]
    fn empty_registry_consumes_auto_open_without_opening() {
        let t0 = Instant::now();
        let mut ctl = AccordionController::new(
            SectionRegistry::new(Vec::<Section>::new()),
            ControllerConfig::default(),
            960,
        );
        ctl.on_intersection(ElementId::Root, 1.0, t0);
        ctl.tick(t0 + ms(200)).unwrap();
        assert_eq!(ctl.open_index(), None);
        assert!(ctl.auto_open_consumed());
        assert!(ctl.section_layouts().unwrap().is_empty());
    }

    #[test]
    fn placement_rejects_unknown_ordinal() {
        let ctl = four();
        assert_eq!(ctl.placement(0), Ok(Placement::Resting));
        assert!(ctl.placement(4).is_err());
    }
}
