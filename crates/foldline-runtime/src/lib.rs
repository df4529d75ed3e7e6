#![forbid(unsafe_code)]

//! Runtime adapters that sit between the platform and the accordion state
//! machine.
//!
//! # Key Components
//!
//! - [`DeferredQueue`] - cancelable delayed actions driven by an explicit clock
//! - [`VisibilityWatcher`] - one-shot "became visible" latch
//! - [`ScrollProgressTracker`] - read-completion ratio for one attached element
//!
//! Nothing in this crate spawns threads or reads the wall clock. Every entry
//! point is called from the host's single UI thread.

pub mod deferred;
pub mod element;
pub mod scroll;
pub mod visibility;

pub use deferred::{DeferredAction, DeferredHandle, DeferredQueue};
pub use element::ElementId;
pub use scroll::{ScrollMetrics, ScrollProgressTracker};
pub use visibility::{ElementBounds, ObserveOptions, RootMargin, VisibilityWatcher};
