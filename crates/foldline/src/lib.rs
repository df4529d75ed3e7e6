#![forbid(unsafe_code)]

//! foldline: a progressive-disclosure accordion controller.
//!
//! An ordered list of sections, at most one open. The first section opens on
//! its own once the accordion scrolls into view; reading an open section to
//! the end advances to the next one; the user can open or close any section
//! at any time, which always wins over pending automation.
//!
//! # Key Components
//!
//! - [`AccordionController`] - the state machine
//! - [`ControllerConfig`] / [`PageConfig`] - tunables and page content
//! - [`logging::init`] - standard tracing subscriber for binaries
//!
//! The geometry, registry, and signal adapters are re-exported from
//! `foldline-core` and `foldline-runtime`.
//!
//! # Driving the controller
//!
//! ```
//! use foldline::prelude::*;
//! use web_time::{Duration, Instant};
//!
//! let t0 = Instant::now();
//! let mut accordion = AccordionController::with_defaults(960);
//!
//! accordion.on_intersection(ElementId::Root, 0.3, t0);
//! accordion.tick(t0 + Duration::from_millis(200)).unwrap();
//! assert_eq!(accordion.open_index(), Some(0));
//!
//! let info = accordion.position_info().unwrap();
//! assert_eq!((info.top_offset, info.bottom_offset, info.available_height), (0, 144, 816));
//! ```

pub mod config;
pub mod controller;
pub mod logging;

pub use config::{ConfigError, ControllerConfig, PageConfig, VisibilityPolicyConfig};
pub use controller::{
    AccordionController, AccordionSnapshot, PendingAction, Transition, TransitionCause,
};
pub use foldline_core as core;
pub use foldline_runtime as runtime;

/// Everything a host needs to drive and render the accordion.
pub mod prelude {
    pub use crate::config::{ControllerConfig, PageConfig};
    pub use crate::controller::{
        AccordionController, AccordionSnapshot, PendingAction, Transition, TransitionCause,
    };
    pub use foldline_core::{
        AccordionError, Anchor, GeometryEngine, Layer, PanelSlot, Placement, PositionInfo,
        Section, SectionLayout, SectionRegistry,
    };
    pub use foldline_runtime::{ElementBounds, ElementId, ScrollMetrics};
}
