#![forbid(unsafe_code)]

//! Core: the section content model, stacked geometry, and error taxonomy.
//!
//! Everything here is pure data and pure functions. The state machine that
//! decides which section is open lives in `foldline`; this crate only answers
//! "given an open index, where does everything go?"

pub mod error;
pub mod geometry;
pub mod section;

pub use error::{AccordionError, Result};
pub use geometry::{
    Anchor, DEFAULT_HEADER_HEIGHT, GeometryEngine, Layer, PanelSlot, Placement, PositionInfo,
    SectionLayout, compute,
};
pub use section::{Section, SectionRegistry};
