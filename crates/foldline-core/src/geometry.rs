#![forbid(unsafe_code)]

//! Stacked accordion geometry.
//!
//! When a section is open, every collapsed header above it is pinned to the
//! top of the viewport and every collapsed header below it is pinned to the
//! bottom. The open section gets whatever height remains.
//!
//! # Invariants
//!
//! 1. `top_offset = open * header` and `bottom_offset = (count - open - 1) * header`.
//! 2. `available_height >= header` whenever `count > 0`.
//! 3. `top_offset + available_height + bottom_offset == viewport` whenever the
//!    viewport is at least `count * header` tall.
//! 4. Zero sections is not an error: the result is `{0, 0, viewport}`.
//! 5. Negative viewports clamp to zero.
//!
//! # Failure Modes
//!
//! Only an out-of-range open index fails, with
//! [`AccordionError::IndexOutOfRange`].

use crate::error::{AccordionError, Result};

/// Height in pixels reserved for one collapsed header.
pub const DEFAULT_HEADER_HEIGHT: u32 = 48;

/// Offsets and free height for the open section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionInfo {
    /// Space reserved for collapsed headers above the open section.
    pub top_offset: u32,
    /// Space reserved for collapsed headers below the open section.
    pub bottom_offset: u32,
    /// Height left for the open section, never below one header.
    pub available_height: u32,
}

impl PositionInfo {
    /// Sum of the three bands.
    #[inline]
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.top_offset as u64 + self.bottom_offset as u64 + self.available_height as u64
    }
}

/// Compute [`PositionInfo`] for `open_index` in a stack of `section_count`.
pub fn compute(
    open_index: usize,
    section_count: usize,
    viewport_height: i32,
    header_height: u32,
) -> Result<PositionInfo> {
    let viewport = u64::try_from(viewport_height).unwrap_or(0);
    if section_count == 0 {
        return Ok(PositionInfo {
            top_offset: 0,
            bottom_offset: 0,
            available_height: saturate(viewport),
        });
    }
    AccordionError::check_index(open_index, section_count)?;

    let header = u64::from(header_height);
    let above = open_index as u64;
    let below = (section_count - open_index - 1) as u64;
    let top = above.saturating_mul(header);
    let bottom = below.saturating_mul(header);
    let available = viewport
        .saturating_sub(top.saturating_add(bottom))
        .max(header);

    Ok(PositionInfo {
        top_offset: saturate(top),
        bottom_offset: saturate(bottom),
        available_height: saturate(available),
    })
}

#[inline]
fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Where a section sits relative to the open one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Placement {
    /// Nothing is open; the section is a card in normal page flow.
    Resting,
    /// Collapsed into the header stack above the open section.
    CollapsedAbove,
    /// The open section.
    Open,
    /// Collapsed into the header stack below the open section.
    CollapsedBelow,
}

impl Placement {
    /// Classify `ordinal` against the current open index.
    #[inline]
    #[must_use]
    pub const fn classify(open_index: Option<usize>, ordinal: usize) -> Self {
        match open_index {
            None => Self::Resting,
            Some(open) if ordinal < open => Self::CollapsedAbove,
            Some(open) if ordinal == open => Self::Open,
            Some(_) => Self::CollapsedBelow,
        }
    }

    #[must_use]
    pub const fn is_collapsed(self) -> bool {
        matches!(self, Self::CollapsedAbove | Self::CollapsedBelow)
    }
}

/// Stacking layer, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Layer {
    Flow,
    /// Panels of sections already passed, kept under the open one.
    Underlay,
    Active,
    /// Pinned collapsed headers, always on top.
    Header,
}

impl Layer {
    /// CSS-style z-index for renderers that need a number.
    #[must_use]
    pub const fn z_index(self) -> u16 {
        match self {
            Self::Flow => 0,
            Self::Underlay => 40,
            Self::Active => 50,
            Self::Header => 60,
        }
    }
}

/// Vertical anchoring of a header strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Anchor {
    /// Normal document flow.
    Flow,
    /// Fixed, this many pixels from the top of the viewport.
    Top(u32),
    /// Fixed, this many pixels from the bottom of the viewport.
    Bottom(u32),
}

/// A full-height content panel anchored at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanelSlot {
    pub bottom: u32,
    pub height: u32,
    pub layer: Layer,
}

/// Render instructions for one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectionLayout {
    pub ordinal: usize,
    pub placement: Placement,
    pub header: Anchor,
    pub header_layer: Layer,
    /// Present for the open section and every section above it.
    pub panel: Option<PanelSlot>,
}

/// Geometry bound to a fixed header height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryEngine {
    header_height: u32,
}

impl Default for GeometryEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_HEIGHT)
    }
}

impl GeometryEngine {
    #[must_use]
    pub const fn new(header_height: u32) -> Self {
        Self { header_height }
    }

    #[must_use]
    pub const fn header_height(&self) -> u32 {
        self.header_height
    }

    /// See [`compute`].
    pub fn compute(
        &self,
        open_index: usize,
        section_count: usize,
        viewport_height: i32,
    ) -> Result<PositionInfo> {
        compute(open_index, section_count, viewport_height, self.header_height)
    }

    /// Lay out every section for the given open index.
    ///
    /// With nothing open, all sections rest in page flow.
    pub fn layouts(
        &self,
        open_index: Option<usize>,
        section_count: usize,
        viewport_height: i32,
    ) -> Result<Vec<SectionLayout>> {
        let Some(open) = open_index else {
            return Ok((0..section_count)
                .map(|ordinal| SectionLayout {
                    ordinal,
                    placement: Placement::Resting,
                    header: Anchor::Flow,
                    header_layer: Layer::Flow,
                    panel: None,
                })
                .collect());
        };

        let info = self.compute(open, section_count, viewport_height)?;
        let header = self.header_height;
        let layouts = (0..section_count)
            .map(|ordinal| {
                let placement = Placement::classify(open_index, ordinal);
                match placement {
                    Placement::CollapsedAbove => SectionLayout {
                        ordinal,
                        placement,
                        header: Anchor::Top(pixels(ordinal, header)),
                        header_layer: Layer::Header,
                        panel: Some(PanelSlot {
                            bottom: info.bottom_offset,
                            height: info.available_height,
                            layer: Layer::Underlay,
                        }),
                    },
                    Placement::Open => SectionLayout {
                        ordinal,
                        placement,
                        header: Anchor::Top(info.top_offset),
                        header_layer: Layer::Active,
                        panel: Some(PanelSlot {
                            bottom: info.bottom_offset,
                            height: info.available_height,
                            layer: Layer::Active,
                        }),
                    },
                    Placement::CollapsedBelow | Placement::Resting => SectionLayout {
                        ordinal,
                        placement,
                        header: Anchor::Bottom(pixels(section_count - 1 - ordinal, header)),
                        header_layer: Layer::Header,
                        panel: None,
                    },
                }
            })
            .collect();
        Ok(layouts)
    }
}

#[inline]
fn pixels(slots: usize, header: u32) -> u32 {
    saturate((slots as u64).saturating_mul(u64::from(header)))
}
