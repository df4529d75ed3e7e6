#![forbid(unsafe_code)]

//! Static content model.
//!
//! A [`SectionRegistry`] is built once at startup and never mutated. Each
//! [`Section`] carries its ordinal, which the registry stamps on construction
//! so descriptors loaded from configuration never need to number themselves.

use crate::error::{AccordionError, Result};

/// One unit of content the accordion can show expanded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Section {
    #[cfg_attr(feature = "serde", serde(skip))]
    id: usize,
    title: String,
    description: String,
    details: String,
    video: Option<String>,
    extra_panel_a: bool,
    extra_panel_b: bool,
    call_to_action: Option<String>,
}

impl Section {
    /// Create a section with a title and no extras.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the headline shown at the top of the expanded body.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the long-form body text.
    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Attach a media asset path.
    #[must_use]
    pub fn video(mut self, path: impl Into<String>) -> Self {
        self.video = Some(path.into());
        self
    }

    /// Show the first extra panel (the horizontal tab strip) in the body.
    #[must_use]
    pub fn extra_panel_a(mut self, enabled: bool) -> Self {
        self.extra_panel_a = enabled;
        self
    }

    /// Show the second extra panel (the video card group) in the body.
    #[must_use]
    pub fn extra_panel_b(mut self, enabled: bool) -> Self {
        self.extra_panel_b = enabled;
        self
    }

    /// Show a call-to-action button with the given label.
    #[must_use]
    pub fn call_to_action(mut self, label: impl Into<String>) -> Self {
        self.call_to_action = Some(label.into());
        self
    }

    /// Ordinal position within the registry.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description_text(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn details_text(&self) -> &str {
        &self.details
    }

    #[must_use]
    pub fn video_path(&self) -> Option<&str> {
        self.video.as_deref()
    }

    #[must_use]
    pub const fn has_extra_panel_a(&self) -> bool {
        self.extra_panel_a
    }

    #[must_use]
    pub const fn has_extra_panel_b(&self) -> bool {
        self.extra_panel_b
    }

    #[must_use]
    pub const fn has_call_to_action(&self) -> bool {
        self.call_to_action.is_some()
    }

    /// Label for the call-to-action button, if any.
    #[must_use]
    pub fn call_to_action_label(&self) -> Option<&str> {
        self.call_to_action.as_deref()
    }
}

/// Immutable ordered list of sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    /// Build a registry, assigning ordinals in iteration order.
    #[must_use]
    pub fn new(sections: impl IntoIterator<Item = Section>) -> Self {
        let sections = sections
            .into_iter()
            .enumerate()
            .map(|(id, mut section)| {
                section.id = id;
                section
            })
            .collect();
        Self { sections }
    }

    /// The four sections of the customer-service landing page.
    #[must_use]
    pub fn default_page() -> Self {
        Self::new([
            Section::new("Contact Center Desktop")
                .description(
                    "Intelligently guide and seamlessly automate every customer service journey.",
                )
                .details(
                    "An AI-powered desktop for delivering seamless, personalized experiences \
                     across all channels, driving efficiency and first-contact resolution.",
                )
                .video("/videos/customer-service.mp4")
                .extra_panel_a(true)
                .call_to_action("Learn more how Customer Service works"),
            Section::new("Customer Service AI")
                .description("How AI improves customer service")
                .details(
                    "Transform customer service with AI.\n\n\
                     An AI copilot understands customer intent, automates tasks, and \
                     recommends next best actions so every agent can be your best agent.",
                )
                .extra_panel_b(true)
                .call_to_action("Unlock value for your contact center"),
            Section::new("Digital engagement")
                .description(
                    "AI-driven engagement solutions improve satisfaction and reduce \
                     response time through real-time insights.",
                )
                .details(
                    "Give agents a complete view of customer history, preferences, and \
                     interactions to provide personalized support.",
                )
                .video("/videos/engagement.mp4")
                .extra_panel_a(true),
            Section::new("Digital self-service")
                .description("Enhance your self-service capabilities for 24/7 support")
                .details(
                    "Contain calls and reduce cost to serve using AI and workflow automation, \
                     in the channel the customer prefers.",
                )
                .video("/videos/self-service.mp4")
                .extra_panel_a(true)
                .call_to_action("Get started with Self-Service"),
        ])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Look up a section by ordinal.
    pub fn get(&self, index: usize) -> Result<&Section> {
        self.sections
            .get(index)
            .ok_or(AccordionError::IndexOutOfRange {
                index,
                len: self.sections.len(),
            })
    }

    /// Fail with `IndexOutOfRange` unless `index` names a section.
    pub fn check(&self, index: usize) -> Result<usize> {
        AccordionError::check_index(index, self.sections.len())
    }

    /// Ordinal of the last section, if any.
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.sections.len().checked_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Section] {
        &self.sections
    }
}

impl FromIterator<Section> for SectionRegistry {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a SectionRegistry {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
