#![forbid(unsafe_code)]

//! Policy-as-data configuration for the accordion controller.
//!
//! Every tunable lives in [`ControllerConfig`], loadable from TOML or JSON at
//! startup. Defaults reproduce the landing page's behavior exactly, so
//! `ControllerConfig::default()` needs no file at all.
//!
//! ```toml
//! # foldline.toml
//! [controller]
//! header_height = 48
//! settle_delay_ms = 200
//! advance_delay_ms = 300
//! completion_threshold = 0.98
//!
//! [controller.visibility]
//! thresholds = [0.05]
//! root_margin_top = 50.0
//!
//! [[sections]]
//! title = "Contact Center Desktop"
//! extra_panel_a = true
//! call_to_action = "Learn more"
//! ```

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use foldline_core::{DEFAULT_HEADER_HEIGHT, GeometryEngine, Section, SectionRegistry};
use foldline_runtime::{ObserveOptions, RootMargin};
use web_time::Duration;

// ---------------------------------------------------------------------------
// Controller tunables
// ---------------------------------------------------------------------------

/// Timing, threshold, and geometry parameters for one controller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ControllerConfig {
    /// Height of one collapsed header, in pixels.
    pub header_height: u32,

    /// Pause between the root becoming visible and the first section opening.
    pub settle_delay_ms: u64,

    /// Pause between reaching read-completion and opening the next section.
    pub advance_delay_ms: u64,

    /// Read-completion ratio that schedules an auto-advance.
    pub completion_threshold: f64,

    /// Visibility trigger for auto-open.
    pub visibility: VisibilityPolicyConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            header_height: DEFAULT_HEADER_HEIGHT,
            settle_delay_ms: 200,
            advance_delay_ms: 300,
            completion_threshold: 0.98,
            visibility: VisibilityPolicyConfig::default(),
        }
    }
}

/// Auto-open visibility trigger.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct VisibilityPolicyConfig {
    /// Intersection ratios; the lowest is the trigger.
    pub thresholds: Vec<f64>,
    /// Pre-trigger margin above the viewport, in pixels.
    pub root_margin_top: f64,
    /// Pre-trigger margin below the viewport, in pixels.
    pub root_margin_bottom: f64,
}

impl Default for VisibilityPolicyConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![0.05],
            root_margin_top: 50.0,
            root_margin_bottom: 0.0,
        }
    }
}

impl ControllerConfig {
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    #[must_use]
    pub fn geometry(&self) -> GeometryEngine {
        GeometryEngine::new(self.header_height)
    }

    #[must_use]
    pub fn observe_options(&self) -> ObserveOptions {
        ObserveOptions {
            thresholds: self.visibility.thresholds.clone(),
            root_margin: RootMargin {
                top: self.visibility.root_margin_top,
                bottom: self.visibility.root_margin_bottom,
            },
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.header_height == 0 {
            errors.push("header_height must be > 0".into());
        }

        if !(self.completion_threshold > 0.0 && self.completion_threshold <= 1.0) {
            errors.push(format!(
                "completion_threshold must be in (0, 1], got {}",
                self.completion_threshold
            ));
        }

        for t in &self.visibility.thresholds {
            if !(0.0..=1.0).contains(t) {
                errors.push(format!(
                    "visibility.thresholds entries must be in [0, 1], got {t}"
                ));
            }
        }

        if !self.visibility.root_margin_top.is_finite()
            || !self.visibility.root_margin_bottom.is_finite()
        {
            errors.push("visibility root margins must be finite".into());
        }

        errors
    }

    /// Load from a TOML string, rejecting invalid values.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a JSON string, rejecting invalid values.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Reject the config if [`validate`](Self::validate) reports anything.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Page configuration
// ---------------------------------------------------------------------------

/// Controller tunables plus the section list of one page.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PageConfig {
    pub controller: ControllerConfig,
    /// Empty means the built-in landing page sections.
    pub sections: Vec<Section>,
}

impl PageConfig {
    /// Build the registry, falling back to the default page.
    #[must_use]
    pub fn registry(&self) -> SectionRegistry {
        if self.sections.is_empty() {
            SectionRegistry::default_page()
        } else {
            SectionRegistry::new(self.sections.iter().cloned())
        }
    }

    /// Load from a TOML string, validating the controller section.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let page: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        page.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string, validating the controller section.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let page: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        page.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.controller.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ControllerConfig::default().validate().is_empty());
    }

    #[test]
    fn defaults_match_landing_page() {
        let config = ControllerConfig::default();
        assert_eq!(config.header_height, 48);
        assert_eq!(config.settle_delay(), Duration::from_millis(200));
        assert_eq!(config.advance_delay(), Duration::from_millis(300));
        assert_eq!(config.completion_threshold, 0.98);
        let options = config.observe_options();
        assert_eq!(options.thresholds, vec![0.05]);
        assert_eq!(options.root_margin.top, 50.0);
    }

    #[test]
    fn validate_catches_bad_values() {
        let config = ControllerConfig {
            header_height: 0,
            completion_threshold: 1.5,
            visibility: VisibilityPolicyConfig {
                thresholds: vec![-0.1],
                ..VisibilityPolicyConfig::default()
            },
            ..ControllerConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(matches!(
            config.validated(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn empty_page_uses_default_sections() {
        assert_eq!(PageConfig::default().registry().len(), 4);
    }

    #[cfg(feature = "config")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ControllerConfig::from_toml_str("advance_delay_ms = 500").unwrap();
        assert_eq!(config.advance_delay_ms, 500);
        assert_eq!(config.settle_delay_ms, 200);
        assert_eq!(config.header_height, 48);
    }

    #[cfg(feature = "config")]
    #[test]
    fn controller_loaders_reject_invalid_values() {
        let err = ControllerConfig::from_toml_str("header_height = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        let err = ControllerConfig::from_json_str(r#"{ "completion_threshold": 1.5 }"#)
            .unwrap_err();
        assert!(err.to_string().contains("completion_threshold"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn page_toml_with_sections() {
        let page = PageConfig::from_toml_str(
            r#"
            [controller]
            header_height = 40

            [[sections]]
            title = "One"
            extra_panel_b = true

            [[sections]]
            title = "Two"
            call_to_action = "Go"
            "#,
        )
        .unwrap();
        assert_eq!(page.controller.header_height, 40);
        let registry = page.registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.get(0).unwrap().has_extra_panel_b());
        assert_eq!(registry.get(1).unwrap().id(), 1);
        assert!(registry.get(1).unwrap().has_call_to_action());
    }

    #[cfg(feature = "config")]
    #[test]
    fn page_toml_rejects_invalid_controller() {
        let err = PageConfig::from_toml_str("[controller]\ncompletion_threshold = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("completion_threshold"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_round_trip() {
        let config = ControllerConfig {
            settle_delay_ms: 10,
            ..ControllerConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ControllerConfig::from_json_str(&json).unwrap(), config);
    }

    #[cfg(feature = "config")]
    #[test]
    fn missing_file_is_io_error() {
        let err = PageConfig::from_toml_file("/nonexistent/foldline.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
