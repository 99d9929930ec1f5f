#![forbid(unsafe_code)]

//! Tunable engine parameters as data.
//!
//! Captures every timing and geometry constant of the tour engine as a single
//! [`TourSettings`] that can be loaded from TOML or JSON at startup.
//!
//! ```toml
//! # guidepost.toml
//! settle_ms = 450
//! missing_target = "skip_ahead"
//!
//! [message]
//! gap = 16
//! ```
//!
//! Every field has a default, so a partial document (or none at all) yields
//! the stock behavior: 50 ms mutation delay, 600 ms settle window, 8 px
//! highlight padding and a 400×200 message footprint with a 20 px gap.

use std::path::Path;

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::placer::Side;

/// Placeholder substituted with the base selector in composite templates.
pub const BASE_PLACEHOLDER: &str = "{base}";

/// What the controller does when a step's target cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTargetPolicy {
    /// Keep the previous geometry and report the miss.
    #[default]
    KeepLast,
    /// Move on to the next resolvable step in the direction of travel.
    SkipAhead,
    /// End the tour without firing either terminal callback.
    Abort,
}

/// Assumed message footprint used for placement and clamping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageSettings {
    /// Distance between the highlight and the message box.
    pub gap: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            gap: 20.0,
            width: 400.0,
            height: 200.0,
        }
    }
}

/// Selector convention for the composite "table intro" form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeSettings {
    /// Reserved suffix marking a composite selector.
    pub suffix: String,
    /// Template for the header region, `{base}` is the stripped selector.
    pub header: String,
    /// Template for the first data row.
    pub first_row: String,
}

impl Default for CompositeSettings {
    fn default() -> Self {
        Self {
            suffix: "-table-intro".to_string(),
            header: "{base} thead".to_string(),
            first_row: "{base} tbody tr:first-child".to_string(),
        }
    }
}

/// Top-level engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourSettings {
    /// Delay after `on_enter` before the target is measured for scrolling.
    pub mutation_delay_ms: u64,
    /// Settle window after a smooth scroll before geometry is recomputed.
    pub settle_ms: u64,
    /// How long the scroll block stays lifted for the scroll animation.
    pub lock_reapply_ms: u64,
    /// Highlight padding for steps that do not set their own.
    pub default_padding: f64,
    /// Message side for steps that do not set their own.
    pub default_side: Side,
    pub missing_target: MissingTargetPolicy,
    pub message: MessageSettings,
    pub composite: CompositeSettings,
}

impl Default for TourSettings {
    fn default() -> Self {
        Self {
            mutation_delay_ms: 50,
            settle_ms: 600,
            lock_reapply_ms: 600,
            default_padding: 8.0,
            default_side: Side::Bottom,
            missing_target: MissingTargetPolicy::KeepLast,
            message: MessageSettings::default(),
            composite: CompositeSettings::default(),
        }
    }
}

impl TourSettings {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let settings: Self = toml::from_str(s)?;
        settings.into_validated()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> ConfigResult<Self> {
        let settings: Self = serde_json::from_str(s)?;
        settings.into_validated()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_json_str(&content)
    }

    /// Set the missing-target policy.
    #[must_use]
    pub fn missing_target(mut self, policy: MissingTargetPolicy) -> Self {
        self.missing_target = policy;
        self
    }

    /// Set the settle window in milliseconds.
    #[must_use]
    pub fn settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    #[must_use]
    pub fn mutation_delay(&self) -> Duration {
        Duration::from_millis(self.mutation_delay_ms)
    }

    #[must_use]
    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    #[must_use]
    pub fn lock_reapply_delay(&self) -> Duration {
        Duration::from_millis(self.lock_reapply_ms)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the settings
    /// are valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.default_padding.is_finite() || self.default_padding < 0.0 {
            errors.push(format!(
                "default_padding must be a non-negative number, got {}",
                self.default_padding
            ));
        }
        if !self.message.gap.is_finite() || self.message.gap < 0.0 {
            errors.push(format!(
                "message.gap must be a non-negative number, got {}",
                self.message.gap
            ));
        }
        if !(self.message.width.is_finite() && self.message.width > 0.0) {
            errors.push(format!(
                "message.width must be positive, got {}",
                self.message.width
            ));
        }
        if !(self.message.height.is_finite() && self.message.height > 0.0) {
            errors.push(format!(
                "message.height must be positive, got {}",
                self.message.height
            ));
        }
        if self.composite.suffix.is_empty() {
            errors.push("composite.suffix must not be empty".to_string());
        }
        for (name, template) in [
            ("composite.header", &self.composite.header),
            ("composite.first_row", &self.composite.first_row),
        ] {
            if !template.contains(BASE_PLACEHOLDER) {
                errors.push(format!("{name} must contain {BASE_PLACEHOLDER}"));
            }
        }

        errors
    }

    fn into_validated(self) -> ConfigResult<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}
