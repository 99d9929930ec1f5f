#![forbid(unsafe_code)]

//! Tour steps and configuration.
//!
//! A [`TourConfig`] is supplied by the host screen and read-only to the
//! engine. The data half of a tour can also be declared as a [`TourSpec`] in
//! TOML or JSON:
//!
//! ```toml
//! title = "Patient intake"
//!
//! [[steps]]
//! target = "#patient-search"
//! title = "Find a patient"
//! message = "Search by name, MRN or date of birth."
//!
//! [[steps]]
//! target = "#visits-table-intro"
//! title = "Visit history"
//! message = "Each row is one visit."
//! position = "top"
//! highlight_padding = 4
//! ```

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::placer::Side;

/// Synchronous hook run when a step becomes current.
///
/// Runs before the target is measured, so it may mutate the document (open a
/// popover, expand a section). It must finish its work before returning.
pub type EnterHook = Rc<dyn Fn()>;

/// Terminal callback fired on skip or completion.
pub type TerminalCallback = Box<dyn FnMut()>;

/// One stage of a guided tour.
#[derive(Clone)]
pub struct TourStep {
    target: String,
    title: String,
    message: String,
    position: Option<Side>,
    highlight_padding: Option<f64>,
    on_enter: Option<EnterHook>,
}

impl fmt::Debug for TourStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourStep")
            .field("target", &self.target)
            .field("title", &self.title)
            .field("message", &self.message)
            .field("position", &self.position)
            .field("highlight_padding", &self.highlight_padding)
            .field("on_enter", &self.on_enter.is_some())
            .finish()
    }
}

impl TourStep {
    /// Create a step targeting `target`.
    #[must_use]
    pub fn new(
        target: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            title: title.into(),
            message: message.into(),
            position: None,
            highlight_padding: None,
            on_enter: None,
        }
    }

    /// Preferred message side.
    #[must_use]
    pub fn position(mut self, side: Side) -> Self {
        self.position = Some(side);
        self
    }

    /// Highlight padding in logical pixels.
    #[must_use]
    pub fn padding(mut self, padding: f64) -> Self {
        self.highlight_padding = Some(padding);
        self
    }

    #[must_use]
    pub fn on_enter(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_enter = Some(Rc::new(hook));
        self
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn preferred_side(&self) -> Option<Side> {
        self.position
    }

    #[must_use]
    pub fn highlight_padding(&self) -> Option<f64> {
        self.highlight_padding
    }

    #[must_use]
    pub fn has_enter_hook(&self) -> bool {
        self.on_enter.is_some()
    }

    pub(crate) fn enter_hook(&self) -> Option<EnterHook> {
        self.on_enter.clone()
    }
}

/// Steps plus terminal callbacks for one tour instance.
#[derive(Default)]
pub struct TourConfig {
    pub(crate) steps: Vec<TourStep>,
    pub(crate) on_complete: Option<TerminalCallback>,
    pub(crate) on_skip: Option<TerminalCallback>,
}

impl fmt::Debug for TourConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourConfig")
            .field("steps", &self.steps)
            .field("on_complete", &self.on_complete.is_some())
            .field("on_skip", &self.on_skip.is_some())
            .finish()
    }
}

impl TourConfig {
    #[must_use]
    pub fn new(steps: Vec<TourStep>) -> Self {
        Self {
            steps,
            on_complete: None,
            on_skip: None,
        }
    }

    #[must_use]
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_skip(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_skip = Some(Box::new(callback));
        self
    }

    /// Attach an enter hook to the step at `index`; out-of-range is ignored.
    #[must_use]
    pub fn with_enter_hook(mut self, index: usize, hook: impl Fn() + 'static) -> Self {
        if let Some(step) = self.steps.get_mut(index) {
            step.on_enter = Some(Rc::new(hook));
        }
        self
    }

    #[must_use]
    pub fn steps(&self) -> &[TourStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Declarative step description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub target: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_padding: Option<f64>,
}

impl From<StepSpec> for TourStep {
    fn from(spec: StepSpec) -> Self {
        Self {
            target: spec.target,
            title: spec.title,
            message: spec.message,
            position: spec.position,
            highlight_padding: spec.highlight_padding,
            on_enter: None,
        }
    }
}

/// Declarative tour: the serializable half of a [`TourConfig`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TourSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

impl TourSpec {
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let spec: Self = toml::from_str(s)?;
        spec.into_validated()
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> ConfigResult<Self> {
        let spec: Self = serde_json::from_str(s)?;
        spec.into_validated()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_json_str(&content)
    }

    /// Check the declaration is usable. An empty list means it is.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.steps.is_empty() {
            errors.push("tour declares no steps".to_string());
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.target.trim().is_empty() {
                errors.push(format!("steps[{index}].target is empty"));
            }
            if let Some(padding) = step.highlight_padding
                && (!padding.is_finite() || padding < 0.0)
            {
                errors.push(format!(
                    "steps[{index}].highlight_padding must be non-negative, got {padding}"
                ));
            }
        }
        errors
    }

    /// Build a config without callbacks or hooks.
    #[must_use]
    pub fn into_config(self) -> TourConfig {
        TourConfig::new(self.steps.into_iter().map(TourStep::from).collect())
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
