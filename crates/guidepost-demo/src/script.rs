//! Walkthrough scripts: a page layout, a declared tour and the user actions
//! to replay against it.

use std::path::Path;

use guidepost::TourSpec;
use guidepost_core::Rect;
use serde::Deserialize;

use crate::error::{DemoError, Result};

/// The script bundled with the binary.
pub const BUNDLED: &str = include_str!("../tours/intake.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct DemoScript {
    pub page: PageSpec,
    pub tour: TourSpec,
    /// Replayed in order; empty means "next through every step, then
    /// complete".
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageSpec {
    /// `[width, height]` of the viewport.
    pub viewport: [f64; 2],
    /// `[width, height]` of the scrollable document.
    #[serde(default)]
    pub document: Option<[f64; 2]>,
    /// Initial `overflow` of the scroll container.
    #[serde(default)]
    pub overflow: Option<String>,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementSpec {
    pub selector: String,
    /// `[x, y, width, height]` in document coordinates.
    pub rect: [f64; 4],
    /// Index of the step whose enter hook renders this element.
    #[serde(default)]
    pub revealed_by: Option<usize>,
}

impl ElementSpec {
    #[must_use]
    pub fn rect(&self) -> Rect {
        let [x, y, width, height] = self.rect;
        Rect::new(x, y, width, height)
    }
}

/// One simulated user action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Next,
    Previous,
    Skip,
    Complete,
    /// Press Escape.
    Escape,
    /// Spin the mouse wheel over the backdrop.
    Wheel,
    Jump(usize),
    /// Resize the viewport to `[width, height]`.
    Resize([f64; 2]),
    /// Let `ms` milliseconds pass without input.
    Wait(u64),
}

impl DemoScript {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let script: Self = toml::from_str(s)?;
        script.validate()?;
        Ok(script)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DemoError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Actions to replay, expanding the empty list to the default walk.
    #[must_use]
    pub fn resolved_actions(&self) -> Vec<Action> {
        if !self.actions.is_empty() {
            return self.actions.clone();
        }
        let mut actions = vec![Action::Next; self.tour.steps.len().saturating_sub(1)];
        actions.push(Action::Complete);
        actions
    }

    fn validate(&self) -> Result<()> {
        let errors = self.tour.validate();
        if !errors.is_empty() {
            return Err(guidepost::ConfigError::Validation(errors).into());
        }
        let [width, height] = self.page.viewport;
        if width <= 0.0 || height <= 0.0 {
            return Err(DemoError::InvalidScript {
                message: format!("viewport must be positive, got {width}x{height}"),
            });
        }
        let steps = self.tour.steps.len();
        if let Some(element) = self
            .page
            .elements
            .iter()
            .find(|e| e.revealed_by.is_some_and(|i| i >= steps))
        {
            return Err(DemoError::InvalidScript {
                message: format!(
                    "{} is revealed by step {:?} but the tour has {steps} steps",
                    element.selector, element.revealed_by
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_script_parses() {
        let script = DemoScript::from_toml_str(BUNDLED).expect("bundled script is valid");
        assert!(!script.tour.steps.is_empty());
        assert!(script.page.elements.iter().any(|e| e.revealed_by.is_some()));
    }

    #[test]
    fn empty_actions_walk_to_completion() {
        let script = DemoScript::from_toml_str(
            r##"
            [page]
            viewport = [800, 600]

            [[tour.steps]]
            target = "#a"
            title = "A"

            [[tour.steps]]
            target = "#b"
            title = "B"
            "##,
        )
        .expect("valid");
        assert_eq!(script.resolved_actions(), vec![Action::Next, Action::Complete]);
    }

    #[test]
    fn mixed_action_list() {
        let script = DemoScript::from_toml_str(
            r##"
            actions = ["next", { jump = 0 }, { resize = [1024, 768] }, { wait = 100 }, "escape"]

            [page]
            viewport = [800, 600]

            [[tour.steps]]
            target = "#a"
            title = "A"
            "##,
        )
        .expect("valid");
        assert_eq!(script.actions[1], Action::Jump(0));
        assert_eq!(script.actions[2], Action::Resize([1024.0, 768.0]));
        assert_eq!(script.actions[4], Action::Escape);
    }

    #[test]
    fn reveal_past_last_step_is_rejected() {
        let err = DemoScript::from_toml_str(
            r##"
            [page]
            viewport = [800, 600]
            elements = [{ selector = "#late", rect = [0, 0, 10, 10], revealed_by = 3 }]

            [[tour.steps]]
            target = "#late"
            title = "Late"
            "##,
        )
        .expect_err("invalid");
        assert!(matches!(err, DemoError::InvalidScript { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
