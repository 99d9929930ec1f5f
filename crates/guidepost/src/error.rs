use std::path::PathBuf;

use thiserror::Error;

/// Why a step's target could not be turned into geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("target not found: {selector}")]
    TargetNotFound { selector: String },

    #[error("composite target {selector} is incomplete (missing {missing})")]
    CompositeIncomplete { selector: String, missing: String },
}

impl ResolveError {
    /// The step selector that failed to resolve.
    #[must_use]
    pub fn selector(&self) -> &str {
        match self {
            Self::TargetNotFound { selector } | Self::CompositeIncomplete { selector, .. } => {
                selector
            }
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors from loading tour settings or declared tours.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
