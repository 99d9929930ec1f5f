use std::path::PathBuf;

use guidepost::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("script parse error: {0}")]
    Script(#[from] toml::de::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid script: {message}")]
    InvalidScript { message: String },

    #[error("tour aborted at step {at}: {selector} not found")]
    Aborted { at: usize, selector: String },
}

impl DemoError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Aborted { .. } => 3,
            Self::InvalidScript { .. } | Self::Script(_) | Self::Config(_) => 2,
            Self::Io { .. } => 1,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
