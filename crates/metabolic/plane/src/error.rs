//! Error types for metabolic-plane

use std::path::PathBuf;

use metabolic_types::GovernanceError;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Control plane errors
#[derive(Debug, Error)]
pub enum PlaneError {
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    /// The actor task has stopped and no longer accepts requests.
    #[error("control plane actor closed")]
    ActorClosed,
}

pub type PlaneResult<T> = Result<T, PlaneError>;
