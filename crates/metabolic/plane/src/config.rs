//! Configuration for metabolic-plane

use std::path::Path;

use metabolic_types::{Epoch, ParameterMesh};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Main control plane configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneConfig {
    /// Identity of the local node
    #[serde(default = "default_node_id")]
    pub node_id: String,

    /// Epoch the clock starts at
    #[serde(default)]
    pub start_epoch: Epoch,

    /// Governed values and control plane constants
    #[serde(default)]
    pub mesh: ParameterMesh,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            start_epoch: 0,
            mesh: ParameterMesh::default(),
            log: LogConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level or `EnvFilter` directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_node_id() -> String {
    "local".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PlaneConfig {
    /// Load configuration from a TOML file. No path, or a path that does not
    /// exist, yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found; using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_id.trim().is_empty() {
            return Err(ConfigError::Invalid("node_id must not be empty".into()));
        }
        self.mesh
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
