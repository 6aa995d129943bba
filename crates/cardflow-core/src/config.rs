//! Configuration loading and typed config structures for the Cardflow
//! bench.
//!
//! The canonical configuration lives in `cardflow-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure, and provides a loader that reads the file and
//! applies environment overrides.

use std::path::Path;

use cardflow_types::ViewMode;
use serde::Deserialize;

use crate::session::SessionConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level application configuration.
///
/// Mirrors the structure of `cardflow-config.yaml`. All fields have
/// defaults, so an empty or missing file yields a working setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Defaults newly created sessions start with.
    #[serde(default)]
    pub session: SessionSection,
}

impl AppConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `CARDFLOW_PORT` in the environment overrides `server.port`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.server.apply_env_overrides();
        Ok(config)
    }

    /// The session defaults expressed as a [`SessionConfig`].
    pub const fn session_defaults(&self) -> SessionConfig {
        SessionConfig {
            participant_count: self.session.participant_count,
            step_interval_ms: self.session.step_interval_ms,
            view_mode: self.session.view_mode,
            randomized_start: self.session.randomized_start,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSection {
    /// Override the port from `CARDFLOW_PORT` when set and numeric.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CARDFLOW_PORT")
            && let Ok(port) = val.parse::<u16>()
        {
            self.port = port;
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Defaults for newly created sessions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSection {
    /// Participants at the table.
    #[serde(default = "default_participant_count")]
    pub participant_count: u8,

    /// Milliseconds between transitions (0 = unthrottled).
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,

    /// Initial presentation mode.
    #[serde(default)]
    pub view_mode: ViewMode,

    /// Whether each run opens from a random seat.
    #[serde(default = "default_true")]
    pub randomized_start: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            participant_count: default_participant_count(),
            step_interval_ms: default_step_interval_ms(),
            view_mode: ViewMode::Observer,
            randomized_start: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_participant_count() -> u8 {
    5
}

const fn default_step_interval_ms() -> u64 {
    1000
}

const fn default_true() -> bool {
    true
}
