//! Error types for the bench binary.

use cardflow_core::config::ConfigError;
use cardflow_observer::server::ServerError;

/// Errors that can abort bench startup.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// Configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The Observer server failed to start or crashed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: ServerError,
    },
}
