//! Error handling for the bpchat CLI

use thiserror::Error;

use crate::config::ConfigError;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("bpchat core error: {0}")]
    Core(#[from] bpchat_core::BpchatError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bind failed for {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: bpchat_core::TransportError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
