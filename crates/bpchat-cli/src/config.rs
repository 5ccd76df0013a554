//! bpchat CLI Configuration Management
//!
//! Configuration is layered with figment, lowest priority first:
//! 1. Built-in defaults
//! 2. `bpchat.toml` in the working directory
//! 3. `~/.bpchat/config.toml`
//! 4. An explicit `--config` file
//! 5. Environment variables (`BPCHAT_SESSION__HISTORY_CAPACITY=50`)
//! 6. Command line arguments

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use bpchat_core::SessionConfig;
use bpchat_runtime::DEFAULT_PROMPT;

use crate::cli::Cli;

// ----------------------------------------------------------------------------
// CLI Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for the bpchat binary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Session limits and addressing
    pub session: SessionConfig,

    /// Terminal behavior
    pub cli: CliConfig,
}

/// CLI-specific configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Display name; the user is prompted when unset
    pub username: Option<String>,

    /// Prompt shown before each input line
    pub prompt: String,

    /// Enable verbose logging output
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            username: None,
            prompt: DEFAULT_PROMPT.to_string(),
            verbose: false,
        }
    }
}

// ----------------------------------------------------------------------------
// Configuration Loading Logic
// ----------------------------------------------------------------------------

impl AppConfig {
    /// Load configuration from every layer, applying `cli` last
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file("bpchat.toml"));

        if let Some(path) = Self::default_config_path() {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = &cli.config {
            Self::require_file(path)?;
            figment = figment.merge(Toml::file(path));
        }

        let figment = figment.merge(Env::prefixed("BPCHAT_").split("__"));
        Self::extract(Self::apply_overrides(figment, cli))
    }

    /// Load configuration from a single file on top of the defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::require_file(path.as_ref())?;
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()));
        Self::extract(figment)
    }

    /// `~/.bpchat/config.toml`, when a home directory is known
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".bpchat").join("config.toml"))
    }

    fn apply_overrides(mut figment: Figment, cli: &Cli) -> Figment {
        if let Some(local) = &cli.local {
            figment = figment.merge(("session.local_endpoint", local));
        }
        if let Some(dest) = &cli.dest {
            figment = figment.merge(("session.destination", dest));
        }
        if let Some(size) = cli.history_size {
            figment = figment.merge(("session.history_capacity", size));
        }
        if let Some(name) = &cli.name {
            figment = figment.merge(("cli.username", name));
        }
        if cli.verbose {
            figment = figment.merge(("cli.verbose", true));
        }
        figment
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: AppConfig = figment.extract().map_err(|e| {
            let from_env = e
                .metadata
                .as_ref()
                .is_some_and(|m| m.name.contains("environment"));
            if from_env {
                ConfigError::Environment(e.to_string())
            } else {
                ConfigError::Loading(e.to_string())
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    fn require_file(path: &Path) -> Result<(), ConfigError> {
        if path.is_file() {
            Ok(())
        } else {
            Err(ConfigError::FileSystem(format!(
                "Config file not found: {}",
                path.display()
            )))
        }
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if let Some(name) = &self.cli.username {
            if name.contains('\n') {
                return Err(ConfigError::Validation(
                    "Username must be a single line".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialization(e.to_string()))
    }
}

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {0}")]
    Loading(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
