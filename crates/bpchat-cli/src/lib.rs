//! bpchat CLI library
//!
//! Terminal glue for running a bpchat session: argument parsing, layered
//! configuration, the stdin/stdout terminal and application startup.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod terminal;

pub use app::ChatApp;
pub use cli::Cli;
pub use config::{AppConfig, CliConfig, ConfigError};
pub use error::{CliError, Result};
