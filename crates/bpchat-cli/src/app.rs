//! bpchat application startup
//!
//! Greets the user, settles the username, binds the local endpoint and hands
//! the terminal over to a [`Session`] until it exits.

use std::io;
use std::sync::Arc;
use tracing::{debug, info, warn};

use bpchat_core::{Endpoint, UdpEndpoint};
use bpchat_runtime::{Console, LineInput, Session, SessionSummary, StdinInput};

use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::terminal::StdoutConsole;

pub const WELCOME_BANNER: &str = "Welcome to BP Messaging App!";
pub const USERNAME_PROMPT: &str = "Please enter your username: ";
pub const USAGE_HINT: &str = "Type /help for commands. Type 'exit' to quit.";

/// The bpchat terminal application
pub struct ChatApp {
    config: AppConfig,
}

impl ChatApp {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run on the process terminal
    pub async fn run(self) -> Result<SessionSummary> {
        let console: Arc<dyn Console> = Arc::new(StdoutConsole::new(self.config.cli.prompt.clone()));
        let mut input = StdinInput::new();
        self.run_with(&mut input, console).await
    }

    /// Run with the given terminal capabilities
    pub async fn run_with<I>(&self, input: &mut I, console: Arc<dyn Console>) -> Result<SessionSummary>
    where
        I: LineInput + ?Sized,
    {
        console.print(WELCOME_BANNER);
        let username = self.resolve_username(input, console.as_ref()).await?;

        let local = &self.config.session.local_endpoint;
        let endpoint = UdpEndpoint::open(local)
            .await
            .map_err(|source| CliError::Bind {
                endpoint: local.to_string(),
                source,
            })?;
        let endpoint: Arc<dyn Endpoint> = Arc::new(endpoint);
        info!("Bound local endpoint {}", endpoint.local_id());

        console.print(&format!("Bound to EID: {}", endpoint.local_id()));
        console.print(USAGE_HINT);

        let session = Session::new(
            &username,
            self.config.session.clone(),
            endpoint,
            Arc::clone(&console),
        )
        .with_prompt(self.config.cli.prompt.clone());

        let summary = session.run(input).await;
        if !summary.is_clean() {
            warn!("Session ended without a clean shutdown");
        }
        Ok(summary)
    }

    async fn resolve_username<I>(&self, input: &mut I, console: &dyn Console) -> Result<String>
    where
        I: LineInput + ?Sized,
    {
        if let Some(name) = &self.config.cli.username {
            debug!("Using configured username {}", name);
            return Ok(name.trim().to_string());
        }

        console.prompt(USERNAME_PROMPT);
        match input.read_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(CliError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a username was entered",
            ))),
        }
    }
}
