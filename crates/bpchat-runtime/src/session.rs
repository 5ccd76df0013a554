//! Session coordinator
//!
//! A `Session` owns the history log for its lifetime and runs two activities
//! against one endpoint: the spawned receive loop and the command loop on the
//! caller's task. The command loop drives the lifecycle
//! (`Running` → `Exiting`); once it ends, shutdown stops the receiver within
//! a bounded wait and closes the endpoint.

use bpchat_core::{truncate_utf8, ChatEntry, Endpoint, HistoryLog, SessionConfig};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::command::{Command, HELP_TEXT};
use crate::console::{Console, LineInput};
use crate::receiver::{ReceiverHandle, ReceiverOutcome, ReceiverTask};

/// Prompt shown before each input line
pub const DEFAULT_PROMPT: &str = ">>> ";

// ----------------------------------------------------------------------------
// Session State
// ----------------------------------------------------------------------------

/// Lifecycle of a session; `Exiting` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Exiting,
}

/// What happened during a session, returned once it has shut down
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub messages_sent: u64,
    pub send_failures: u64,
    pub messages_received: u64,
    pub receive_errors: u64,
    /// Receiver observed the shutdown signal within the timeout
    pub receiver_stopped: bool,
    /// Endpoint closed without error
    pub endpoint_closed: bool,
}

impl SessionSummary {
    pub fn is_clean(&self) -> bool {
        self.receiver_stopped && self.endpoint_closed
    }
}

// ----------------------------------------------------------------------------
// Session
// ----------------------------------------------------------------------------

/// One interactive chat session
pub struct Session {
    username: String,
    config: SessionConfig,
    endpoint: Arc<dyn Endpoint>,
    history: Arc<HistoryLog>,
    console: Arc<dyn Console>,
    prompt: String,
    state: SessionState,
    messages_sent: u64,
    send_failures: u64,
}

impl Session {
    /// Create a session for `username` over an already opened endpoint
    ///
    /// The username is bounded to half the maximum message length.
    pub fn new(
        username: &str,
        config: SessionConfig,
        endpoint: Arc<dyn Endpoint>,
        console: Arc<dyn Console>,
    ) -> Self {
        let username = truncate_utf8(username, config.max_username_len()).to_string();
        let history = Arc::new(HistoryLog::new(config.history_capacity));
        Self {
            username,
            config,
            endpoint,
            history,
            console,
            prompt: DEFAULT_PROMPT.to_string(),
            state: SessionState::Running,
            messages_sent: 0,
            send_failures: 0,
        }
    }

    /// Replace the input prompt
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Shared handle to the session's history log
    pub fn history(&self) -> Arc<HistoryLog> {
        Arc::clone(&self.history)
    }

    /// Run the session until the user exits or input ends, then shut down
    pub async fn run<I>(mut self, input: &mut I) -> SessionSummary
    where
        I: LineInput + ?Sized,
    {
        info!(
            "Session for {} on {} -> {}",
            self.username,
            self.endpoint.local_id(),
            self.config.destination
        );

        let receiver = ReceiverHandle::spawn(ReceiverTask {
            endpoint: Arc::clone(&self.endpoint),
            history: Arc::clone(&self.history),
            console: Arc::clone(&self.console),
            max_message_len: self.config.max_message_len,
            retry_delay: self.config.receive_retry_delay(),
        });

        while self.state == SessionState::Running {
            self.console.prompt(&self.prompt);
            match input.read_line().await {
                Ok(Some(line)) => {
                    self.handle_line(&line).await;
                }
                Ok(None) => {
                    debug!("Input closed");
                    self.exit();
                }
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    self.console.error(&format!("Failed to read input: {}", e));
                    self.exit();
                }
            }
        }

        self.shutdown(receiver).await
    }

    /// Interpret one input line
    ///
    /// Returns the state after the line; lines received after exiting are
    /// ignored.
    pub async fn handle_line(&mut self, line: &str) -> SessionState {
        if self.state == SessionState::Exiting {
            return self.state;
        }

        let line = line.trim_end_matches(['\n', '\r']);
        match Command::parse(line) {
            Command::Exit => self.exit(),
            Command::Help => self.console.print(HELP_TEXT),
            Command::Clear => {
                self.history.clear();
                self.console.print("Chat history cleared.");
            }
            Command::History => self.console.print(&self.history.render()),
            Command::Send(message) => {
                let body = truncate_utf8(message, self.config.max_message_len).to_string();
                self.send_message(body).await;
            }
        }
        self.state
    }

    fn exit(&mut self) {
        self.console.print("Exiting...");
        self.state = SessionState::Exiting;
    }

    async fn send_message(&mut self, body: String) {
        let full_message = format!("{}: {}", self.username, body);
        let payload = truncate_utf8(&full_message, self.config.max_message_len);

        match self
            .endpoint
            .send(payload.as_bytes(), &self.config.destination)
            .await
        {
            Ok(sent) => {
                debug!("Sent {} bytes to {}", sent, self.config.destination);
                self.messages_sent += 1;
                self.history.append(ChatEntry::sent(body));
            }
            Err(e) => {
                warn!("Failed to send message to {}: {}", self.config.destination, e);
                self.send_failures += 1;
                self.console.error(&format!("Failed to send message: {}", e));
            }
        }
    }

    async fn shutdown(self, receiver: ReceiverHandle) -> SessionSummary {
        let stats = receiver.stats();
        let wait = self.config.shutdown_timeout();

        let receiver_stopped = match receiver.stop(wait).await {
            ReceiverOutcome::Stopped => true,
            ReceiverOutcome::Aborted => {
                warn!("Receiver did not stop within {:?}, aborted", wait);
                self.console
                    .error(&format!("Receiver did not stop within {:?}; aborted", wait));
                false
            }
            ReceiverOutcome::Failed(reason) => {
                warn!("Receiver ended abnormally: {}", reason);
                self.console
                    .error(&format!("Receiver ended abnormally: {}", reason));
                false
            }
        };

        let endpoint_closed = match self.endpoint.close().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to close endpoint: {}", e);
                self.console.error(&format!("Failed to close endpoint: {}", e));
                false
            }
        };

        let summary = SessionSummary {
            messages_sent: self.messages_sent,
            send_failures: self.send_failures,
            messages_received: stats.received(),
            receive_errors: stats.receive_errors(),
            receiver_stopped,
            endpoint_closed,
        };
        info!("Session ended: {:?}", summary);
        summary
    }
}
