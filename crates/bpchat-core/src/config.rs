//! Session configuration
//!
//! Limits and addressing shared by the session coordinator and the CLI.
//! Durations are stored in milliseconds so the struct serializes cleanly
//! into TOML and environment layers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{BpchatError, BpchatResult};
use crate::types::EndpointId;
use crate::{DEFAULT_HISTORY_CAPACITY, DEFAULT_MAX_MESSAGE_LEN};

/// Configuration for one chat session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Identifier the local endpoint binds to
    pub local_endpoint: EndpointId,
    /// Identifier every outbound message is sent to
    pub destination: EndpointId,
    /// Number of entries kept in the history log
    pub history_capacity: usize,
    /// Upper bound, in bytes, on bodies and outbound payloads
    pub max_message_len: usize,
    /// Pause after a failed receive before trying again
    pub receive_retry_delay_ms: u64,
    /// How long shutdown waits for the receive activity before aborting it
    pub shutdown_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            local_endpoint: EndpointId::new("127.0.0.1:4556"),
            destination: EndpointId::new("127.0.0.1:4557"),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            receive_retry_delay_ms: 100,
            shutdown_timeout_ms: 2_000,
        }
    }
}

impl SessionConfig {
    /// Upper bound, in bytes, on usernames
    pub fn max_username_len(&self) -> usize {
        self.max_message_len / 2
    }

    pub fn receive_retry_delay(&self) -> Duration {
        Duration::from_millis(self.receive_retry_delay_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Check the configuration for values a session cannot run with
    pub fn validate(&self) -> BpchatResult<()> {
        if self.local_endpoint.trim().is_empty() {
            return Err(BpchatError::configuration("Local endpoint must not be empty"));
        }
        if self.destination.trim().is_empty() {
            return Err(BpchatError::configuration("Destination endpoint must not be empty"));
        }
        if self.history_capacity == 0 {
            return Err(BpchatError::configuration(
                "History capacity must be greater than 0",
            ));
        }
        if self.max_message_len < 2 {
            return Err(BpchatError::configuration(
                "Maximum message length must be at least 2 bytes",
            ));
        }
        if self.shutdown_timeout_ms == 0 {
            return Err(BpchatError::configuration(
                "Shutdown timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}
