//! Error types for bpchat
//!
//! The history log is infallible and has no errors of its own. Everything
//! that can fail lives at the transport boundary or in configuration.

// ----------------------------------------------------------------------------
// Transport Errors
// ----------------------------------------------------------------------------

/// Failures reported by an [`Endpoint`](crate::transport::Endpoint)
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Endpoint is closed")]
    Closed,
    #[error("No endpoint reachable at {destination}")]
    UnknownDestination { destination: String },
    #[error("Endpoint {endpoint} is already bound")]
    AddressInUse { endpoint: String },
    #[error("Invalid endpoint identifier {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("Receive failed: {reason}")]
    ReceiveFailed { reason: String },
}

impl TransportError {
    /// Create an invalid endpoint error
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

// ----------------------------------------------------------------------------
// Main Error Type
// ----------------------------------------------------------------------------

/// Top-level error for bpchat core operations
#[derive(Debug, thiserror::Error)]
pub enum BpchatError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BpchatError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Result alias for bpchat core operations
pub type BpchatResult<T> = Result<T, BpchatError>;
