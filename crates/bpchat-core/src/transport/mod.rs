//! Endpoint abstraction for bpchat
//!
//! The session coordinator only needs four things from a transport: open a
//! local endpoint, send a datagram to a destination, block until a datagram
//! arrives, and close. Both `send` and `receive` take `&self` so a single
//! endpoint can be shared between the receive activity and the command loop.

use async_trait::async_trait;

use crate::errors::TransportError;
use crate::types::EndpointId;

pub mod memory;
pub mod udp;

pub use memory::{MemoryEndpoint, MemoryNetwork};
pub use udp::UdpEndpoint;

// ----------------------------------------------------------------------------
// Datagram
// ----------------------------------------------------------------------------

/// One inbound message as delivered by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    /// Raw payload bytes, not guaranteed to be UTF-8
    pub payload: Vec<u8>,
    /// Identifier of the sender as reported by the transport
    pub source: String,
}

impl Datagram {
    pub fn new(payload: impl Into<Vec<u8>>, source: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            source: source.into(),
        }
    }

    /// Payload decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

// ----------------------------------------------------------------------------
// Endpoint Trait
// ----------------------------------------------------------------------------

/// A bound messaging endpoint
///
/// Opening is left to each implementation's constructor, since what an
/// identifier means is transport-specific.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Identifier this endpoint is bound to
    fn local_id(&self) -> &EndpointId;

    /// Send `payload` to `destination`, returning the number of bytes sent
    async fn send(&self, payload: &[u8], destination: &EndpointId) -> Result<usize, TransportError>;

    /// Wait for the next inbound datagram
    ///
    /// May block indefinitely. Callers that need to stop waiting must race
    /// this future against their own shutdown signal.
    async fn receive(&self) -> Result<Datagram, TransportError>;

    /// Release the endpoint's resources
    ///
    /// After closing, `send` and `receive` fail with [`TransportError::Closed`].
    /// Closing twice is not an error.
    async fn close(&self) -> Result<(), TransportError>;
}
