//! UDP endpoint
//!
//! Endpoint identifiers are `host:port` strings. The source identifier of an
//! inbound datagram is the sender's socket address.

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, trace};

use super::{Datagram, Endpoint};
use crate::errors::TransportError;
use crate::types::EndpointId;

/// Largest payload a single IPv4 UDP datagram can carry
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// Datagram endpoint backed by a tokio UDP socket
#[derive(Debug)]
pub struct UdpEndpoint {
    local_id: EndpointId,
    local_addr: SocketAddr,
    socket: RwLock<Option<Arc<UdpSocket>>>,
    max_datagram_len: usize,
}

impl UdpEndpoint {
    /// Bind a socket to `local`
    pub async fn open(local: &EndpointId) -> Result<Self, TransportError> {
        Self::open_with_buffer(local, MAX_UDP_PAYLOAD).await
    }

    /// Bind a socket to `local`, truncating inbound datagrams to `max_datagram_len` bytes
    pub async fn open_with_buffer(
        local: &EndpointId,
        max_datagram_len: usize,
    ) -> Result<Self, TransportError> {
        let addr = resolve(local).await?;
        let socket = UdpSocket::bind(addr).await.map_err(|e| match e.kind() {
            io::ErrorKind::AddrInUse => TransportError::AddressInUse {
                endpoint: local.to_string(),
            },
            _ => TransportError::Io(e),
        })?;
        let local_addr = socket.local_addr()?;
        debug!("UDP endpoint bound to {}", local_addr);

        Ok(Self {
            local_id: EndpointId::new(local_addr.to_string()),
            local_addr,
            socket: RwLock::new(Some(Arc::new(socket))),
            max_datagram_len: max_datagram_len.max(1),
        })
    }

    /// Socket address actually bound, useful when opened on port 0
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn socket(&self) -> Result<Arc<UdpSocket>, TransportError> {
        self.socket
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(TransportError::Closed)
    }
}

#[async_trait]
impl Endpoint for UdpEndpoint {
    fn local_id(&self) -> &EndpointId {
        &self.local_id
    }

    async fn send(&self, payload: &[u8], destination: &EndpointId) -> Result<usize, TransportError> {
        let socket = self.socket()?;
        let addr = resolve(destination).await?;
        let sent = socket.send_to(payload, addr).await?;
        trace!("Sent {} bytes to {}", sent, addr);
        Ok(sent)
    }

    async fn receive(&self) -> Result<Datagram, TransportError> {
        let socket = self.socket()?;
        let mut buffer = vec![0u8; self.max_datagram_len];
        let (received, source) = socket.recv_from(&mut buffer).await?;
        buffer.truncate(received);
        trace!("Received {} bytes from {}", received, source);
        Ok(Datagram::new(buffer, source.to_string()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        let socket = self
            .socket
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if socket.is_some() {
            debug!("UDP endpoint {} closed", self.local_addr);
        }
        Ok(())
    }
}

async fn resolve(id: &EndpointId) -> Result<SocketAddr, TransportError> {
    let mut addrs = lookup_host(id.as_str())
        .await
        .map_err(|e| TransportError::invalid_endpoint(id.as_str(), e.to_string()))?;
    addrs
        .next()
        .ok_or_else(|| TransportError::invalid_endpoint(id.as_str(), "no address resolved"))
}
