//! In-process endpoint network
//!
//! Endpoints opened on the same `MemoryNetwork` can exchange datagrams by
//! identifier without touching the OS. Delivery is lossless and ordered per
//! sender. Any string is a valid identifier, so tests can use the same
//! `ipn:<node>.<service>` style names a bundle-protocol deployment would.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::debug;

use super::{Datagram, Endpoint};
use crate::errors::TransportError;
use crate::types::EndpointId;

#[derive(Debug)]
enum Delivery {
    Datagram(Datagram),
    Fault(String),
}

// ----------------------------------------------------------------------------
// Memory Network
// ----------------------------------------------------------------------------

/// Registry routing datagrams between in-process endpoints
#[derive(Debug, Default)]
pub struct MemoryNetwork {
    routes: Mutex<HashMap<EndpointId, mpsc::UnboundedSender<Delivery>>>,
}

impl MemoryNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bind a new endpoint at `id`
    pub fn open(self: &Arc<Self>, id: impl Into<EndpointId>) -> Result<MemoryEndpoint, TransportError> {
        let id = id.into();
        let (sender, receiver) = mpsc::unbounded_channel();
        {
            let mut routes = self.routes();
            if routes.contains_key(&id) {
                return Err(TransportError::AddressInUse {
                    endpoint: id.to_string(),
                });
            }
            routes.insert(id.clone(), sender);
        }
        debug!("Memory endpoint {} opened", id);

        Ok(MemoryEndpoint {
            local_id: id,
            network: Arc::clone(self),
            inbox: AsyncMutex::new(receiver),
            closed: AtomicBool::new(false),
        })
    }

    /// Whether an endpoint is currently bound at `id`
    pub fn is_bound(&self, id: &EndpointId) -> bool {
        self.routes().contains_key(id)
    }

    /// Make the next receive on `id` fail with `reason`
    pub fn inject_receive_error(
        &self,
        id: &EndpointId,
        reason: impl Into<String>,
    ) -> Result<(), TransportError> {
        self.deliver(id, Delivery::Fault(reason.into()))
    }

    fn deliver(&self, destination: &EndpointId, delivery: Delivery) -> Result<(), TransportError> {
        let mut routes = self.routes();
        let unknown = || TransportError::UnknownDestination {
            destination: destination.to_string(),
        };
        let sender = routes.get(destination).ok_or_else(unknown)?;
        if sender.send(delivery).is_err() {
            routes.remove(destination);
            return Err(unknown());
        }
        Ok(())
    }

    fn unregister(&self, id: &EndpointId) {
        self.routes().remove(id);
    }

    fn routes(&self) -> std::sync::MutexGuard<'_, HashMap<EndpointId, mpsc::UnboundedSender<Delivery>>> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ----------------------------------------------------------------------------
// Memory Endpoint
// ----------------------------------------------------------------------------

/// Endpoint bound on a [`MemoryNetwork`]
///
/// Closing unregisters the identifier, which also wakes any receive that is
/// waiting on an empty inbox.
#[derive(Debug)]
pub struct MemoryEndpoint {
    local_id: EndpointId,
    network: Arc<MemoryNetwork>,
    inbox: AsyncMutex<mpsc::UnboundedReceiver<Delivery>>,
    closed: AtomicBool,
}

impl MemoryEndpoint {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Endpoint for MemoryEndpoint {
    fn local_id(&self) -> &EndpointId {
        &self.local_id
    }

    async fn send(&self, payload: &[u8], destination: &EndpointId) -> Result<usize, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let datagram = Datagram::new(payload.to_vec(), self.local_id.to_string());
        self.network.deliver(destination, Delivery::Datagram(datagram))?;
        Ok(payload.len())
    }

    async fn receive(&self) -> Result<Datagram, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut inbox = self.inbox.lock().await;
        match inbox.recv().await {
            Some(Delivery::Datagram(datagram)) => Ok(datagram),
            Some(Delivery::Fault(reason)) => Err(TransportError::ReceiveFailed { reason }),
            None => Err(TransportError::Closed),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.network.unregister(&self.local_id);
            debug!("Memory endpoint {} closed", self.local_id);
        }
        Ok(())
    }
}

impl Drop for MemoryEndpoint {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.network.unregister(&self.local_id);
        }
    }
}
