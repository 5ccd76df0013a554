//! bpchat Core
//!
//! Foundational pieces of the bpchat messaging client:
//! - `ChatEntry`: one timestamped, authored line of conversation
//! - `HistoryLog`: the bounded FIFO of entries shared between activities
//! - `Endpoint`: the datagram transport capability, with UDP and in-memory
//!   implementations
//! - `SessionConfig`: limits and addressing for one chat session
//!
//! The session coordinator that drives these lives in `bpchat-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod entry;
pub mod errors;
pub mod history;
pub mod transport;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::SessionConfig;
pub use entry::{Author, ChatEntry};
pub use errors::{BpchatError, BpchatResult, TransportError};
pub use history::HistoryLog;
pub use transport::{Datagram, Endpoint, MemoryEndpoint, MemoryNetwork, UdpEndpoint};
pub use types::{truncate_utf8, EndpointId};

/// Default number of entries kept in the history log
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Default upper bound, in bytes, on message bodies and outbound payloads
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 256;
