//! bpchat Runtime
//!
//! This crate runs one chat session on top of `bpchat-core`:
//! - `Session`: the coordinator owning the history log, the command loop
//!   and shutdown
//! - `ReceiverHandle`: the background receive activity
//! - `Command`: the local command language
//! - `Console` / `LineInput`: the terminal capabilities a session needs
//!
//! Terminal and transport implementations are supplied by the caller.

pub mod command;
pub mod console;
pub mod receiver;
pub mod session;

pub use command::{Command, HELP_TEXT};
pub use console::{Console, LineInput, StdinInput};
pub use receiver::{ReceiverHandle, ReceiverOutcome, ReceiverStats};
pub use session::{Session, SessionState, SessionSummary, DEFAULT_PROMPT};

// Re-export core types for convenience
pub use bpchat_core::{
    Author, BpchatError, BpchatResult, ChatEntry, Datagram, Endpoint, EndpointId, HistoryLog,
    SessionConfig, TransportError,
};
