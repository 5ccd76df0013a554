//! Chat entries
//!
//! A `ChatEntry` is one immutable line of conversation. Entries are built at
//! the moment a message is received or successfully sent, and rendered as
//! `[<timestamp>] <author>: <body>`.

use chrono::{DateTime, Local, SubsecRound};
use core::fmt;

/// Timestamp layout used when rendering entries
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ----------------------------------------------------------------------------
// Author
// ----------------------------------------------------------------------------

/// Who wrote an entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Author {
    /// The local user
    You,
    /// A remote source, named by the identifier the transport reported
    ///
    /// This is untrusted display text and is shown exactly as received.
    Remote(String),
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::You => f.write_str("You"),
            Author::Remote(source) => f.write_str(source),
        }
    }
}

// ----------------------------------------------------------------------------
// Chat Entry
// ----------------------------------------------------------------------------

/// One logged line of conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    timestamp: DateTime<Local>,
    author: Author,
    body: String,
}

impl ChatEntry {
    /// Create an entry with an explicit timestamp
    ///
    /// The timestamp is truncated to whole seconds.
    pub fn new(author: Author, body: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            author,
            body: body.into(),
        }
    }

    /// Entry for a message the local user sent, stamped now
    pub fn sent(body: impl Into<String>) -> Self {
        Self::new(Author::You, body, Local::now())
    }

    /// Entry for a message received from `source`, stamped now
    pub fn received(source: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Author::Remote(source.into()), body, Local::now())
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the local user wrote this entry
    pub fn is_own(&self) -> bool {
        self.author == Author::You
    }

    /// Render as `[<timestamp>] <author>: <body>`
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChatEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.author,
            self.body
        )
    }
}
