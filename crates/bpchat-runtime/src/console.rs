//! Terminal capabilities used by a session
//!
//! `Console` is shared by both activities, so it takes `&self`; the receive
//! activity uses `notify` for lines that arrive while the user is typing.
//! `LineInput` is owned by the command loop alone.

use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;

/// Line-oriented output
pub trait Console: Send + Sync {
    /// Print a line
    fn print(&self, text: &str);

    /// Show the input prompt without a trailing newline
    fn prompt(&self, prompt: &str);

    /// Print a line that arrived asynchronously
    fn notify(&self, text: &str) {
        self.print(text);
    }

    /// Print a human-readable error
    fn error(&self, text: &str) {
        self.print(text);
    }
}

/// Blocking line source for the command loop
#[async_trait]
pub trait LineInput: Send {
    /// Next line without its terminator, or `None` at end of input
    async fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Lines fed from another task, ending when every sender is dropped
#[async_trait]
impl LineInput for mpsc::Receiver<String> {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.recv().await)
    }
}

/// Lines read from the process's standard input
pub struct StdinInput {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineInput for StdinInput {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }
}
