//! Standard output console
//!
//! Chat output goes to stdout and errors to stderr. Lines that arrive while
//! the user is typing are printed on a fresh line and followed by the prompt
//! again, so the input line stays visible.

use std::io::{self, Write};

use bpchat_runtime::Console;

/// Console backed by the process's stdout and stderr
pub struct StdoutConsole {
    prompt: String,
}

impl StdoutConsole {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }

    fn write(mut out: impl Write, text: &str) {
        // Write failures on a closed terminal are ignored.
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

impl Console for StdoutConsole {
    fn print(&self, text: &str) {
        Self::write(io::stdout().lock(), &format!("{text}\n"));
    }

    fn prompt(&self, prompt: &str) {
        Self::write(io::stdout().lock(), prompt);
    }

    fn notify(&self, text: &str) {
        Self::write(io::stdout().lock(), &format!("\n{text}\n{}", self.prompt));
    }

    fn error(&self, text: &str) {
        Self::write(io::stderr().lock(), &format!("{text}\n"));
    }
}
