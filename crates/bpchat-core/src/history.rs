//! Bounded chat history
//!
//! `HistoryLog` is the single source of truth for what has been said during a
//! session. It is shared between the receive activity and the command loop,
//! so every operation takes the one internal lock for its whole duration:
//! appends, clears and snapshots are mutually exclusive and never observe a
//! partially evicted sequence.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::entry::ChatEntry;
use crate::DEFAULT_HISTORY_CAPACITY;

/// Header line of a rendered history section
pub const HISTORY_HEADER: &str = "=== Chat History ===";
/// Footer line of a rendered history section
pub const HISTORY_FOOTER: &str = "====================";

// ----------------------------------------------------------------------------
// History Log
// ----------------------------------------------------------------------------

/// Capacity-bounded FIFO of chat entries, oldest first
///
/// Appending at capacity evicts exactly the oldest entry. Eviction is driven
/// by insertion order only; reading never changes what gets evicted.
#[derive(Debug)]
pub struct HistoryLog {
    capacity: usize,
    entries: Mutex<VecDeque<ChatEntry>>,
}

impl HistoryLog {
    /// Create an empty log holding at most `capacity` entries
    ///
    /// A zero capacity yields a log that never holds anything.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Maximum number of entries retained
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Add `entry` as the newest item, evicting the oldest when full
    pub fn append(&self, entry: ChatEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Point-in-time copy of the log, oldest first
    pub fn snapshot(&self) -> Vec<ChatEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Newest entry, if any
    pub fn last(&self) -> Option<ChatEntry> {
        self.lock().back().cloned()
    }

    /// Printable history section built from a single snapshot
    pub fn render(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = String::with_capacity(64 + snapshot.len() * 80);
        out.push('\n');
        out.push_str(HISTORY_HEADER);
        out.push('\n');
        for entry in &snapshot {
            out.push_str(&entry.render());
            out.push('\n');
        }
        out.push_str(HISTORY_FOOTER);
        out
    }

    // Every operation leaves the deque valid before it can panic, so a
    // poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, VecDeque<ChatEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Author;
    use chrono::{Local, TimeZone};

    fn entry(body: &str) -> ChatEntry {
        let ts = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        ChatEntry::new(Author::Remote("ipn:2.1".to_string()), body, ts)
    }

    fn bodies(log: &HistoryLog) -> Vec<String> {
        log.snapshot().iter().map(|e| e.body().to_string()).collect()
    }

    #[test]
    fn test_new_log_is_empty() {
        let log = HistoryLog::default();
        assert!(log.is_empty());
        assert_eq!(log.capacity(), 20);
        assert!(log.snapshot().is_empty());
        assert!(log.last().is_none());
    }

    #[test]
    fn test_append_preserves_order() {
        let log = HistoryLog::new(5);
        log.append(entry("a"));
        log.append(entry("b"));
        log.append(entry("c"));
        assert_eq!(bodies(&log), vec!["a", "b", "c"]);
        assert_eq!(log.last().map(|e| e.body().to_string()), Some("c".to_string()));
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let log = HistoryLog::new(3);
        for body in ["A", "B", "C", "D"] {
            log.append(entry(body));
        }
        assert_eq!(bodies(&log), vec!["B", "C", "D"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_reads_do_not_affect_eviction() {
        let log = HistoryLog::new(2);
        log.append(entry("first"));
        log.append(entry("second"));
        // touch the oldest entry repeatedly; it must still be evicted next
        for _ in 0..3 {
            let _ = log.snapshot();
        }
        log.append(entry("third"));
        assert_eq!(bodies(&log), vec!["second", "third"]);
    }

    #[test]
    fn test_clear_empties_log() {
        let log = HistoryLog::new(3);
        log.append(entry("a"));
        log.append(entry("b"));
        log.clear();
        assert!(log.snapshot().is_empty());

        // clearing an empty log is fine, and the log stays usable
        log.clear();
        log.append(entry("c"));
        assert_eq!(bodies(&log), vec!["c"]);
    }

    #[test]
    fn test_zero_capacity_holds_nothing() {
        let log = HistoryLog::new(0);
        log.append(entry("a"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_render_section() {
        let log = HistoryLog::new(3);
        log.append(entry("hello"));
        let rendered = log.render();
        assert_eq!(
            rendered,
            "\n=== Chat History ===\n[2024-01-01 12:00:00] ipn:2.1: hello\n===================="
        );
    }

    #[test]
    fn test_render_empty_section() {
        let log = HistoryLog::new(3);
        assert_eq!(log.render(), "\n=== Chat History ===\n====================");
    }
}
