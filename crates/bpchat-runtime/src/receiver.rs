//! Receive activity
//!
//! A spawned task that waits on the endpoint, turns every datagram into a
//! history entry and notifies the console. Receive errors are reported and
//! the loop keeps going; only the shutdown signal ends it.
//!
//! Every await point in the loop is raced against the shutdown signal, and
//! the history append between them is synchronous, so stopping the task can
//! never interrupt a history mutation.

use bpchat_core::{truncate_utf8, ChatEntry, Datagram, Endpoint, HistoryLog};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{sleep, timeout, Duration},
};
use tracing::{debug, info, warn};

// ----------------------------------------------------------------------------
// Statistics
// ----------------------------------------------------------------------------

/// Counters kept by the receive activity
///
/// Shared with the handle so they survive even if the task has to be aborted.
#[derive(Debug, Default)]
pub struct ReceiverStats {
    received: AtomicU64,
    receive_errors: AtomicU64,
}

impl ReceiverStats {
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn receive_errors(&self) -> u64 {
        self.receive_errors.load(Ordering::Relaxed)
    }
}

/// How the receive activity ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverOutcome {
    /// Observed the shutdown signal and returned
    Stopped,
    /// Did not return within the timeout and was aborted
    Aborted,
    /// Panicked or was cancelled by the runtime
    Failed(String),
}

// ----------------------------------------------------------------------------
// Receiver Task
// ----------------------------------------------------------------------------

/// Everything the receive loop needs, moved into the spawned task
pub(crate) struct ReceiverTask {
    pub endpoint: Arc<dyn Endpoint>,
    pub history: Arc<HistoryLog>,
    pub console: Arc<dyn crate::Console>,
    pub max_message_len: usize,
    pub retry_delay: Duration,
}

impl ReceiverTask {
    async fn run(self, mut shutdown: watch::Receiver<bool>, stats: Arc<ReceiverStats>) {
        let ReceiverTask {
            endpoint,
            history,
            console,
            max_message_len,
            retry_delay,
        } = self;
        info!("Receiver started on {}", endpoint.local_id());

        while !*shutdown.borrow() {
            tokio::select! {
                biased;

                _ = shutdown.changed() => break,

                result = endpoint.receive() => match result {
                    Ok(datagram) => {
                        let entry = to_entry(datagram, max_message_len);
                        let rendered = entry.render();
                        history.append(entry);
                        stats.received.fetch_add(1, Ordering::Relaxed);
                        console.notify(&rendered);
                    }
                    Err(e) => {
                        stats.receive_errors.fetch_add(1, Ordering::Relaxed);
                        warn!("Error receiving message: {}", e);
                        console.error(&format!("Error receiving message: {}", e));

                        tokio::select! {
                            biased;
                            _ = shutdown.changed() => break,
                            _ = sleep(retry_delay) => {}
                        }
                    }
                },
            }
        }

        info!("Receiver stopped");
    }
}

/// Build the history entry for an inbound datagram
///
/// The payload is decoded lossily and bounded to `max_message_len` bytes; the
/// source identifier is used as the author verbatim.
pub fn to_entry(datagram: Datagram, max_message_len: usize) -> ChatEntry {
    let text = datagram.text();
    let body = truncate_utf8(&text, max_message_len);
    debug!("Message from {} ({} bytes)", datagram.source, datagram.payload.len());
    ChatEntry::received(datagram.source, body)
}

// ----------------------------------------------------------------------------
// Receiver Handle
// ----------------------------------------------------------------------------

/// Owner side of a running receive activity
pub struct ReceiverHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
    stats: Arc<ReceiverStats>,
}

impl ReceiverHandle {
    /// Spawn the receive loop on the current tokio runtime
    pub(crate) fn spawn(task: ReceiverTask) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(ReceiverStats::default());
        let join = tokio::spawn(task.run(shutdown_rx, Arc::clone(&stats)));
        Self {
            shutdown,
            join,
            stats,
        }
    }

    pub fn stats(&self) -> Arc<ReceiverStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signal shutdown and wait up to `wait` for the loop to return
    ///
    /// If it does not return in time the task is aborted; this never waits
    /// longer than `wait`.
    pub async fn stop(mut self, wait: Duration) -> ReceiverOutcome {
        // The send only fails if the task already ended and dropped its receiver.
        let _ = self.shutdown.send(true);

        match timeout(wait, &mut self.join).await {
            Ok(Ok(())) => ReceiverOutcome::Stopped,
            Ok(Err(join_error)) => ReceiverOutcome::Failed(join_error.to_string()),
            Err(_) => {
                self.join.abort();
                ReceiverOutcome::Aborted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpchat_core::{Author, MemoryNetwork};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingConsole {
        lines: Mutex<Vec<String>>,
        block_notify: Option<Duration>,
    }

    impl crate::Console for RecordingConsole {
        fn print(&self, text: &str) {
            self.lines.lock().unwrap().push(text.to_string());
        }

        fn prompt(&self, _prompt: &str) {}

        fn notify(&self, text: &str) {
            self.print(text);
            if let Some(pause) = self.block_notify {
                std::thread::sleep(pause);
            }
        }
    }

    fn task(
        endpoint: Arc<dyn Endpoint>,
        history: Arc<HistoryLog>,
        console: Arc<RecordingConsole>,
    ) -> ReceiverTask {
        ReceiverTask {
            endpoint,
            history,
            console,
            max_message_len: 8,
            retry_delay: Duration::from_millis(5),
        }
    }

    async fn wait_for_len(history: &HistoryLog, len: usize) {
        timeout(Duration::from_secs(2), async {
            while history.len() < len {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("history did not fill in time");
    }

    #[test]
    fn test_to_entry_bounds_body() {
        let datagram = Datagram::new("alice: a long message", "ipn:2.1");
        let entry = to_entry(datagram, 8);
        assert_eq!(entry.body(), "alice: a");
        assert_eq!(entry.author(), &Author::Remote("ipn:2.1".to_string()));
    }

    #[tokio::test]
    async fn test_receiver_records_and_notifies() {
        let network = MemoryNetwork::new();
        let local: Arc<dyn Endpoint> = Arc::new(network.open("ipn:1.0").unwrap());
        let remote = network.open("ipn:2.1").unwrap();
        let history = Arc::new(HistoryLog::new(20));
        let console = Arc::new(RecordingConsole::default());

        let handle = ReceiverHandle::spawn(task(local.clone(), history.clone(), console.clone()));
        remote.send(b"yo", local.local_id()).await.unwrap();
        wait_for_len(&history, 1).await;

        assert_eq!(handle.stop(Duration::from_secs(1)).await, ReceiverOutcome::Stopped);
        let entry = history.last().unwrap();
        assert!(entry.render().ends_with("] ipn:2.1: yo"));
        assert_eq!(console.lines.lock().unwrap().as_slice(), &[entry.render()]);
    }

    #[tokio::test]
    async fn test_receive_errors_do_not_end_loop() {
        let network = MemoryNetwork::new();
        let local: Arc<dyn Endpoint> = Arc::new(network.open("ipn:1.0").unwrap());
        let remote = network.open("ipn:2.1").unwrap();
        let history = Arc::new(HistoryLog::new(20));
        let console = Arc::new(RecordingConsole::default());

        let handle = ReceiverHandle::spawn(task(local.clone(), history.clone(), console.clone()));
        network.inject_receive_error(local.local_id(), "link down").unwrap();
        network.inject_receive_error(local.local_id(), "link down").unwrap();
        remote.send(b"still here", local.local_id()).await.unwrap();
        wait_for_len(&history, 1).await;

        let stats = handle.stats();
        assert!(!handle.is_finished());
        assert_eq!(handle.stop(Duration::from_secs(1)).await, ReceiverOutcome::Stopped);
        assert_eq!(stats.receive_errors(), 2);
        assert_eq!(stats.received(), 1);
        assert_eq!(history.last().unwrap().body(), "still he");

        let lines = console.lines.lock().unwrap();
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("Error receiving message")).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_stop_while_blocked_in_receive() {
        let network = MemoryNetwork::new();
        let local: Arc<dyn Endpoint> = Arc::new(network.open("ipn:1.0").unwrap());
        let history = Arc::new(HistoryLog::new(20));
        let console = Arc::new(RecordingConsole::default());

        let handle = ReceiverHandle::spawn(task(local, history.clone(), console));
        sleep(Duration::from_millis(20)).await;

        assert_eq!(handle.stop(Duration::from_secs(1)).await, ReceiverOutcome::Stopped);
        assert!(history.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_aborts_after_timeout() {
        let network = MemoryNetwork::new();
        let local: Arc<dyn Endpoint> = Arc::new(network.open("ipn:1.0").unwrap());
        let remote = network.open("ipn:2.1").unwrap();
        let history = Arc::new(HistoryLog::new(20));
        let console = Arc::new(RecordingConsole {
            block_notify: Some(Duration::from_millis(300)),
            ..Default::default()
        });

        let handle = ReceiverHandle::spawn(task(local.clone(), history.clone(), console));
        remote.send(b"slow", local.local_id()).await.unwrap();
        wait_for_len(&history, 1).await;

        let started = std::time::Instant::now();
        let outcome = handle.stop(Duration::from_millis(20)).await;
        assert_eq!(outcome, ReceiverOutcome::Aborted);
        assert!(started.elapsed() < Duration::from_millis(250));
        // the append finished before the stall, so the entry is intact
        assert_eq!(history.snapshot().len(), 1);
    }
}
