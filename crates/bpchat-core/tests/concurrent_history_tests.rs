//! Concurrency tests for the history log
//!
//! Several producers append while readers take snapshots. Every snapshot must
//! be within capacity and show each producer's entries in the order that
//! producer appended them; after the producers finish, nothing is lost or
//! duplicated.

use bpchat_core::{ChatEntry, HistoryLog};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const PRODUCERS: usize = 8;
const PER_PRODUCER: usize = 250;

fn parse_body(entry: &ChatEntry) -> (usize, usize) {
    let (producer, seq) = entry.body().split_once('-').expect("producer-seq body");
    (producer.parse().unwrap(), seq.parse().unwrap())
}

fn assert_snapshot_consistent(snapshot: &[ChatEntry], capacity: usize) {
    assert!(snapshot.len() <= capacity, "snapshot exceeded capacity");
    let mut last_seen: HashMap<usize, usize> = HashMap::new();
    for entry in snapshot {
        let (producer, seq) = parse_body(entry);
        if let Some(previous) = last_seen.insert(producer, seq) {
            assert!(previous < seq, "producer {} out of order", producer);
        }
    }
}

#[test]
fn test_concurrent_appends_lose_nothing() {
    let capacity = PRODUCERS * PER_PRODUCER;
    let log = Arc::new(HistoryLog::new(capacity));
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let log = Arc::clone(&log);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut snapshots = 0usize;
            while !done.load(Ordering::SeqCst) {
                assert_snapshot_consistent(&log.snapshot(), capacity);
                snapshots += 1;
            }
            snapshots
        })
    };

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    log.append(ChatEntry::received("peer", format!("{}-{}", producer, seq)));
                }
            })
        })
        .collect();

    for handle in producers {
        handle.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    reader.join().unwrap();

    let snapshot = log.snapshot();
    assert_eq!(snapshot.len(), PRODUCERS * PER_PRODUCER);
    assert_snapshot_consistent(&snapshot, capacity);

    let unique: HashSet<_> = snapshot.iter().map(parse_body).collect();
    assert_eq!(unique.len(), PRODUCERS * PER_PRODUCER);
}

#[test]
fn test_concurrent_appends_under_eviction() {
    let capacity = 20;
    let log = Arc::new(HistoryLog::new(capacity));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    log.append(ChatEntry::received("peer", format!("{}-{}", producer, seq)));
                    assert_snapshot_consistent(&log.snapshot(), capacity);
                }
            })
        })
        .collect();

    for handle in producers {
        handle.join().unwrap();
    }

    assert_eq!(log.len(), capacity);
    assert_snapshot_consistent(&log.snapshot(), capacity);
}

#[test]
fn test_clear_racing_appends_keeps_order() {
    let log = Arc::new(HistoryLog::new(64));

    let producers: Vec<_> = (0..4)
        .map(|producer| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for seq in 0..500 {
                    log.append(ChatEntry::received("peer", format!("{}-{}", producer, seq)));
                }
            })
        })
        .collect();

    let clearer = {
        let log = Arc::clone(&log);
        thread::spawn(move || {
            for _ in 0..100 {
                log.clear();
                assert_snapshot_consistent(&log.snapshot(), 64);
            }
        })
    };

    for handle in producers {
        handle.join().unwrap();
    }
    clearer.join().unwrap();

    assert_snapshot_consistent(&log.snapshot(), 64);
    log.clear();
    assert!(log.snapshot().is_empty());
}
