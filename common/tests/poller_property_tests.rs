// Property-based tests for change detection over successive listings

use async_trait::async_trait;
use common::errors::StorageError;
use common::poller::{ChangePoller, SeenSet};
use common::storage::{ObjectLister, Snapshot};
use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

/// Replays a fixed list of snapshots, one per call
struct ReplayLister {
    snapshots: Mutex<VecDeque<Snapshot>>,
}

impl ReplayLister {
    fn new(snapshots: Vec<Snapshot>) -> Self {
        Self {
            snapshots: Mutex::new(snapshots.into()),
        }
    }
}

#[async_trait]
impl ObjectLister for ReplayLister {
    fn collection(&self) -> &str {
        "landing"
    }

    async fn list(&self) -> Result<Snapshot, StorageError> {
        self.snapshots
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| StorageError::HealthCheck("no more snapshots".to_string()))
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Small key space so snapshots overlap often
fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec("k[0-9]{1,2}", 0..12)
}

fn arb_cycles() -> impl Strategy<Value = Vec<Snapshot>> {
    prop::collection::vec(arb_snapshot(), 1..8)
}

fn snapshot(keys: &[&str]) -> Snapshot {
    keys.iter().map(|k| k.to_string()).collect()
}

// ============================================================================
// Property Tests
// ============================================================================

/// *For any* sequence of snapshots, every distinct key is notified exactly
/// once overall, in the cycle where it first appears.
#[test]
fn property_each_key_notified_exactly_once() {
    proptest!(|(cycles in arb_cycles())| {
        let mut seen = SeenSet::new();
        let mut notified: Vec<String> = Vec::new();
        let mut expected: Vec<String> = Vec::new();
        let mut reference: HashSet<String> = HashSet::new();

        for snapshot in &cycles {
            for key in snapshot {
                if reference.insert(key.clone()) {
                    expected.push(key.clone());
                }
            }
            notified.extend(seen.observe(snapshot.clone()));
        }

        prop_assert_eq!(&notified, &expected);
        let unique: HashSet<&String> = notified.iter().collect();
        prop_assert_eq!(unique.len(), notified.len());
    });
}

/// *For any* cycle, the seen-set grows by exactly the number of keys
/// notified in that cycle and never shrinks.
#[test]
fn property_seen_set_grows_monotonically() {
    proptest!(|(cycles in arb_cycles())| {
        let mut seen = SeenSet::new();
        let mut previous = 0usize;

        for snapshot in cycles {
            let new_keys = seen.observe(snapshot);
            prop_assert_eq!(seen.len(), previous + new_keys.len());
            prop_assert!(seen.len() >= previous);
            previous = seen.len();
        }
    });
}

/// *For any* snapshot of fresh keys, notifications follow snapshot order.
#[test]
fn property_order_preserved_within_cycle() {
    proptest!(|(keys in prop::collection::hash_set("[a-z]{1,8}/[0-9]{1,4}", 0..20))| {
        let ordered: Snapshot = keys.into_iter().collect();
        let mut seen = SeenSet::new();
        prop_assert_eq!(seen.observe(ordered.clone()), ordered);
    });
}

/// *For any* snapshot, an empty listing afterwards emits nothing and leaves
/// the seen-set untouched.
#[test]
fn property_empty_snapshot_yields_nothing() {
    proptest!(|(first in arb_snapshot())| {
        let mut seen = SeenSet::new();
        seen.observe(first);
        let before = seen.len();
        prop_assert!(seen.observe(Vec::new()).is_empty());
        prop_assert_eq!(seen.len(), before);
    });
}

/// *For any* sequence of listings, the poller and a bare seen-set agree.
#[test]
fn property_poller_matches_seen_set() {
    let rt = runtime();
    proptest!(|(cycles in arb_cycles())| {
        let mut reference = SeenSet::new();
        let mut poller = ChangePoller::new(
            ReplayLister::new(cycles.clone()),
            Duration::from_millis(1),
        );

        for snapshot in cycles {
            let expected = reference.observe(snapshot);
            let batch = rt.block_on(poller.poll_once()).unwrap();
            let keys: Vec<String> = batch.into_iter().map(|n| n.key).collect();
            prop_assert_eq!(keys, expected);
        }
        prop_assert_eq!(poller.seen().len(), reference.len());
    });
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_consecutive_snapshots_notify_shared_key_once() {
    let rt = runtime();
    let mut poller = ChangePoller::new(
        ReplayLister::new(vec![snapshot(&["a", "b"]), snapshot(&["a", "b"])]),
        Duration::from_millis(1),
    );

    let first = rt.block_on(poller.poll_once()).unwrap();
    let second = rt.block_on(poller.poll_once()).unwrap();

    assert_eq!(first.len(), 2);
    assert!(second.is_empty());
}

#[test]
fn test_disappearance_then_reappearance() {
    let rt = runtime();
    let mut poller = ChangePoller::new(
        ReplayLister::new(vec![snapshot(&["A"]), snapshot(&[]), snapshot(&["A"])]),
        Duration::from_millis(1),
    );

    let counts: Vec<usize> = (0..3)
        .map(|_| rt.block_on(poller.poll_once()).unwrap().len())
        .collect();

    assert_eq!(counts, vec![1, 0, 0]);
}

#[test]
fn test_notifications_carry_collection_name() {
    let rt = runtime();
    let mut poller = ChangePoller::new(
        ReplayLister::new(vec![snapshot(&["raw/2024/01/01.json"])]),
        Duration::from_millis(1),
    );

    let batch = rt.block_on(poller.poll_once()).unwrap();
    assert_eq!(batch[0].collection, "landing");
    assert_eq!(batch[0].to_string(), "landing--->raw/2024/01/01.json");
}
