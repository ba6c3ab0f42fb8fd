//! Sampler loop tests with a fake profile source: contiguous numbering,
//! clean cancellation, and resilience to capture failures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use lockscope::domain::SlotId;
use lockscope::profile::{ProfileCapture, ProfileEntry, ProfileSource};
use lockscope::sampler::run_sampler;
use lockscope::store::SnapshotStore;

#[derive(Default)]
struct FakeSource {
    captures: AtomicU64,
}

impl ProfileSource for FakeSource {
    fn capture(&self) -> anyhow::Result<ProfileCapture> {
        let n = self.captures.fetch_add(1, Ordering::Relaxed);
        Ok(ProfileCapture {
            wall_secs: 0.005,
            entries: vec![ProfileEntry {
                name: format!("work_{n}"),
                calls: n + 1,
                cum_secs: 0.005,
                callers: std::collections::BTreeMap::new(),
            }],
        })
    }
}

/// Fails every second capture.
#[derive(Default)]
struct FlakySource {
    captures: AtomicU64,
}

impl ProfileSource for FlakySource {
    fn capture(&self) -> anyhow::Result<ProfileCapture> {
        let n = self.captures.fetch_add(1, Ordering::Relaxed);
        if n % 2 == 0 {
            anyhow::bail!("profiling subsystem unavailable");
        }
        Ok(ProfileCapture { wall_secs: 0.005, entries: vec![] })
    }
}

/// Count of contiguous readable slots starting at 0.
fn contiguous_slots(store: &SnapshotStore) -> u32 {
    let mut slot = SlotId::FIRST;
    while store.read(slot).unwrap().is_some() {
        slot = slot.next();
    }
    slot.0
}

#[tokio::test]
async fn sampler_writes_contiguous_slots_until_cancelled() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path()).unwrap();

    let token = CancellationToken::new();
    let task = tokio::spawn(run_sampler(
        store.clone(),
        FakeSource::default(),
        Duration::from_millis(5),
        token.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(80)).await;
    token.cancel();
    task.await.unwrap();

    let written = contiguous_slots(&store);
    assert!(written >= 2, "expected several snapshots, got {written}");

    // Every file in the directory is a complete, readable snapshot — no
    // temp files or partial writes survive cancellation.
    let files = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(files as u32, written);
}

#[tokio::test]
async fn cancellation_during_sleep_returns_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path()).unwrap();

    let token = CancellationToken::new();
    let task = tokio::spawn(run_sampler(
        store,
        FakeSource::default(),
        // Long interval: cancellation must not wait for it to elapse
        Duration::from_secs(3600),
        token.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("sampler did not stop at the sleep boundary")
        .unwrap();
}

#[tokio::test]
async fn capture_failures_do_not_end_monitoring_or_break_numbering() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path()).unwrap();

    let token = CancellationToken::new();
    let task = tokio::spawn(run_sampler(
        store.clone(),
        FlakySource::default(),
        Duration::from_millis(5),
        token.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    token.cancel();
    task.await.unwrap();

    // Half the captures failed, but everything written is contiguous from 0
    let written = contiguous_slots(&store);
    assert!(written >= 1, "expected at least one successful snapshot");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count() as u32, written);
}
