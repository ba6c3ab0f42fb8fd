//! Demo application for lockscope instrumentation
//!
//! Spawns tasks contending for one instrumented mutex while the periodic
//! sampler persists synthetic execution-profile snapshots, then dumps the
//! per-call-site statistics.
//!
//! Run with: cargo run --example contended
//! Analyze with: cargo run -- ./demo-profile

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use lockscope::lock::InstrumentedMutex;
use lockscope::profile::{ProfileCapture, ProfileEntry, ProfileSource};
use lockscope::registry::LockRegistry;
use lockscope::sampler::{run_sampler, DEFAULT_INTERVAL};
use lockscope::store::SnapshotStore;

/// Synthetic profile source standing in for the real profiling subsystem.
/// Each capture covers the wall time since the previous one and attributes
/// a varying share of it to an idle marker, so the analyzed timeline shows
/// a sweep of busy percentages.
struct SyntheticSource {
    last: Mutex<Instant>,
    ticks: AtomicU64,
}

impl SyntheticSource {
    fn new() -> Self {
        SyntheticSource { last: Mutex::new(Instant::now()), ticks: AtomicU64::new(0) }
    }
}

impl ProfileSource for SyntheticSource {
    fn capture(&self) -> anyhow::Result<ProfileCapture> {
        let now = Instant::now();
        let wall = {
            let mut last = self.last.lock().expect("source clock");
            let wall = now.duration_since(*last).as_secs_f64();
            *last = now;
            wall
        };

        let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
        let idle = wall * f64::from(u32::try_from(tick % 10).expect("mod 10")) / 10.0;
        let busy = wall - idle;

        Ok(ProfileCapture {
            wall_secs: wall,
            entries: vec![
                ProfileEntry {
                    name: "epoll_wait".into(),
                    calls: 100,
                    cum_secs: idle,
                    callers: std::collections::BTreeMap::new(),
                },
                ProfileEntry {
                    name: "demo::update_state".into(),
                    calls: 20,
                    cum_secs: busy,
                    callers: std::collections::BTreeMap::from([("main".to_string(), busy)]),
                },
            ],
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let store = SnapshotStore::open("./demo-profile")?;
    let token = CancellationToken::new();
    let sampler =
        tokio::spawn(run_sampler(store, SyntheticSource::new(), DEFAULT_INTERVAL, token.clone()));

    let registry = Arc::new(LockRegistry::new());
    let state = Arc::new(InstrumentedMutex::new("demo-state", 0u64, Arc::clone(&registry)));

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                for _ in 0..20 {
                    let mut guard = state.lock().await;
                    *guard += 1;
                    // Hold the lock while "working" so other tasks queue up
                    sleep(Duration::from_millis(25 + worker * 10)).await;
                    drop(guard);
                    sleep(Duration::from_millis(5)).await;
                }
            })
        })
        .collect();

    for worker in workers {
        worker.await?;
    }

    token.cancel();
    sampler.await?;

    println!("final counter: {}", *state.lock().await);
    println!("{}", registry.dump_stats());
    println!("snapshots saved to ./demo-profile — analyze with: cargo run -- ./demo-profile");
    Ok(())
}
