//! Periodic sampler
//!
//! A long-lived background task that persists one execution-profile snapshot
//! per interval. The interval sleep is the task's only suspension point, and
//! cancellation is only observed there — never mid-write — so a cancelled
//! sampler leaves either a complete snapshot or none, matching the store's
//! atomicity guarantee.

use std::time::Duration;

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::domain::SlotId;
use crate::profile::ProfileSource;
use crate::store::SnapshotStore;

/// Reference sampling cadence: one snapshot per second.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Run the sampling loop until `token` is cancelled.
///
/// Each wake captures the preceding interval from `source` and writes it to
/// the next sequence number, starting at slot 0. A capture or write failure
/// is logged and the loop continues — losing one snapshot must not end
/// monitoring — and the sequence number is not advanced on failure, so the
/// contiguous numbering the analyzer depends on never gains a hole.
/// Cancellation is the designed shutdown path and returns normally.
pub async fn run_sampler<S: ProfileSource>(
    store: SnapshotStore,
    source: S,
    interval: Duration,
    token: CancellationToken,
) {
    info!("Starting profiler. Saving snapshots to {}", store.dir().display());

    let mut slot = SlotId::FIRST;
    loop {
        tokio::select! {
            () = token.cancelled() => {
                info!("Profiler stopped before slot {slot}");
                return;
            }
            () = tokio::time::sleep(interval) => {}
        }

        let capture = match source.capture() {
            Ok(capture) => capture,
            Err(err) => {
                warn!("Failed to capture profile for slot {slot}: {err:#}");
                continue;
            }
        };

        match store.write(slot, &capture) {
            Ok(()) => {
                debug!("Saved snapshot {slot}");
                slot = slot.next();
            }
            Err(err) => {
                warn!("Failed to save snapshot {slot}: {err}");
            }
        }
    }
}
