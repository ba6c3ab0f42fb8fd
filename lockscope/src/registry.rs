//! Process-wide lock statistics registry
//!
//! One [`LockRegistry`] is shared (via `Arc`) by every
//! [`InstrumentedMutex`](crate::lock::InstrumentedMutex) in the process.
//! Holders of *different* monitored locks can race to record a release at
//! the same instant, so the table carries its own lightweight `std::sync`
//! mutex, independent of any monitored lock's exclusivity. The critical
//! section here is a map insert/update; it is never held across `.await`.

// Average computation intentionally converts u64 counts to f64
#![allow(clippy::cast_precision_loss)]

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::callsite::CallSiteKey;

/// Cumulative statistics for one call site.
///
/// `count` is at least 1 once the entry exists; both cumulative fields are
/// monotonically non-decreasing for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockStat {
    pub count: u64,
    pub cumulative_wait: Duration,
    pub cumulative_hold: Duration,
}

impl LockStat {
    #[must_use]
    pub fn average_wait(&self) -> Duration {
        self.cumulative_wait.div_f64(self.count as f64)
    }

    #[must_use]
    pub fn average_hold(&self) -> Duration {
        self.cumulative_hold.div_f64(self.count as f64)
    }
}

/// Call-site → [`LockStat`] aggregate table.
///
/// Entries are created lazily on first release and live until the registry
/// is dropped at process exit. Constructed once at startup and passed
/// explicitly; there is no global instance.
#[derive(Debug, Default)]
pub struct LockRegistry {
    stats: Mutex<HashMap<CallSiteKey, LockStat>>,
}

impl LockRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one acquire/release cycle for `key`.
    pub fn record(&self, key: CallSiteKey, wait: Duration, hold: Duration) {
        // A panic while holding this mutex cannot leave the map in a bad
        // state (single insert/update), so recover from poisoning and keep
        // counting.
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = stats.entry(key).or_default();
        entry.count += 1;
        entry.cumulative_wait += wait;
        entry.cumulative_hold += hold;
    }

    /// Statistics for one call site, if any release has been recorded for it.
    #[must_use]
    pub fn get(&self, key: &CallSiteKey) -> Option<LockStat> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).get(key).copied()
    }

    /// Number of distinct call sites observed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable report: one paragraph per call site with acquisition
    /// count and average wait/hold times.
    ///
    /// Entries are sorted by key so the output is deterministic: two dumps
    /// with no intervening lock activity are byte-identical. Safe to call
    /// concurrently with live lock traffic; an in-flight release simply
    /// lands in the next dump.
    #[must_use]
    pub fn dump_stats(&self) -> String {
        let stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<(&CallSiteKey, &LockStat)> = stats.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut out = String::new();
        for (key, stat) in entries {
            out.push_str(&format!(
                "Locked {} times. Average wait time: {:.6}s Average hold time: {:.6}s.\n{}\n",
                stat.count,
                stat.average_wait().as_secs_f64(),
                stat.average_hold().as_secs_f64(),
                key,
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> CallSiteKey {
        CallSiteKey::new(s)
    }

    #[test]
    fn record_accumulates_exact_sums() {
        let registry = LockRegistry::new();
        let durations = [(10, 20), (30, 40), (5, 15)];
        for (wait_ms, hold_ms) in durations {
            registry.record(
                key("site-a"),
                Duration::from_millis(wait_ms),
                Duration::from_millis(hold_ms),
            );
        }

        let stat = registry.get(&key("site-a")).unwrap();
        assert_eq!(stat.count, 3);
        assert_eq!(stat.cumulative_wait, Duration::from_millis(45));
        assert_eq!(stat.cumulative_hold, Duration::from_millis(75));
        assert_eq!(stat.average_wait(), Duration::from_millis(15));
        assert_eq!(stat.average_hold(), Duration::from_millis(25));
    }

    #[test]
    fn distinct_call_sites_get_distinct_entries() {
        let registry = LockRegistry::new();
        registry.record(key("site-a"), Duration::ZERO, Duration::from_millis(1));
        registry.record(key("site-b"), Duration::ZERO, Duration::from_millis(2));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&key("site-a")).unwrap().count, 1);
        assert_eq!(registry.get(&key("site-b")).unwrap().count, 1);
    }

    #[test]
    fn dump_is_deterministic_without_activity() {
        let registry = LockRegistry::new();
        registry.record(key("site-b"), Duration::from_millis(2), Duration::from_millis(4));
        registry.record(key("site-a"), Duration::from_millis(1), Duration::from_millis(3));

        let first = registry.dump_stats();
        let second = registry.dump_stats();
        assert_eq!(first, second);

        // Sorted by key regardless of insertion order
        let a_pos = first.find("site-a").unwrap();
        let b_pos = first.find("site-b").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn dump_reports_count_and_averages() {
        let registry = LockRegistry::new();
        registry.record(key("site-a"), Duration::from_millis(100), Duration::from_millis(200));
        registry.record(key("site-a"), Duration::from_millis(300), Duration::from_millis(400));

        let dump = registry.dump_stats();
        assert!(dump.contains("Locked 2 times."));
        assert!(dump.contains("Average wait time: 0.200000s"));
        assert!(dump.contains("Average hold time: 0.300000s"));
        assert!(dump.contains("site-a"));
    }
}
