//! Execution-profile snapshot model
//!
//! A [`ProfileCapture`] is one interval's worth of whole-process call/time
//! statistics: the wall-clock time the interval covered and, per observed
//! function, call count, cumulative time, and caller attribution. The data
//! is produced by a [`ProfileSource`] (the profiling subsystem is an
//! external collaborator; this crate only defines the fields it consumes)
//! and serialized to JSON by the snapshot store.
//!
//! The analyzer derives "idle" time from the capture: the cumulative time of
//! entries representing the process blocked waiting for the next external
//! event with nothing to do (`epoll_wait` on Linux, `kevent`/`kqueue` on
//! BSDs and macOS, the wait/completion calls on Windows).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Function names (substring match) that mark blocking-wait idle time.
pub const IDLE_MARKERS: &[&str] = &[
    "epoll_wait",
    "io_uring_enter",
    "kevent",
    "kqueue",
    "WaitForMultipleObjects",
    "GetQueuedCompletionStatus",
];

/// Per-function statistics within one capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    /// Function (or frame) name as reported by the profiling subsystem.
    pub name: String,

    /// Number of calls observed during the interval.
    pub calls: u64,

    /// Cumulative time attributed to this function, in seconds.
    pub cum_secs: f64,

    /// Caller → seconds attributed through that caller. Feeds the
    /// call-graph exporter's edges.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub callers: BTreeMap<String, f64>,
}

/// One immutable, whole-process snapshot covering a single sampling
/// interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileCapture {
    /// Total elapsed wall-clock time the capture covers, in seconds.
    pub wall_secs: f64,

    pub entries: Vec<ProfileEntry>,
}

impl ProfileCapture {
    /// Cumulative time attributed to idle/blocking-wait markers.
    ///
    /// A well-formed capture with no marker entry genuinely spent no time
    /// idle, so the sum is 0 and the interval counts as fully busy.
    #[must_use]
    pub fn idle_secs(&self) -> f64 {
        self.entries
            .iter()
            .filter(|entry| is_idle_marker(&entry.name))
            .map(|entry| entry.cum_secs)
            .sum()
    }
}

/// True when `name` identifies a blocking-wait frame.
#[must_use]
pub fn is_idle_marker(name: &str) -> bool {
    IDLE_MARKERS.iter().any(|marker| name.contains(marker))
}

/// The profiling subsystem collaborator.
///
/// `capture` reports the statistics accumulated since the previous call, so
/// each capture covers exactly one sampling interval. Implementations must
/// be cheap enough to call once per second.
pub trait ProfileSource: Send + Sync {
    fn capture(&self) -> anyhow::Result<ProfileCapture>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_markers_match_by_substring() {
        assert!(is_idle_marker("{method 'poll' of 'epoll_wait' objects}"));
        assert!(is_idle_marker("kevent64"));
        assert!(is_idle_marker("GetQueuedCompletionStatusEx"));
        assert!(!is_idle_marker("myapp::process_block"));
    }

    #[test]
    fn idle_seconds_sums_all_marker_entries() {
        let capture = ProfileCapture {
            wall_secs: 1.0,
            entries: vec![
                ProfileEntry {
                    name: "epoll_wait".into(),
                    calls: 100,
                    cum_secs: 0.5,
                    callers: BTreeMap::new(),
                },
                ProfileEntry {
                    name: "io_uring_enter".into(),
                    calls: 10,
                    cum_secs: 0.2,
                    callers: BTreeMap::new(),
                },
                ProfileEntry {
                    name: "myapp::work".into(),
                    calls: 3,
                    cum_secs: 0.3,
                    callers: BTreeMap::new(),
                },
            ],
        };
        assert!((capture.idle_secs() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn capture_without_markers_is_fully_busy() {
        let capture = ProfileCapture {
            wall_secs: 1.0,
            entries: vec![ProfileEntry {
                name: "myapp::work".into(),
                calls: 1,
                cum_secs: 1.0,
                callers: BTreeMap::new(),
            }],
        };
        assert_eq!(capture.idle_secs(), 0.0);
    }
}
