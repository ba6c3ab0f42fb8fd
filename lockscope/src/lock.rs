//! Instrumented mutex
//!
//! [`InstrumentedMutex`] wraps exactly one `tokio::sync::Mutex` and keeps its
//! blocking semantics bit-for-bit: callers that would block still block, for
//! the same scheduling reasons. The wrapper only adds bookkeeping — per
//! acquisition it measures the wait (time between requesting and being
//! granted the lock) and the hold (time inside the critical section),
//! attributes both to the caller's [`CallSiteKey`], and records them in the
//! shared [`LockRegistry`].
//!
//! Waits and holds exceeding the configured [`Thresholds`] are reported with
//! `log::warn!`; the warnings are advisory and never alter control flow.
//!
//! The transient per-acquisition state (acquire instant, wait duration,
//! holder key) lives in the returned guard. Holding the lock is exclusive,
//! so that state has exactly one writer by construction, and the guard's
//! `Drop` — which runs on every exit from the critical section, including
//! panic unwind — performs the release-side bookkeeping before the inner
//! guard releases the lock.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::warn;
use tokio::sync::{Mutex, MutexGuard};

use crate::callsite::{BacktraceCapture, CallSiteCapture, CallSiteKey};
use crate::registry::LockRegistry;

/// Advisory warning thresholds. Comparisons are strict: a wait or hold
/// exactly at the threshold does not warn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub wait: Duration,
    pub hold: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds { wait: Duration::from_secs(1), hold: Duration::from_secs(2) }
    }
}

impl Thresholds {
    #[must_use]
    pub fn wait_exceeded(&self, wait: Duration) -> bool {
        wait > self.wait
    }

    #[must_use]
    pub fn hold_exceeded(&self, hold: Duration) -> bool {
        hold > self.hold
    }
}

/// A named `tokio::sync::Mutex` wrapper that profiles wait and hold times
/// per call site.
pub struct InstrumentedMutex<T> {
    name: String,
    inner: Mutex<T>,
    registry: Arc<LockRegistry>,
    capture: Arc<dyn CallSiteCapture>,
    thresholds: Thresholds,
}

impl<T> InstrumentedMutex<T> {
    /// Wrap `value` in an instrumented mutex reporting into `registry`,
    /// capturing call sites from the live stack.
    pub fn new(name: impl Into<String>, value: T, registry: Arc<LockRegistry>) -> Self {
        Self::with_capture(name, value, registry, Arc::new(BacktraceCapture))
    }

    /// Like [`InstrumentedMutex::new`] with an explicit capture strategy.
    /// Tests use this to substitute fixed call-site keys.
    pub fn with_capture(
        name: impl Into<String>,
        value: T,
        registry: Arc<LockRegistry>,
        capture: Arc<dyn CallSiteCapture>,
    ) -> Self {
        InstrumentedMutex {
            name: name.into(),
            inner: Mutex::new(value),
            registry,
            capture,
            thresholds: Thresholds::default(),
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Acquire the lock, blocking exactly as the underlying mutex would.
    ///
    /// On grant, the elapsed wait and the caller's call-site identity are
    /// recorded into the guard; a wait above the threshold is warned about.
    /// Neither measurement nor warning can fail or delay the acquisition.
    pub async fn lock(&self) -> InstrumentedGuard<'_, T> {
        let requested = Instant::now();
        let guard = self.inner.lock().await;
        let acquired = Instant::now();
        let wait = acquired.duration_since(requested);
        let holder = self.capture.current();

        if self.thresholds.wait_exceeded(wait) {
            warn!(
                "Waited for mutex \"{}\" for {:.3} seconds.\n{}",
                self.name,
                wait.as_secs_f64(),
                holder
            );
        }

        InstrumentedGuard { lock: self, guard, acquired, wait, holder }
    }

    /// Dump the shared registry through the log stream, prefixed with this
    /// lock's name.
    pub fn log_stats(&self) {
        warn!("Mutex {}:", self.name);
        for line in self.registry.dump_stats().lines() {
            warn!("{line}");
        }
    }
}

impl<T> std::fmt::Debug for InstrumentedMutex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstrumentedMutex")
            .field("name", &self.name)
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}

/// Guard over the critical section. Carries the transient acquisition state;
/// dropping it records the release into the registry and then releases the
/// underlying mutex.
pub struct InstrumentedGuard<'a, T> {
    lock: &'a InstrumentedMutex<T>,
    guard: MutexGuard<'a, T>,
    acquired: Instant,
    wait: Duration,
    holder: CallSiteKey,
}

impl<T> Deref for InstrumentedGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for InstrumentedGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for InstrumentedGuard<'_, T> {
    fn drop(&mut self) {
        let hold = self.acquired.elapsed();
        self.lock.registry.record(self.holder.clone(), self.wait, hold);

        if self.lock.thresholds.hold_exceeded(hold) {
            warn!(
                "Held mutex \"{}\" for {:.3} seconds.\n{}",
                self.lock.name,
                hold.as_secs_f64(),
                self.holder
            );
        }
        // The inner MutexGuard drops after this body, releasing the lock
        // only once the release-side bookkeeping is done.
    }
}
