//! Call-site identity capture
//!
//! A [`CallSiteKey`] is the aggregation key for lock statistics: a stable
//! textual identity for the code path that acquired a lock. Two acquisitions
//! from the same code path must produce equal keys, so the capture excludes
//! the frames that vary per invocation or belong to machinery rather than
//! the caller: the innermost instrumentation frames (this crate, the
//! `backtrace` walker) and the outermost runtime/dispatch frames (tokio
//! scheduler, thread start stubs).
//!
//! The capture mechanism is behind the [`CallSiteCapture`] trait so the lock
//! instrumentation is decoupled from any particular stack-walking strategy;
//! tests substitute a fixed key.

use std::fmt;

/// Maximum caller frames retained in a key, counted after filtering.
const MAX_FRAMES: usize = 15;

/// Symbol prefixes identifying runtime / OS / instrumentation frames.
/// A frame matching any of these is not part of the caller's identity.
const INTERNAL_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "tokio::",
    "mio::",
    "futures::",
    "futures_util::",
    "futures_core::",
    "backtrace::",
    "lockscope::callsite",
    "lockscope::lock",
    // libc / OS stubs always start with "__"
    "__",
    "clone",
    "start_thread",
];

/// Opaque, stable, hashable call-site identity.
///
/// Semantically equivalent call sites (same code path) compare equal across
/// invocations for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallSiteKey(String);

impl CallSiteKey {
    pub fn new(key: impl Into<String>) -> Self {
        CallSiteKey(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallSiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interface abstraction over "get the current call-site identity".
pub trait CallSiteCapture: Send + Sync {
    fn current(&self) -> CallSiteKey;
}

/// Default capture: walks the current stack with the `backtrace` crate and
/// keeps the first [`MAX_FRAMES`] non-internal frames, formatted one per
/// line as `function (file:line)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceCapture;

impl CallSiteCapture for BacktraceCapture {
    fn current(&self) -> CallSiteKey {
        let bt = backtrace::Backtrace::new();
        let mut frames: Vec<String> = Vec::new();

        'walk: for frame in bt.frames() {
            for symbol in frame.symbols() {
                let Some(name) = symbol.name() else { continue };
                let name = name.to_string();
                if is_internal(&name) {
                    continue;
                }
                let line = match (symbol.filename(), symbol.lineno()) {
                    (Some(file), Some(lineno)) => {
                        format!("{name} ({}:{lineno})", file.display())
                    }
                    _ => name,
                };
                frames.push(line);
                if frames.len() >= MAX_FRAMES {
                    break 'walk;
                }
            }
        }

        if frames.is_empty() {
            // Stripped binary or exotic unwinder; still a usable (if coarse) key.
            return CallSiteKey::new("<unresolved call site>");
        }
        CallSiteKey(frames.join("\n"))
    }
}

/// True when `symbol` belongs to runtime or instrumentation machinery.
///
/// Trait-impl symbols are rendered as `<T as Trait>::method`; the leading
/// `<` is stripped before prefix matching so `<tokio::…>` still filters.
fn is_internal(symbol: &str) -> bool {
    let stripped = symbol.strip_prefix('<').unwrap_or(symbol);
    INTERNAL_PREFIXES.iter().any(|prefix| stripped.starts_with(prefix))
}
