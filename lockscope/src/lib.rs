//! # lockscope - Lock-Contention Profiler and CPU-Usage Timeline Analyzer
//!
//! lockscope is an in-process instrumentation layer plus an offline analysis
//! tool. The instrumentation side wraps a `tokio` mutex to record how long
//! callers wait to acquire it and how long they hold it, aggregated by call
//! site, and runs a background sampler that periodically persists
//! execution-profile snapshots to disk. The offline side reconstructs a
//! colored per-interval "percent busy" timeline from those snapshots and can
//! merge a slot range into a call-graph image via Graphviz.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Monitored Process                        │
//! │                                                             │
//! │  ┌──────────────────┐        ┌──────────────────┐           │
//! │  │ InstrumentedMutex│──────▶│   LockRegistry    │           │
//! │  │  (wait / hold)   │        │ (per-call-site)  │           │
//! │  └──────────────────┘        └──────────────────┘           │
//! │                                                             │
//! │  ┌──────────────────┐        ┌──────────────────┐           │
//! │  │  ProfileSource   │──────▶│     Sampler       │           │
//! │  │  (collaborator)  │  1s    │ (cancellable)    │           │
//! │  └──────────────────┘        └────────┬─────────┘           │
//! └──────────────────────────────────────┼─────────────────────┘
//!                                        ▼
//!                              ┌──────────────────┐
//!                              │  SnapshotStore   │
//!                              │ slot-00000.. N   │
//!                              └────────┬─────────┘
//!                                       │ (offline)
//!                       ┌───────────────┴───────────────┐
//!                       ▼                               ▼
//!             ┌──────────────────┐           ┌──────────────────┐
//!             │     Timeline     │           │    Call Graph    │
//!             │  (%busy / slot)  │           │  (DOT → PNG)     │
//!             └──────────────────┘           └──────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`lock`]: [`lock::InstrumentedMutex`], a `tokio::sync::Mutex` wrapper
//!   that measures per-acquisition wait and hold times and warns when they
//!   exceed thresholds
//! - [`callsite`]: stable call-site identity captured from the stack,
//!   excluding instrumentation and runtime frames
//! - [`registry`]: process-wide call-site → wait/hold aggregate table,
//!   shared across all instrumented locks
//! - [`profile`]: the execution-profile snapshot model and the
//!   [`profile::ProfileSource`] collaborator trait
//! - [`store`]: append-only directory of sequentially numbered snapshot
//!   files with atomic write-then-rename persistence
//! - [`sampler`]: cancellable background task persisting one snapshot per
//!   interval
//! - [`analyze`]: offline consumers — the busy-percent timeline renderer
//!   and the Graphviz call-graph exporter
//! - [`cli`]: command-line argument parsing and command dispatch
//! - [`domain`]: core domain types ([`domain::SlotId`]) and structured
//!   errors
//!
//! ## Typical Usage
//!
//! ```bash
//! # Render the full busy-percent timeline from a snapshot store
//! lockscope ~/.myapp/profile
//!
//! # Export a call graph for one slot, or an inclusive slot range
//! lockscope ~/.myapp/profile 10
//! lockscope ~/.myapp/profile 10 20
//! ```

pub mod analyze;
pub mod callsite;
pub mod cli;
pub mod domain;
pub mod lock;
pub mod profile;
pub mod registry;
pub mod sampler;
pub mod store;
