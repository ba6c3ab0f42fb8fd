//! Offline snapshot analysis
//!
//! Read-only, single-threaded consumers of the snapshot store: the
//! busy-percent timeline renderer and the Graphviz call-graph exporter.

pub mod callgraph;
pub mod timeline;

pub use callgraph::{export_call_graph, merge_slots, MergedProfile};
pub use timeline::{busy_percent, render_timeline, LoadTier};
