//! Call-graph export
//!
//! Merges an inclusive slot range into a single profile, converts it to
//! Graphviz DOT in-process, and drives the external `dot` renderer to
//! produce a PNG named after the slot boundaries (`hotspot-10.png`,
//! `hotspot-10-20.png`). Range validation happens before any file is
//! touched, and renderer failures are surfaced with the failed stage, never
//! masked.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::{ExportError, SlotId};
use crate::profile::ProfileCapture;
use crate::store::SnapshotStore;

/// Slot captures merged by function name.
#[derive(Debug, Default)]
pub struct MergedProfile {
    wall_secs: f64,
    entries: BTreeMap<String, MergedEntry>,
}

#[derive(Debug, Default)]
struct MergedEntry {
    calls: u64,
    cum_secs: f64,
    callers: BTreeMap<String, f64>,
}

impl MergedProfile {
    pub fn absorb(&mut self, capture: &ProfileCapture) {
        self.wall_secs += capture.wall_secs;
        for entry in &capture.entries {
            let merged = self.entries.entry(entry.name.clone()).or_default();
            merged.calls += entry.calls;
            merged.cum_secs += entry.cum_secs;
            for (caller, secs) in &entry.callers {
                *merged.callers.entry(caller.clone()).or_default() += secs;
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to Graphviz DOT. Node and edge order follow the `BTreeMap`
    /// ordering, so the output is deterministic for a given input.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph hotspot {\n");
        out.push_str("    node [shape=box, style=filled, fontname=\"monospace\"];\n");

        // Callers without their own entry still get a (plain) node so every
        // edge has both endpoints.
        let mut ids: BTreeMap<&str, usize> = BTreeMap::new();
        for (name, entry) in &self.entries {
            let next = ids.len();
            ids.entry(name.as_str()).or_insert(next);
            for caller in entry.callers.keys() {
                let next = ids.len();
                ids.entry(caller.as_str()).or_insert(next);
            }
        }

        for (name, id) in &ids {
            if let Some(entry) = self.entries.get(*name) {
                let share = if self.wall_secs > 0.0 {
                    100.0 * entry.cum_secs / self.wall_secs
                } else {
                    0.0
                };
                let _ = writeln!(
                    out,
                    "    n{id} [label=\"{}\\n{} calls\\n{:.3}s ({share:.1}%)\", fillcolor=\"{}\"];",
                    escape(name),
                    entry.calls,
                    entry.cum_secs,
                    share_color(share),
                );
            } else {
                let _ = writeln!(
                    out,
                    "    n{id} [label=\"{}\", fillcolor=\"#eeeeee\"];",
                    escape(name)
                );
            }
        }

        for (name, entry) in &self.entries {
            let callee = ids[name.as_str()];
            for (caller, secs) in &entry.callers {
                let caller_id = ids[caller.as_str()];
                let _ = writeln!(out, "    n{caller_id} -> n{callee} [label=\"{secs:.3}s\"];");
            }
        }

        out.push_str("}\n");
        out
    }
}

/// Heat shading by share of total wall time.
fn share_color(share: f64) -> &'static str {
    if share >= 50.0 {
        "#ff5544"
    } else if share >= 25.0 {
        "#ff9944"
    } else if share >= 10.0 {
        "#ffdd55"
    } else {
        "#dddddd"
    }
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Read and merge every slot in `[first, last]`.
///
/// `last < first` is a validation error; a missing slot inside the range is
/// reported as [`ExportError::MissingSlot`]. Nothing is written.
pub fn merge_slots(
    store: &SnapshotStore,
    first: SlotId,
    last: SlotId,
) -> Result<MergedProfile, ExportError> {
    if last < first {
        return Err(ExportError::InvalidRange { first: first.0, last: last.0 });
    }

    let mut merged = MergedProfile::default();
    for seq in first.0..=last.0 {
        let slot = SlotId(seq);
        let capture = store.read(slot)?.ok_or(ExportError::MissingSlot(slot))?;
        merged.absorb(&capture);
    }
    Ok(merged)
}

/// Merge `[first, last]`, write `hotspot-<first>[-<last>].dot` into
/// `out_dir`, render it to PNG via the external `dot` tool, and return the
/// PNG path.
pub fn export_call_graph(
    store: &SnapshotStore,
    first: SlotId,
    last: SlotId,
    out_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let merged = merge_slots(store, first, last)?;

    let stem = if first == last {
        format!("hotspot-{}", first.0)
    } else {
        format!("hotspot-{}-{}", first.0, last.0)
    };
    let dot_path = out_dir.join(format!("{stem}.dot"));
    let png_path = out_dir.join(format!("{stem}.png"));

    fs::write(&dot_path, merged.to_dot())
        .map_err(|source| ExportError::DotWrite { path: dot_path.clone(), source })?;

    let output = Command::new("dot")
        .arg("-Tpng")
        .arg(&dot_path)
        .arg("-o")
        .arg(&png_path)
        .output()
        .map_err(ExportError::RendererSpawn)?;

    if !output.status.success() {
        return Err(ExportError::RendererFailed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(png_path)
}
