//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::domain::SlotId;

#[derive(Parser)]
#[command(
    name = "lockscope",
    about = "Analyze CPU-usage snapshots captured by the lockscope sampler",
    after_help = "\
EXAMPLES:
    lockscope ~/.myapp/profile           Colored busy-percent timeline, one line per slot
    lockscope ~/.myapp/profile 10        Call graph (hotspot-10.png) for slot 10
    lockscope ~/.myapp/profile 10 20     Call graph (hotspot-10-20.png) for slots 10..=20"
)]
pub struct Args {
    /// Snapshot store directory written by the sampler
    #[arg(value_name = "STORE_DIR")]
    pub store_dir: PathBuf,

    /// Slot to export as a call graph (omit to render the full timeline)
    #[arg(value_name = "FIRST")]
    pub first: Option<u32>,

    /// Last slot of an inclusive range (defaults to FIRST)
    #[arg(value_name = "LAST")]
    pub last: Option<u32>,
}

/// The enumerated operations of the offline tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Render the busy-percent timeline for every available slot.
    Timeline,
    /// Export a call graph for an inclusive slot range.
    CallGraph { first: SlotId, last: SlotId },
}

impl Args {
    /// Map positional arguments to an explicit command variant.
    /// Range validation (`first <= last`) happens in the exporter.
    #[must_use]
    pub fn command(&self) -> Command {
        match (self.first, self.last) {
            (None, _) => Command::Timeline,
            (Some(first), None) => Command::CallGraph { first: SlotId(first), last: SlotId(first) },
            (Some(first), Some(last)) => {
                Command::CallGraph { first: SlotId(first), last: SlotId(last) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_store_dir_renders_timeline() {
        let args = Args::parse_from(["lockscope", "/tmp/profile"]);
        assert_eq!(args.command(), Command::Timeline);
    }

    #[test]
    fn single_slot_exports_degenerate_range() {
        let args = Args::parse_from(["lockscope", "/tmp/profile", "7"]);
        assert_eq!(args.command(), Command::CallGraph { first: SlotId(7), last: SlotId(7) });
    }

    #[test]
    fn two_slots_export_a_range() {
        let args = Args::parse_from(["lockscope", "/tmp/profile", "10", "20"]);
        assert_eq!(args.command(), Command::CallGraph { first: SlotId(10), last: SlotId(20) });
    }
}
