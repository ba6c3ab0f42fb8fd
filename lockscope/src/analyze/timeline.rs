//! Busy-percent timeline rendering
//!
//! Walks the snapshot store from slot 0 and prints one line per slot: the
//! slot index, the percent of the interval not spent in idle/blocking-wait
//! markers, and a proportionally filled horizontal bar. Iteration ends
//! cleanly at the first missing slot; a malformed slot file is skipped with
//! a visible note instead of aborting the run.

// Bar-length quantization intentionally truncates
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::io::Write;

use colored::{ColoredString, Colorize};

use crate::domain::{SlotId, StoreError};
use crate::store::SnapshotStore;

/// Idle time below this is treated as "no idle observed": fully busy.
pub const IDLE_EPSILON: f64 = 1e-6;

/// Bar width in characters; each character represents two percent.
pub const BAR_WIDTH: usize = 50;

/// Percent of `total_secs` not attributed to idle markers, 0..=100.
#[must_use]
pub fn busy_percent(total_secs: f64, idle_secs: f64) -> f64 {
    if idle_secs < IDLE_EPSILON {
        return 100.0;
    }
    100.0 * (total_secs - idle_secs) / total_secs
}

/// Five-tier display classification of a busy percentage.
///
/// Purely visual triage — the tiers carry no semantic meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTier {
    /// > 90% busy
    Critical,
    /// > 80% busy
    Severe,
    /// > 70% busy
    High,
    /// > 60% busy
    Elevated,
    /// < 10% busy
    Idle,
    /// Everything else
    Normal,
}

impl LoadTier {
    #[must_use]
    pub fn classify(percent: f64) -> LoadTier {
        if percent > 90.0 {
            LoadTier::Critical
        } else if percent > 80.0 {
            LoadTier::Severe
        } else if percent > 70.0 {
            LoadTier::High
        } else if percent > 60.0 {
            LoadTier::Elevated
        } else if percent < 10.0 {
            LoadTier::Idle
        } else {
            LoadTier::Normal
        }
    }

    fn paint(self, text: &str) -> ColoredString {
        match self {
            LoadTier::Critical => text.red().bold(),
            LoadTier::Severe => text.magenta().bold(),
            LoadTier::High => text.yellow().bold(),
            LoadTier::Elevated => text.bold(),
            LoadTier::Idle => text.green(),
            LoadTier::Normal => text.normal(),
        }
    }
}

/// Render one timeline line: `00007:  42% CPU <bar>|` with the percent
/// colored by tier and the filled bar section drawn on a white background.
#[must_use]
pub fn render_slot_line(slot: SlotId, percent: f64) -> String {
    let tier = LoadTier::classify(percent);
    let filled = ((percent / 2.0).floor() as usize).min(BAR_WIDTH);
    format!(
        "{slot}: {} {}{}|",
        tier.paint(&format!("{percent:3.0}% CPU")),
        " ".repeat(filled).on_white(),
        " ".repeat(BAR_WIDTH - filled),
    )
}

/// Walk the store from slot 0, writing one line per available slot to
/// `out`. Returns the number of slots rendered (skipped slots included).
pub fn render_timeline(
    store: &SnapshotStore,
    out: &mut impl Write,
) -> Result<usize, StoreError> {
    let mut slot = SlotId::FIRST;
    let mut seen = 0;
    loop {
        match store.read(slot) {
            // First missing slot: normal end of the sequence.
            Ok(None) => break,
            Ok(Some(capture)) => {
                let percent = busy_percent(capture.wall_secs, capture.idle_secs());
                writeln!(out, "{}", render_slot_line(slot, percent))?;
                seen += 1;
            }
            Err(StoreError::Malformed { path, source }) => {
                writeln!(out, "{slot}: skipping malformed snapshot {}: {source}", path.display())?;
                seen += 1;
            }
            Err(err) => return Err(err),
        }
        slot = slot.next();
    }
    Ok(seen)
}
