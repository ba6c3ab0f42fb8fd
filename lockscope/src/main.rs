//! # lockscope - Offline Analyzer Entry Point
//!
//! Reads a snapshot store written by the in-process sampler and either
//! renders the busy-percent timeline (store dir only) or exports a
//! call-graph PNG for one slot or an inclusive slot range.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use lockscope::analyze::{export_call_graph, render_timeline};
use lockscope::cli::{Args, Command};
use lockscope::domain::ExportError;
use lockscope::store::SnapshotStore;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_code_for(&e)
        }
    });
}

/// Invalid user input (a backwards slot range) is a usage error; everything
/// else is an ordinary failure.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ExportError>() {
        Some(ExportError::InvalidRange { .. }) => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let store = SnapshotStore::open_existing(&args.store_dir)
        .with_context(|| format!("cannot open snapshot store {}", args.store_dir.display()))?;

    match args.command() {
        Command::Timeline => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let rendered = render_timeline(&store, &mut out)?;
            if rendered == 0 {
                writeln!(out, "no snapshots found in {}", store.dir().display())?;
            }
        }
        Command::CallGraph { first, last } => {
            println!("generating call graph for slot(s) [{}, {}]", first.0, last.0);
            let png = export_call_graph(&store, first, last, Path::new("."))?;
            println!("output written to: {}", png.display());
        }
    }

    Ok(())
}
