//! Structured error types for lockscope
//!
//! Using thiserror for automatic Display implementation and error chaining.

use super::types::SlotId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Snapshot store {} does not exist or is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to create snapshot directory {}: {source}", .dir.display())]
    CreateDir { dir: PathBuf, source: std::io::Error },

    #[error("Malformed snapshot file {}: {source}", .path.display())]
    Malformed { path: PathBuf, source: serde_json::Error },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("invalid slot range: first ({first}) must be <= last ({last})")]
    InvalidRange { first: u32, last: u32 },

    #[error("snapshot slot-{0} not found in store")]
    MissingSlot(SlotId),

    #[error("Failed to write graph description {}: {source}", .path.display())]
    DotWrite { path: PathBuf, source: std::io::Error },

    #[error("Failed to launch graph renderer `dot`: {0} (is Graphviz installed?)")]
    RendererSpawn(std::io::Error),

    #[error("Graph renderer `dot` failed with {status}: {stderr}")]
    RendererFailed { status: std::process::ExitStatus, stderr: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
