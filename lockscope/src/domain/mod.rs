//! Domain model for lockscope
//!
//! Core domain types and errors:
//! - Compile-time safety via newtype pattern
//! - Self-documenting function signatures
//! - Structured error handling

pub mod errors;
pub mod types;

pub use errors::{ExportError, StoreError};
pub use types::SlotId;
