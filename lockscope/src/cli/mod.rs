//! CLI module - argument parsing and command dispatch

pub mod args;

pub use args::{Args, Command};
