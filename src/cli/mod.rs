//! CLI module
//!
//! Command-line interface for working with continuations offline.
//!
//! # Commands
//!
//! - `inspect` - Decode a continuation and show its frontier
//! - `overlap` - List partitions overlapping a key range
//! - `split` - Resolve a split against a routing file
//! - `validate` - Check a feed configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;

#[cfg(test)]
mod tests;
