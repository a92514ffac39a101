//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and manipulate feed continuations
#[derive(Parser, Debug)]
#[command(name = "feedrange")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LogLevel,

    /// Verbose output (same as --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a continuation and show its frontier
    Inspect {
        /// Serialized continuation, or @path to read it from a file
        continuation: String,
    },

    /// List the partitions overlapping a key range
    Overlap {
        /// Routing file (YAML or JSON list of partition key ranges)
        #[arg(short, long)]
        routing: PathBuf,

        /// Lower bound
        #[arg(long, default_value = "")]
        min: String,

        /// Upper bound
        #[arg(long, default_value = "FF")]
        max: String,

        /// Exclude the lower bound
        #[arg(long)]
        min_exclusive: bool,

        /// Include the upper bound
        #[arg(long)]
        max_inclusive: bool,
    },

    /// Resolve a split of the continuation's current range
    Split {
        /// Routing file describing the partitions after the split
        #[arg(short, long)]
        routing: PathBuf,

        /// Serialized continuation, or @path to read it from a file
        continuation: String,
    },

    /// Validate a feed configuration file
    Validate {
        /// Feed configuration (YAML or JSON)
        config: PathBuf,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
