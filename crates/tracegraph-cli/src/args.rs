//! Command-line argument definitions for the Tracegraph CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, and logging verbosity.

use clap::Parser;

/// Path value meaning standard input or standard output.
pub const STDIO: &str = "-";

/// Command-line arguments for the Tracegraph layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input trace JSON file
    #[arg(help = "Path to the input trace file, or - for stdin", default_value = STDIO)]
    pub input: String,

    /// Path to the output graph JSON file
    #[arg(short, long, default_value = STDIO)]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
