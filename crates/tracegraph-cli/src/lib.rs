//! CLI logic for the Tracegraph layout tool.
//!
//! This module contains the core CLI logic: read a trace document, lay it
//! out, and write the graph description for a renderer.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, STDIO};

use std::{
    fs,
    io::{self, Write},
};

use log::{info, warn};

use tracegraph::{GraphBuilder, TracegraphError};

/// Run the Tracegraph CLI application
///
/// This function processes the input trace through the Tracegraph pipeline
/// and writes the resulting graph description to the output.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `TracegraphError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Trace decoding errors
/// - Serialization errors
pub fn run(args: &Args) -> Result<(), TracegraphError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing trace"
    );

    // Load configuration
    let app_config = config::load_config(args.config.as_ref())?;

    // Read input
    let source = read_input(&args.input)?;

    // Lay out the trace using the GraphBuilder API
    let builder = GraphBuilder::new(app_config);
    let record = builder.parse(&source)?;

    let errors_count = record.errors_count();
    if errors_count > 0 {
        warn!(errors_count, root = record.name(); "Trace contains failed calls");
    }
    info!(
        records_count = record.records_count(),
        depth = record.depth();
        "Trace loaded"
    );

    let graph = builder.transform(&record);
    let json = builder.render_json(&graph)?;

    // Write output
    write_output(&args.output, &json)?;

    info!(output_path = args.output; "Graph description written successfully");

    Ok(())
}

/// Read the whole input, from stdin when `path` is [`STDIO`].
fn read_input(path: &str) -> io::Result<String> {
    if path == STDIO {
        io::read_to_string(io::stdin().lock())
    } else {
        fs::read_to_string(path)
    }
}

/// Write `json` to `path`, or to stdout followed by a newline when `path` is [`STDIO`].
fn write_output(path: &str, json: &str) -> io::Result<()> {
    if path == STDIO {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{json}")?;
        stdout.flush()
    } else {
        fs::write(path, json)
    }
}
