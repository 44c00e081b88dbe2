//! `tracegraph` binary: lays out one trace document and exits non-zero on failure.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use tracegraph_cli::{Args, error_adapter::to_reportables};

/// Resolve the `--log-level` flag, warning on stderr when it is not a level name.
fn log_level(requested: &str) -> LevelFilter {
    LevelFilter::from_str(requested).unwrap_or_else(|_| {
        eprintln!("Unknown log level {requested:?}, falling back to 'warn'.");
        LevelFilter::Warn
    })
}

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    // stdout may carry the graph description, so logs stay on stderr.
    let log_level = log_level(&args.log_level);
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .target(env_logger::Target::Stderr)
        .init();

    info!(log_level:?; "Starting Tracegraph");
    debug!(args:?; "Parsed arguments");

    let Err(err) = tracegraph_cli::run(&args) else {
        info!("Trace laid out");
        return;
    };

    let reporter = miette::GraphicalReportHandler::new();
    for reportable in to_reportables(&err) {
        let mut report = String::new();
        if reporter.render_report(&mut report, &reportable).is_err() {
            report = reportable.to_string();
        }
        error!("{report}");
    }

    process::exit(1);
}
