//! Laneflow CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};
use miette::GraphicalReportHandler;

use laneflow::LaneflowError;
use laneflow_cli::{Args, error_adapter::to_reportables};

fn main() {
    // Panics get the same fancy rendering as ordinary errors
    miette::set_panic_hook();

    let args = Args::parse();
    init_logger(&args.log_level);

    info!(
        input = args.input,
        format:? = args.output_format();
        "Starting Laneflow"
    );
    debug!(args:?; "Parsed arguments");

    match laneflow_cli::run(&args) {
        Ok(()) => info!(output = args.output; "Completed successfully"),
        Err(err) => {
            report(&err);
            process::exit(1);
        }
    }
}

/// Installs `env_logger`, falling back to `warn` for an unknown level name.
fn init_logger(level: &str) {
    let filter = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(filter)
        .init();
}

/// Logs one rendered report per diagnostic carried by `err`.
fn report(err: &LaneflowError) {
    let handler = GraphicalReportHandler::new();

    for reportable in to_reportables(err) {
        let mut rendered = String::new();
        handler
            .render_report(&mut rendered, &reportable)
            .expect("Writing to String buffer is infallible");

        error!("{rendered}");
    }
}
