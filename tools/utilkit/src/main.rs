//! utilkit command line entry point.

use clap::Parser;
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Cli;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {}", e);
        let mut last = e.to_string();
        let mut source = e.source();
        while let Some(cause) = source {
            let msg = cause.to_string();
            // CoreError::Tagged displays exactly like the tagged error it wraps.
            if msg != last {
                eprintln!("  caused by: {}", msg);
            }
            last = msg;
            source = cause.source();
        }
        std::process::exit(1);
    }
}
