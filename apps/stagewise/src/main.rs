//! # Stagewise
//!
//! Entry point: parse arguments, install logging, run the command.

use clap::Parser;
use stagewise::cli;
use stagewise::config::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::start(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
