//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `clonk_http` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use clonk_http::initialization::init_logger_with;
use clonk_http::{run, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.into(), opt.log_format)
        .context("Failed to initialize logger")?;

    match run(opt).await {
        Ok(report) => {
            for (target, error) in &report.failures {
                eprintln!("clonk-http: {target}: {error}");
            }
            if report.failed() > 0 {
                eprintln!(
                    "clonk-http: {} of {} request{} failed",
                    report.failed(),
                    report.total_urls,
                    if report.total_urls == 1 { "" } else { "s" }
                );
                process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("clonk-http error: {:#}", e);
            process::exit(1);
        }
    }
}
