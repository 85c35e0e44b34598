//! Command-line application.
//!
//! This module provides the pieces the `clonk-http` binary is built from:
//! input parsing, per-URL fetching with retry, progress logging, output
//! writing, and statistics printing.

pub mod input;
pub mod output;
pub mod progress;
pub mod retry;
mod run;
pub mod statistics;

// Re-export public API
pub use input::{build_request, load_payload, parse_header, parse_headers};
pub use output::write_bodies;
pub use progress::{format_progress, progress_logger};
pub use retry::{fetch_with_retry, FetchOutcome};
pub use run::{run, RunReport};
pub use statistics::print_engine_statistics;
