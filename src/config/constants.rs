//! Configuration constants.
//!
//! Defaults for the shared engine, the per-request client settings, and the
//! caller-side retry policy used by the CLI.

use std::time::Duration;

/// Scheme assumed for server addresses given without one (`host[:port][/path]`).
pub const DEFAULT_SCHEME: &str = "http";

// Transfer timeouts
/// Overall per-request timeout in seconds (connect + send + full body).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// TCP connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// Redirect handling
/// Maximum number of redirect hops the engine follows for a single transfer.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// User-Agent sent when the caller does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("clonk_http/", env!("CARGO_PKG_VERSION"));

// Request body content types
/// Content type for POST payloads sent as opaque bytes.
pub const CONTENT_TYPE_BINARY: &str = "application/octet-stream";
/// Content type for textual POST payloads (form data).
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

// Retry strategy (caller side only, the engine never retries)
/// Initial delay in milliseconds before the first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Default number of retries after the initial attempt
pub const DEFAULT_RETRIES: usize = 0;

/// Minimum interval between two progress log lines for one transfer.
pub const PROGRESS_LOG_INTERVAL: Duration = Duration::from_millis(500);
