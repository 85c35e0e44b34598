//! Error handling and transfer statistics.
//!
//! This module provides:
//! - Error type definitions (`UriError`, `HttpError`, `InitializationError`)
//! - Categorization of transfer library errors
//! - Retry strategy configuration for callers
//! - Engine outcome statistics
//!
//! Transfer failures are categorized into:
//! - **Transport**: the request never produced a usable response
//! - **Protocol**: a response arrived with a non-success status
//! - **Cancellation**: the caller or its progress callback stopped the transfer
//! - **Engine / Request**: the multiplexer or request preparation failed

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, get_retry_strategy, http_error_from_reqwest};
pub use stats::EngineStats;
pub use types::{
    ErrorCategory, HttpError, InitializationError, TransportErrorKind, UriError,
};
