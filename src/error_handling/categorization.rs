//! Error categorization and retry strategy.
//!
//! Maps `reqwest` failures onto [`HttpError`] and builds the backoff used by
//! callers that choose to retry. The engine itself never retries.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::{HttpError, TransportErrorKind};

/// Creates an exponential backoff retry strategy yielding `retries` delays.
///
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR`
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
///
/// An empty iterator (`retries == 0`) means the first failure is final.
pub fn get_retry_strategy(retries: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(retries)
}

/// Categorizes a `reqwest::Error` into a [`TransportErrorKind`].
pub fn categorize_reqwest_error(error: &reqwest::Error) -> TransportErrorKind {
    if error.is_builder() {
        TransportErrorKind::Builder
    } else if error.is_redirect() {
        TransportErrorKind::Redirect
    } else if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::Connect
    } else if error.is_request() {
        TransportErrorKind::Request
    } else if error.is_body() {
        TransportErrorKind::Body
    } else if error.is_decode() {
        TransportErrorKind::Decode
    } else {
        TransportErrorKind::Other
    }
}

/// Converts a `reqwest::Error` into an [`HttpError`].
///
/// Errors carrying an HTTP status become protocol failures; everything else is
/// a transport failure with the full source chain as its message.
pub fn http_error_from_reqwest(error: reqwest::Error) -> HttpError {
    if let Some(status) = error.status() {
        return HttpError::Status {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown Status Code")
                .to_string(),
        };
    }

    HttpError::Transport {
        kind: categorize_reqwest_error(&error),
        message: error_chain_message(&error),
    }
}

/// Joins an error and its sources into one line (`outer: inner: root`).
fn error_chain_message(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
