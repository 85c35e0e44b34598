//! Error type definitions.
//!
//! This module defines the construction, initialization, and transfer error
//! types, plus the categories used to tell transfer failures apart.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error building the underlying HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The configured proxy URL was rejected.
    #[error("Invalid proxy {url:?}: {source}")]
    ProxyError {
        /// Proxy URL as configured
        url: String,
        /// Underlying parse error
        #[source]
        source: ReqwestError,
    },

    /// The engine was initialized outside of a Tokio runtime.
    #[error("HTTP engine requires a Tokio runtime: {0}")]
    RuntimeError(#[from] tokio::runtime::TryCurrentError),
}

/// Errors constructing a [`crate::Uri`].
///
/// These fail synchronously, before any transfer is scheduled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    /// The address could not be parsed as a URI.
    #[error("Invalid server address {address:?}: {source}")]
    Parse {
        /// Address as given by the caller
        address: String,
        /// Parser error
        #[source]
        source: url::ParseError,
    },

    /// The address parsed but names no host.
    #[error("Server address {address:?} has no host")]
    MissingHost {
        /// Address as given by the caller
        address: String,
    },

    /// The port could not be applied to the address.
    #[error("Cannot use port {port} with server address {address:?}")]
    InvalidPort {
        /// Address as given by the caller
        address: String,
        /// Rejected port
        port: u16,
    },
}

/// Transport-level failure kinds, as reported by the transfer library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum TransportErrorKind {
    /// The request could not be built (bad URL, bad header)
    Builder,
    /// Redirect loop or redirect limit exceeded
    Redirect,
    /// Connect or overall timeout fired
    Timeout,
    /// DNS, TCP or TLS connection setup failed
    Connect,
    /// Sending the request failed
    Request,
    /// Reading the response body failed
    Body,
    /// Response could not be decoded
    Decode,
    /// Anything the transfer library does not classify
    Other,
}

impl TransportErrorKind {
    /// Short human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Builder => "request builder error",
            TransportErrorKind::Redirect => "redirect error",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect error",
            TransportErrorKind::Request => "request error",
            TransportErrorKind::Body => "body error",
            TransportErrorKind::Decode => "decode error",
            TransportErrorKind::Other => "other transport error",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a failed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorCategory {
    /// The request could not be prepared (bad header name or value).
    Request,
    /// DNS, connect, TLS, timeout and other network failures.
    Transport,
    /// A response arrived with a non-success HTTP status.
    Protocol,
    /// The caller cancelled the task or the progress callback aborted it.
    Cancellation,
    /// The multiplexer itself failed the transfer (shutdown, short write).
    Engine,
}

impl ErrorCategory {
    /// Short human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Request => "Request preparation",
            ErrorCategory::Transport => "Transport",
            ErrorCategory::Protocol => "HTTP status",
            ErrorCategory::Cancellation => "Cancellation",
            ErrorCategory::Engine => "Engine",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of an asynchronous transfer.
///
/// A transfer task resolves either with a complete [`crate::HttpResult`] or
/// with exactly one of these; bytes received before a failure are discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// A header name or value supplied by the caller is not valid HTTP.
    #[error("Invalid request header {name:?}")]
    InvalidHeader {
        /// Offending header name
        name: String,
    },

    /// The transfer failed below HTTP (DNS, connect, TLS, timeout, ...).
    #[error("Transport error ({kind}): {message}")]
    Transport {
        /// Failure kind
        kind: TransportErrorKind,
        /// Human-readable detail from the transfer library
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP status {status} {reason}")]
    Status {
        /// Status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
    },

    /// The progress callback returned `false`.
    #[error("Transfer aborted by progress callback")]
    Aborted,

    /// The awaiting task was cancelled.
    #[error("Transfer cancelled")]
    Cancelled,

    /// The engine shut down before the transfer completed.
    #[error("HTTP engine is shut down")]
    Shutdown,

    /// The result sink consumed fewer bytes than it was handed.
    #[error("Result sink consumed {consumed} of {expected} bytes")]
    WriteMismatch {
        /// Chunk length
        expected: usize,
        /// Bytes the sink accepted
        consumed: usize,
    },

    /// The transfer was dropped without ever signaling completion.
    #[error("Transfer completion signal lost")]
    CompletionLost,
}

impl HttpError {
    /// Category this failure belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            HttpError::InvalidHeader { .. } => ErrorCategory::Request,
            HttpError::Transport { .. } => ErrorCategory::Transport,
            HttpError::Status { .. } => ErrorCategory::Protocol,
            HttpError::Aborted | HttpError::Cancelled => ErrorCategory::Cancellation,
            HttpError::Shutdown | HttpError::WriteMismatch { .. } | HttpError::CompletionLost => {
                ErrorCategory::Engine
            }
        }
    }

    /// HTTP status for protocol failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Transport failure kind, if this is a transport failure.
    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            HttpError::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether a caller may reasonably retry the same request.
    ///
    /// Only transport failures qualify; a builder error means the request
    /// itself is malformed and will fail again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HttpError::Transport { kind, .. } if *kind != TransportErrorKind::Builder
        )
    }

    /// Whether the transfer ended because someone asked it to stop.
    pub fn is_cancellation(&self) -> bool {
        self.category() == ErrorCategory::Cancellation
    }
}
