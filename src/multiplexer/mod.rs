//! Transfer multiplexing.
//!
//! A [`Multiplexer`] drives many concurrent transfers and reports each one's
//! progress through a [`TransferEvents`] implementation. Production code uses
//! the shared [`HttpEngine`]; tests can substitute a scripted implementation.
//!
//! # Callback contract
//!
//! For one registered transfer the multiplexer calls, in order:
//! - `on_connected` at most once, when the peer address is known
//! - `on_data` for each body chunk in wire order, interleaved with
//!   `on_progress` for cumulative byte counts
//! - `on_complete` once, unless the transfer was deregistered first
//!
//! A short count from `on_data` or `false` from `on_progress` stops the
//! transfer.

mod binding;
mod engine;

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::error_handling::HttpError;
use crate::transfer::TransferHandle;

pub use binding::{HttpResult, ProgressCallback, ResultSink, TransferBinding, TransferOutcome};
pub use engine::HttpEngine;

/// Identifier of one registration with a multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(u64);

impl TransferId {
    /// Wraps a raw identifier. Multiplexers must not reuse identifiers.
    pub fn from_raw(raw: u64) -> Self {
        TransferId(raw)
    }

    /// The raw identifier.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-transfer callbacks invoked by a multiplexer.
pub trait TransferEvents: Send + Sync {
    /// The transport connected to `address`.
    fn on_connected(&self, address: SocketAddr);

    /// A chunk of response body arrived. Returns the number of bytes consumed.
    fn on_data(&self, chunk: &[u8]) -> usize;

    /// Cumulative byte counts; `total` is 0 while unknown. Returning `false`
    /// aborts the transfer.
    fn on_progress(&self, total: u64, transferred: u64) -> bool;

    /// The transfer finished, successfully or not.
    fn on_complete(&self, outcome: Result<(), HttpError>);
}

/// A shared engine driving concurrent transfers.
///
/// Implementations serialize registration and deregistration internally, so
/// one instance can be shared by any number of clients across threads.
pub trait Multiplexer: Send + Sync {
    /// Starts driving `handle`, reporting through `events`.
    ///
    /// # Errors
    ///
    /// Fails when the multiplexer no longer accepts transfers.
    fn register(
        &self,
        handle: TransferHandle,
        events: Arc<dyn TransferEvents>,
    ) -> Result<TransferId, HttpError>;

    /// Stops driving `id` and releases its handle without calling
    /// `on_complete`. A callback already running on another thread may still
    /// finish. Returns whether `id` was still registered.
    fn deregister(&self, id: TransferId) -> bool;

    /// Number of transfers currently registered.
    fn active_transfers(&self) -> usize;

    /// Resolves all in-flight transfers with [`HttpError::Shutdown`] and
    /// refuses further registrations. Idempotent.
    fn shutdown(&self);
}
