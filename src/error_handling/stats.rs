//! Transfer outcome statistics.
//!
//! Thread-safe counters the engine updates as transfers are registered and
//! finish. Every category and transport kind is initialized to zero up front.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorCategory, HttpError, TransportErrorKind};

/// Thread-safe engine statistics.
///
/// Shared between the engine and its driving tasks through `Arc`.
pub struct EngineStats {
    registered: AtomicUsize,
    succeeded: AtomicUsize,
    failures: HashMap<ErrorCategory, AtomicUsize>,
    transport: HashMap<TransportErrorKind, AtomicUsize>,
}

impl EngineStats {
    /// Creates counters with every category and transport kind at zero.
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for category in ErrorCategory::iter() {
            failures.insert(category, AtomicUsize::new(0));
        }

        let mut transport = HashMap::new();
        for kind in TransportErrorKind::iter() {
            transport.insert(kind, AtomicUsize::new(0));
        }

        EngineStats {
            registered: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            failures,
            transport,
        }
    }

    /// Counts one transfer accepted by the engine.
    pub fn record_registered(&self) {
        self.registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the terminal outcome of one transfer.
    pub fn record_outcome(&self, outcome: &Result<(), HttpError>) {
        match outcome {
            Ok(()) => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
            }
            Err(error) => self.record_failure(error),
        }
    }

    /// Counts `error` under its category and, for transport errors, its kind.
    pub fn record_failure(&self, error: &HttpError) {
        if let Some(counter) = self.failures.get(&error.category()) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(counter) = error
            .transport_kind()
            .and_then(|kind| self.transport.get(&kind))
        {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Transfers accepted so far.
    pub fn registered(&self) -> usize {
        self.registered.load(Ordering::SeqCst)
    }

    /// Transfers that finished without error.
    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    /// Failures recorded for one category.
    pub fn failure_count(&self, category: ErrorCategory) -> usize {
        self.failures
            .get(&category)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Transport failures recorded for one kind.
    pub fn transport_count(&self, kind: TransportErrorKind) -> usize {
        self.transport
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Failures across all categories.
    pub fn total_failures(&self) -> usize {
        ErrorCategory::iter().map(|c| self.failure_count(c)).sum()
    }
}

impl Default for EngineStats {
    fn default() -> Self {
        Self::new()
    }
}
