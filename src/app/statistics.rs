//! Statistics printing.

use log::{debug, info};
use strum::IntoEnumIterator;

use crate::error_handling::{EngineStats, ErrorCategory, TransportErrorKind};

/// Prints engine outcome counters to the log.
///
/// The one-line summary is logged at info level, per-category and
/// per-transport-kind counts at debug level. Zero counts are skipped.
pub fn print_engine_statistics(stats: &EngineStats) {
    let total_failures = stats.total_failures();
    info!(
        "Transfers: {} registered, {} succeeded, {} failed",
        stats.registered(),
        stats.succeeded(),
        total_failures
    );

    if total_failures > 0 {
        debug!("Failure Counts ({} total):", total_failures);
        for category in ErrorCategory::iter() {
            let count = stats.failure_count(category);
            if count > 0 {
                debug!("   {}: {}", category.as_str(), count);
            }
        }
    }

    let transport_failures = stats.failure_count(ErrorCategory::Transport);
    if transport_failures > 0 {
        debug!("Transport Failure Kinds ({} total):", transport_failures);
        for kind in TransportErrorKind::iter() {
            let count = stats.transport_count(kind);
            if count > 0 {
                debug!("   {}: {}", kind.as_str(), count);
            }
        }
    }
}
