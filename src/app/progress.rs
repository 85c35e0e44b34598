//! Progress logging utilities.

use std::time::{Duration, Instant};

use log::info;

use crate::config::PROGRESS_LOG_INTERVAL;
use crate::multiplexer::ProgressCallback;

/// Formats one progress line.
///
/// `total` is 0 while the size is unknown.
pub fn format_progress(total: u64, transferred: u64, elapsed: Duration) -> String {
    let elapsed_secs = elapsed.as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        transferred as f64 / 1024.0 / elapsed_secs
    } else {
        0.0
    };
    if total > 0 {
        let percent = transferred as f64 * 100.0 / total as f64;
        format!(
            "{transferred}/{total} bytes ({percent:.1}%) in {elapsed_secs:.2}s (~{rate:.2} KiB/s)"
        )
    } else {
        format!("{transferred} bytes in {elapsed_secs:.2}s (~{rate:.2} KiB/s)")
    }
}

/// A progress callback logging `label` progress at most every
/// `PROGRESS_LOG_INTERVAL`, plus once when a known total is reached.
/// Never aborts the transfer.
pub fn progress_logger(label: String) -> ProgressCallback {
    let start = Instant::now();
    let mut last_logged: Option<Instant> = None;
    Box::new(move |total, transferred| {
        let now = Instant::now();
        let finished = total > 0 && transferred >= total;
        let due = match last_logged {
            Some(last) => now.duration_since(last) >= PROGRESS_LOG_INTERVAL,
            None => true,
        };
        if finished || due {
            last_logged = Some(now);
            info!(
                "{label}: {}",
                format_progress(total, transferred, now.duration_since(start))
            );
        }
        true
    })
}
