//! Fetching one target with caller-side retry.

use log::{info, warn};
use tokio_retry::RetryIf;

use crate::app::progress::progress_logger;
use crate::client::HttpClient;
use crate::error_handling::{get_retry_strategy, HttpError};
use crate::multiplexer::TransferOutcome;
use crate::request::{Headers, Request};

/// Result of [`fetch_with_retry`].
#[derive(Debug)]
pub struct FetchOutcome {
    /// Final outcome after the last attempt.
    pub outcome: TransferOutcome,
    /// Attempts made, including the first.
    pub attempts: usize,
}

/// Issues `request` and retries transport failures up to `retries` times
/// with exponential backoff.
///
/// Only errors for which [`HttpError::is_retryable`] holds are retried: an
/// HTTP status, a cancellation, or an engine shutdown ends the fetch
/// immediately. With `progress` set, each attempt logs its progress.
pub async fn fetch_with_retry(
    client: &HttpClient,
    request: &Request,
    headers: &Headers,
    post: bool,
    retries: usize,
    progress: bool,
) -> FetchOutcome {
    let label = format!("{} {}", if post { "POST" } else { "GET" }, request.uri);
    let mut attempts = 0;

    let outcome = RetryIf::spawn(
        get_retry_strategy(retries),
        || {
            attempts += 1;
            if attempts > 1 {
                info!("{label}: retry {}/{retries}", attempts - 1);
            }
            let progress = progress.then(|| progress_logger(label.clone()));
            if post {
                client.post_async(request.clone(), progress, headers.clone())
            } else {
                client.get_async(request.clone(), progress, headers.clone())
            }
        },
        |error: &HttpError| {
            warn!("{label} failed ({error})");
            error.is_retryable()
        },
    )
    .await;

    FetchOutcome { outcome, attempts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::TransportErrorKind;
    use crate::multiplexer::{Multiplexer, TransferEvents, TransferId};
    use crate::transfer::TransferHandle;
    use crate::uri::Uri;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Completes every transfer immediately with the next scripted outcome.
    struct ScriptedMultiplexer {
        outcomes: Mutex<Vec<Result<(), HttpError>>>,
        registrations: AtomicUsize,
    }

    impl ScriptedMultiplexer {
        fn new(mut outcomes: Vec<Result<(), HttpError>>) -> Arc<Self> {
            outcomes.reverse();
            Arc::new(Self {
                outcomes: Mutex::new(outcomes),
                registrations: AtomicUsize::new(0),
            })
        }
    }

    impl Multiplexer for ScriptedMultiplexer {
        fn register(
            &self,
            _handle: TransferHandle,
            events: Arc<dyn TransferEvents>,
        ) -> Result<TransferId, HttpError> {
            let n = self.registrations.fetch_add(1, Ordering::SeqCst) + 1;
            let outcome = self.outcomes.lock().unwrap().pop().unwrap_or(Ok(()));
            if outcome.is_ok() {
                events.on_data(b"ok");
            }
            events.on_complete(outcome);
            Ok(TransferId::from_raw(n as u64))
        }

        fn deregister(&self, _id: TransferId) -> bool {
            false
        }

        fn active_transfers(&self) -> usize {
            0
        }

        fn shutdown(&self) {}
    }

    fn connect_error() -> HttpError {
        HttpError::Transport {
            kind: TransportErrorKind::Connect,
            message: "connection refused".to_string(),
        }
    }

    fn request() -> Request {
        Request::new(Uri::new("example.com", 0).unwrap())
    }

    #[tokio::test]
    async fn test_transport_error_is_retried() {
        let multiplexer = ScriptedMultiplexer::new(vec![Err(connect_error()), Ok(())]);
        let client = HttpClient::new(multiplexer.clone());

        let fetched = fetch_with_retry(&client, &request(), &Headers::new(), false, 2, false).await;
        assert_eq!(fetched.attempts, 2);
        assert_eq!(fetched.outcome.unwrap().buffer, b"ok");
        assert_eq!(multiplexer.registrations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_status_error_is_not_retried() {
        let multiplexer = ScriptedMultiplexer::new(vec![Err(HttpError::Status {
            status: 503,
            reason: "Service Unavailable".to_string(),
        })]);
        let client = HttpClient::new(multiplexer);

        let fetched = fetch_with_retry(&client, &request(), &Headers::new(), true, 3, true).await;
        assert_eq!(fetched.attempts, 1);
        assert_eq!(fetched.outcome.unwrap_err().status(), Some(503));
    }

    #[tokio::test]
    async fn test_no_retries_returns_first_failure() {
        let multiplexer = ScriptedMultiplexer::new(vec![Err(connect_error()), Ok(())]);
        let client = HttpClient::new(multiplexer);

        let fetched = fetch_with_retry(&client, &request(), &Headers::new(), false, 0, false).await;
        assert_eq!(fetched.attempts, 1);
        assert_eq!(fetched.outcome, Err(connect_error()));
    }

    #[tokio::test]
    async fn test_retries_exhausted_returns_last_error() {
        let timeout = HttpError::Transport {
            kind: TransportErrorKind::Timeout,
            message: "operation timed out".to_string(),
        };
        let multiplexer = ScriptedMultiplexer::new(vec![
            Err(connect_error()),
            Err(timeout.clone()),
            Ok(()),
        ]);
        let client = HttpClient::new(multiplexer.clone());

        let fetched = fetch_with_retry(&client, &request(), &Headers::new(), false, 1, false).await;
        assert_eq!(fetched.attempts, 2);
        assert_eq!(fetched.outcome, Err(timeout));
        assert_eq!(multiplexer.registrations.load(Ordering::SeqCst), 2);
    }
}
