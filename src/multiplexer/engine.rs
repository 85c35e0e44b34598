//! The shared HTTP engine.
//!
//! One `HttpEngine` is initialized per process (or per test) and shared by
//! every client through `Arc`. Transfers run as tasks on the Tokio runtime the
//! engine was initialized in; the runtime's I/O driver is the readiness-based
//! event loop that multiplexes their sockets. `reqwest` performs the HTTP
//! exchange and pools connections across transfers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use reqwest::redirect::Policy;
use reqwest::ClientBuilder;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use super::{Multiplexer, TransferEvents, TransferId};
use crate::config::Config;
use crate::error_handling::{
    http_error_from_reqwest, EngineStats, HttpError, InitializationError,
};
use crate::transfer::TransferHandle;

struct ActiveTransfer {
    abort: AbortHandle,
    events: Arc<dyn TransferEvents>,
}

type Registry = Arc<Mutex<HashMap<TransferId, ActiveTransfer>>>;

fn lock_registry(
    registry: &Mutex<HashMap<TransferId, ActiveTransfer>>,
) -> MutexGuard<'_, HashMap<TransferId, ActiveTransfer>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-wide transfer engine.
///
/// Registration, deregistration, completion and shutdown all go through one
/// registry lock, so concurrent clients on different threads cannot corrupt
/// the set of in-flight transfers.
pub struct HttpEngine {
    client: reqwest::Client,
    no_redirect_client: reqwest::Client,
    runtime: Handle,
    registry: Registry,
    next_id: AtomicU64,
    shutdown: CancellationToken,
    stats: Arc<EngineStats>,
}

impl HttpEngine {
    /// Initializes the engine on the current Tokio runtime.
    ///
    /// Builds two underlying clients from `config`: one following up to
    /// `max_redirects` redirects and one not following redirects at all.
    ///
    /// # Errors
    ///
    /// Fails outside a Tokio runtime, on an invalid proxy URL, or when the
    /// TLS backend cannot be initialized.
    pub fn init(config: &Config) -> Result<Arc<Self>, InitializationError> {
        let runtime = Handle::try_current()?;
        let client = build_client(config, Policy::limited(config.max_redirects))?;
        let no_redirect_client = build_client(config, Policy::none())?;

        info!(
            "HTTP engine initialized (connect timeout: {:?}, timeout: {:?}, max redirects: {}, proxy: {})",
            config.connect_timeout(),
            config.timeout(),
            config.max_redirects,
            config.proxy.as_deref().unwrap_or("none")
        );

        Ok(Arc::new(Self {
            client,
            no_redirect_client,
            runtime,
            registry: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            shutdown: CancellationToken::new(),
            stats: Arc::new(EngineStats::new()),
        }))
    }

    /// Outcome counters for every transfer this engine has driven.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Whether [`Multiplexer::shutdown`] has run.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

fn build_client(config: &Config, policy: Policy) -> Result<reqwest::Client, InitializationError> {
    let mut builder = ClientBuilder::new()
        .redirect(policy)
        .user_agent(config.user_agent.clone());

    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout() {
        builder = builder.connect_timeout(connect_timeout);
    }
    if let Some(proxy) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy).map_err(|source| InitializationError::ProxyError {
            url: proxy.clone(),
            source,
        })?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

impl Multiplexer for HttpEngine {
    fn register(
        &self,
        handle: TransferHandle,
        events: Arc<dyn TransferEvents>,
    ) -> Result<TransferId, HttpError> {
        let client = if handle.options.follow_redirects {
            self.client.clone()
        } else {
            self.no_redirect_client.clone()
        };
        let description = handle.describe();

        let mut registry = lock_registry(&self.registry);
        // Checked under the lock: shutdown cancels the token before draining.
        if self.shutdown.is_cancelled() {
            return Err(HttpError::Shutdown);
        }

        let id = TransferId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        // Spawned while the lock is held so the task cannot finish and try to
        // remove itself before it is inserted.
        let task = self.runtime.spawn(drive_transfer(
            id,
            client,
            handle,
            Arc::clone(&events),
            Arc::clone(&self.registry),
            Arc::clone(&self.stats),
            self.shutdown.clone(),
        ));
        registry.insert(
            id,
            ActiveTransfer {
                abort: task.abort_handle(),
                events,
            },
        );
        self.stats.record_registered();

        debug!(
            "Registered transfer {id}: {description} ({} active)",
            registry.len()
        );
        Ok(id)
    }

    fn deregister(&self, id: TransferId) -> bool {
        let Some(transfer) = lock_registry(&self.registry).remove(&id) else {
            return false;
        };
        transfer.abort.abort();
        self.stats.record_failure(&HttpError::Cancelled);
        debug!("Deregistered transfer {id}");
        true
    }

    fn active_transfers(&self) -> usize {
        lock_registry(&self.registry).len()
    }

    fn shutdown(&self) {
        self.shutdown.cancel();
        let drained: Vec<(TransferId, ActiveTransfer)> =
            lock_registry(&self.registry).drain().collect();

        if !drained.is_empty() {
            info!(
                "Shutting down HTTP engine with {} transfer(s) in flight",
                drained.len()
            );
        }
        for (id, transfer) in drained {
            transfer.abort.abort();
            self.stats.record_failure(&HttpError::Shutdown);
            debug!("Transfer {id} resolved by shutdown");
            transfer.events.on_complete(Err(HttpError::Shutdown));
        }
    }
}

impl Drop for HttpEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs one transfer to completion and reports it, unless it was
/// deregistered or drained by shutdown in the meantime.
async fn drive_transfer(
    id: TransferId,
    client: reqwest::Client,
    handle: TransferHandle,
    events: Arc<dyn TransferEvents>,
    registry: Registry,
    stats: Arc<EngineStats>,
    shutdown: CancellationToken,
) {
    let outcome = tokio::select! {
        _ = shutdown.cancelled() => Err(HttpError::Shutdown),
        outcome = perform_transfer(&client, handle, events.as_ref()) => outcome,
    };

    // Whoever removes the entry owns the terminal signal.
    let owned = lock_registry(&registry).remove(&id).is_some();
    if !owned {
        return;
    }

    stats.record_outcome(&outcome);
    match &outcome {
        Ok(()) => debug!("Transfer {id} completed"),
        Err(error) if error.is_cancellation() => debug!("Transfer {id} stopped: {error}"),
        Err(error) => warn!("Transfer {id} failed: {error}"),
    }
    events.on_complete(outcome);
}

async fn perform_transfer(
    client: &reqwest::Client,
    handle: TransferHandle,
    events: &dyn TransferEvents,
) -> Result<(), HttpError> {
    let TransferHandle {
        method,
        url,
        headers,
        body,
        options,
    } = handle;

    let mut builder = client.request(method, url).headers(headers);
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(body) = body {
        builder = builder.body(body);
    }

    let mut response = builder.send().await.map_err(http_error_from_reqwest)?;

    if let Some(address) = response.remote_addr() {
        events.on_connected(address);
    }

    let status = response.status();
    if !status.is_success() {
        return Err(HttpError::Status {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown Status Code")
                .to_string(),
        });
    }

    let total = response.content_length().unwrap_or(0);
    let mut transferred = 0u64;
    if !events.on_progress(total, transferred) {
        return Err(HttpError::Aborted);
    }

    while let Some(chunk) = response.chunk().await.map_err(http_error_from_reqwest)? {
        let consumed = events.on_data(&chunk);
        // A sink that takes nothing has been resolved by a concurrent cancel.
        if consumed == 0 && !chunk.is_empty() {
            return Err(HttpError::Cancelled);
        }
        if consumed != chunk.len() {
            return Err(HttpError::WriteMismatch {
                expected: chunk.len(),
                consumed,
            });
        }
        transferred += chunk.len() as u64;
        if !events.on_progress(total, transferred) {
            return Err(HttpError::Aborted);
        }
    }

    Ok(())
}
