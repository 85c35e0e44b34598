//! Per-transfer binding between multiplexer callbacks and the awaiting task.
//!
//! The binding owns the result sink and the caller's progress callback, and
//! holds the sending half of the task's completion channel. Whichever terminal
//! event comes first (completion, progress abort, cancellation) takes the
//! sender; everything after that is ignored.

use std::mem;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::trace;
use tokio::sync::oneshot;

use super::TransferEvents;
use crate::error_handling::HttpError;

/// Progress hook: `(total, transferred)` in bytes, `total` 0 while unknown.
/// Returning `false` cancels the transfer.
pub type ProgressCallback = Box<dyn FnMut(u64, u64) -> bool + Send>;

/// What a transfer task resolves to.
pub type TransferOutcome = Result<HttpResult, HttpError>;

/// Successful transfer result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResult {
    /// Response body exactly as received.
    pub buffer: Vec<u8>,
    /// Address of the server actually connected to, if the transport reported it.
    pub server_address: Option<SocketAddr>,
}

/// Accumulates response bytes and the peer address for one transfer.
#[derive(Debug, Default)]
pub struct ResultSink {
    buffer: Vec<u8>,
    server_address: Option<SocketAddr>,
}

impl ResultSink {
    /// Appends `chunk`; returns the number of bytes consumed (all of them).
    pub fn append(&mut self, chunk: &[u8]) -> usize {
        self.buffer.extend_from_slice(chunk);
        chunk.len()
    }

    /// Records the peer address. The first report wins.
    pub fn record_address(&mut self, address: SocketAddr) {
        if self.server_address.is_none() {
            self.server_address = Some(address);
        }
    }

    /// Bytes received so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether no bytes were received yet.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Hands the accumulated data over as a result.
    pub fn finish(self) -> HttpResult {
        HttpResult {
            buffer: self.buffer,
            server_address: self.server_address,
        }
    }
}

struct BindingState {
    sink: ResultSink,
    progress: Option<ProgressCallback>,
    completion: Option<oneshot::Sender<TransferOutcome>>,
}

impl BindingState {
    fn is_terminal(&self) -> bool {
        self.completion.is_none()
    }

    /// Sends the terminal outcome. Returns `false` if one was already sent.
    fn resolve(&mut self, outcome: Result<(), HttpError>) -> bool {
        let Some(sender) = self.completion.take() else {
            return false;
        };
        let sink = mem::take(&mut self.sink);
        self.progress = None;
        // The receiver is gone when the task was dropped; nothing to deliver then.
        let _ = sender.send(outcome.map(|()| sink.finish()));
        true
    }
}

/// [`TransferEvents`] implementation feeding one transfer task.
pub struct TransferBinding {
    state: Mutex<BindingState>,
    writes: AtomicUsize,
    progress_calls: AtomicUsize,
}

impl TransferBinding {
    /// Creates a binding and the receiver its task awaits.
    pub fn new(
        progress: Option<ProgressCallback>,
    ) -> (Arc<Self>, oneshot::Receiver<TransferOutcome>) {
        let (sender, receiver) = oneshot::channel();
        let binding = Arc::new(Self {
            state: Mutex::new(BindingState {
                sink: ResultSink::default(),
                progress,
                completion: Some(sender),
            }),
            writes: AtomicUsize::new(0),
            progress_calls: AtomicUsize::new(0),
        });
        (binding, receiver)
    }

    fn lock(&self) -> MutexGuard<'_, BindingState> {
        // A panicking progress callback poisons the lock; the state is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the task has been resolved.
    pub fn is_terminal(&self) -> bool {
        self.lock().is_terminal()
    }

    /// Resolves the task with [`HttpError::Cancelled`]. Returns `false` if it
    /// was already resolved.
    pub fn cancel(&self) -> bool {
        self.fail(HttpError::Cancelled)
    }

    /// Resolves the task with `error`. Returns `false` if it was already resolved.
    pub fn fail(&self, error: HttpError) -> bool {
        self.lock().resolve(Err(error))
    }

    /// Number of chunks delivered into the sink.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of progress reports forwarded to the callback.
    pub fn progress_count(&self) -> usize {
        self.progress_calls.load(Ordering::SeqCst)
    }
}

impl TransferEvents for TransferBinding {
    fn on_connected(&self, address: SocketAddr) {
        let mut state = self.lock();
        if !state.is_terminal() {
            trace!("Transfer connected to {address}");
            state.sink.record_address(address);
        }
    }

    fn on_data(&self, chunk: &[u8]) -> usize {
        let mut state = self.lock();
        if state.is_terminal() {
            return 0;
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        state.sink.append(chunk)
    }

    fn on_progress(&self, total: u64, transferred: u64) -> bool {
        let mut state = self.lock();
        if state.is_terminal() {
            return false;
        }
        let Some(callback) = state.progress.as_mut() else {
            return true;
        };
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        if callback(total, transferred) {
            return true;
        }
        trace!("Progress callback aborted transfer at {transferred}/{total} bytes");
        state.resolve(Err(HttpError::Aborted));
        false
    }

    fn on_complete(&self, outcome: Result<(), HttpError>) {
        self.lock().resolve(outcome);
    }
}
