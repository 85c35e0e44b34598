//! The HTTP client.
//!
//! [`HttpClient`] turns a [`Request`] into a prepared transfer, registers it
//! with a shared [`Multiplexer`], and hands back a [`TransferTask`]: a future
//! that is already in flight when it is returned and resolves once the
//! multiplexer signals completion of that specific transfer.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use clonk_http::{Config, Headers, HttpClient, HttpEngine, Request, Uri};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = HttpEngine::init(&Config::default())?;
//! let client = HttpClient::new(engine).with_default_port(8080);
//!
//! let request = Request::new(Uri::new("league.example/league.php", 0)?);
//! let result = client.get_async(request, None, Headers::new()).await?;
//! println!("{} bytes from {:?}", result.buffer.len(), result.server_address);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use tokio::sync::oneshot;

use crate::config::{CONTENT_TYPE_BINARY, CONTENT_TYPE_FORM};
use crate::error_handling::HttpError;
use crate::multiplexer::{
    Multiplexer, ProgressCallback, TransferBinding, TransferEvents, TransferId, TransferOutcome,
};
use crate::request::{Headers, Request};
use crate::transfer::{TransferHandle, TransferOptions};

/// Issues requests through a shared multiplexer.
///
/// Cloning is cheap; clones share the multiplexer.
#[derive(Clone)]
pub struct HttpClient {
    multiplexer: Arc<dyn Multiplexer>,
    default_port: u16,
    timeout: Option<Duration>,
    follow_redirects: bool,
}

impl HttpClient {
    /// A client with no default port, the engine's timeout, and redirects followed.
    pub fn new(multiplexer: Arc<dyn Multiplexer>) -> Self {
        Self {
            multiplexer,
            default_port: 0,
            timeout: None,
            follow_redirects: true,
        }
    }

    /// Port applied to requests whose URI names none (0 disables).
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    /// Per-request timeout overriding the engine default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether transfers follow redirects.
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Port used for requests whose address names none; 0 leaves the scheme default.
    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    /// The multiplexer this client registers transfers with.
    pub fn multiplexer(&self) -> &Arc<dyn Multiplexer> {
        &self.multiplexer
    }

    /// Issues a GET. The request body is ignored.
    pub fn get_async(
        &self,
        request: Request,
        progress: Option<ProgressCallback>,
        headers: Headers,
    ) -> TransferTask {
        self.request_async(request, progress, headers, false)
    }

    /// Issues a POST with `request.data` as body.
    ///
    /// Binary requests are sent as `application/octet-stream`, textual ones as
    /// `application/x-www-form-urlencoded`; a `Content-Type` in `headers` wins.
    /// The payload bytes are never transformed.
    pub fn post_async(
        &self,
        request: Request,
        progress: Option<ProgressCallback>,
        headers: Headers,
    ) -> TransferTask {
        self.request_async(request, progress, headers, true)
    }

    fn request_async(
        &self,
        request: Request,
        progress: Option<ProgressCallback>,
        headers: Headers,
        post: bool,
    ) -> TransferTask {
        let (binding, completion) = TransferBinding::new(progress);
        let mut task = TransferTask {
            id: None,
            binding: Arc::clone(&binding),
            multiplexer: Arc::clone(&self.multiplexer),
            completion,
            finished: false,
        };

        let handle = match self.prepare_request(request, &headers, post) {
            Ok(handle) => handle,
            Err(error) => {
                warn!("Could not prepare request: {error}");
                binding.fail(error);
                return task;
            }
        };

        let description = handle.describe();
        let events: Arc<dyn TransferEvents> = binding.clone();
        match self.multiplexer.register(handle, events) {
            Ok(id) => {
                debug!("{description} issued as transfer {id}");
                task.id = Some(id);
            }
            Err(error) => {
                warn!("Could not register {description}: {error}");
                binding.fail(error);
            }
        }
        task
    }

    /// Builds the transfer handle for `request`.
    ///
    /// Applies the default port, the method, the default content type for
    /// POST, and the caller's headers on top.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidHeader`] for a header name or value that is
    /// not valid HTTP.
    pub fn prepare_request(
        &self,
        request: Request,
        headers: &Headers,
        post: bool,
    ) -> Result<TransferHandle, HttpError> {
        let Request { uri, binary, data } = request;
        let uri = uri.with_default_port(self.default_port);

        let mut header_map = HeaderMap::new();
        if post {
            let content_type = if binary {
                CONTENT_TYPE_BINARY
            } else {
                CONTENT_TYPE_FORM
            };
            header_map.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        for (name, value) in headers {
            let invalid = || HttpError::InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            header_map.insert(header_name, header_value);
        }

        Ok(TransferHandle {
            method: if post { Method::POST } else { Method::GET },
            url: uri.into_url(),
            headers: header_map,
            body: post.then_some(data),
            options: TransferOptions {
                follow_redirects: self.follow_redirects,
                timeout: self.timeout,
            },
        })
    }
}

/// An in-flight transfer.
///
/// Awaiting yields the transfer's outcome. Dropping the task before it
/// resolves cancels the transfer; [`TransferTask::cancel`] does the same and
/// lets the task resolve with [`HttpError::Cancelled`].
#[must_use = "dropping a TransferTask cancels the transfer"]
pub struct TransferTask {
    id: Option<TransferId>,
    binding: Arc<TransferBinding>,
    multiplexer: Arc<dyn Multiplexer>,
    completion: oneshot::Receiver<TransferOutcome>,
    finished: bool,
}

impl TransferTask {
    /// Multiplexer registration, `None` if the transfer never got registered.
    pub fn id(&self) -> Option<TransferId> {
        self.id
    }

    /// Whether the outcome is already decided.
    pub fn is_resolved(&self) -> bool {
        self.binding.is_terminal()
    }

    /// Chunks written into the result buffer so far.
    pub fn write_count(&self) -> usize {
        self.binding.write_count()
    }

    /// Progress reports forwarded to the progress callback so far.
    pub fn progress_count(&self) -> usize {
        self.binding.progress_count()
    }

    /// Cancels the transfer.
    ///
    /// Once this returns, no further writes or progress reports are observed
    /// and the transfer is deregistered. Has no effect on a transfer that
    /// already resolved.
    pub fn cancel(&mut self) {
        if !self.binding.cancel() {
            return;
        }
        if let Some(id) = self.id {
            self.multiplexer.deregister(id);
            debug!("Transfer {id} cancelled");
        }
    }
}

impl Future for TransferTask {
    type Output = TransferOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let received = ready!(Pin::new(&mut self.completion).poll(cx));
        self.finished = true;
        Poll::Ready(received.unwrap_or(Err(HttpError::CompletionLost)))
    }
}

impl Drop for TransferTask {
    fn drop(&mut self) {
        if !self.finished {
            self.cancel();
        }
    }
}
