// Shared test helpers: a scripted multiplexer and raw TCP test servers.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clonk_http::{HttpError, Multiplexer, TransferEvents, TransferHandle, TransferId};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One event a [`ScriptedMultiplexer`] replays for a transfer.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Step {
    Connected(SocketAddr),
    Data(Vec<u8>),
    Progress(u64, u64),
    Pause(Duration),
    Complete(Result<(), HttpError>),
}

/// Replays the same script for every registered transfer on a spawned task,
/// honoring deregistration between steps like a real engine would.
#[allow(dead_code)]
pub struct ScriptedMultiplexer {
    script: Vec<Step>,
    next_id: AtomicU64,
    active: Mutex<HashMap<TransferId, Arc<AtomicBool>>>,
    handles: Mutex<Vec<TransferHandle>>,
}

#[allow(dead_code)]
impl ScriptedMultiplexer {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script,
            next_id: AtomicU64::new(1),
            active: Mutex::new(HashMap::new()),
            handles: Mutex::new(Vec::new()),
        })
    }

    /// `(method, url)` of every handle registered so far.
    pub fn registered(&self) -> Vec<(String, String)> {
        self.handles
            .lock()
            .unwrap()
            .iter()
            .map(|h| (h.method.to_string(), h.url.to_string()))
            .collect()
    }
}

impl Multiplexer for ScriptedMultiplexer {
    fn register(
        &self,
        handle: TransferHandle,
        events: Arc<dyn TransferEvents>,
    ) -> Result<TransferId, HttpError> {
        let id = TransferId::from_raw(self.next_id.fetch_add(1, Ordering::SeqCst));
        let stopped = Arc::new(AtomicBool::new(false));
        self.active.lock().unwrap().insert(id, Arc::clone(&stopped));
        self.handles.lock().unwrap().push(handle);

        let script = self.script.clone();
        tokio::spawn(async move {
            for step in script {
                tokio::task::yield_now().await;
                if stopped.load(Ordering::SeqCst) {
                    return;
                }
                match step {
                    Step::Connected(address) => events.on_connected(address),
                    Step::Data(chunk) => {
                        if events.on_data(&chunk) != chunk.len() {
                            events.on_complete(Err(HttpError::WriteMismatch {
                                expected: chunk.len(),
                                consumed: 0,
                            }));
                            return;
                        }
                    }
                    Step::Progress(total, now) => {
                        if !events.on_progress(total, now) {
                            events.on_complete(Err(HttpError::Aborted));
                            return;
                        }
                    }
                    Step::Pause(duration) => tokio::time::sleep(duration).await,
                    Step::Complete(outcome) => {
                        events.on_complete(outcome);
                        return;
                    }
                }
            }
        });
        Ok(id)
    }

    fn deregister(&self, id: TransferId) -> bool {
        match self.active.lock().unwrap().remove(&id) {
            Some(stopped) => {
                stopped.store(true, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    fn active_transfers(&self) -> usize {
        self.active
            .lock()
            .unwrap()
            .values()
            .filter(|stopped| !stopped.load(Ordering::SeqCst))
            .count()
    }

    fn shutdown(&self) {}
}

/// Starts a one-connection HTTP/1.1 server that answers with a chunked body,
/// pausing `gap` between chunks. Returns the server's base URL.
#[allow(dead_code)]
pub async fn start_chunked_server(chunks: Vec<&'static str>, gap: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        read_request_head(&mut socket).await;
        let head = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        for chunk in chunks {
            let mut frame = format!("{:x}\r\n", chunk.len()).into_bytes();
            frame.extend_from_slice(chunk.as_bytes());
            frame.extend_from_slice(b"\r\n");
            if socket.write_all(&frame).await.is_err() || socket.flush().await.is_err() {
                return;
            }
            tokio::time::sleep(gap).await;
        }
        let _ = socket.write_all(b"0\r\n\r\n").await;
    });

    format!("http://{addr}")
}

/// Starts a server that announces `content_length` bytes, sends `prefix`,
/// and then stalls with the connection open.
#[allow(dead_code)]
pub async fn start_stalling_server(content_length: usize, prefix: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {content_length}\r\n\r\n"
                );
                if socket.write_all(head.as_bytes()).await.is_err() {
                    return;
                }
                let _ = socket.write_all(prefix).await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_secs(60)).await;
            });
        }
    });

    format!("http://{addr}")
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
}

/// Polls `condition` every 10ms until it holds or `timeout` elapses.
#[allow(dead_code)]
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
