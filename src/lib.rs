//! clonk_http library: asynchronous HTTP requests over a shared engine
//!
//! This library issues GET and POST requests as awaitable tasks. Every
//! transfer is driven by one shared, multiplexed engine; callers get a
//! [`TransferTask`] that resolves with the response body and the address of
//! the server that answered, or with a categorized [`HttpError`].
//!
//! # Example
//!
//! ```no_run
//! use clonk_http::initialization::{init_client, init_engine};
//! use clonk_http::{Config, Headers, Request, Uri};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     default_port: 80,
//!     ..Default::default()
//! };
//! let engine = init_engine(&config)?;
//! let client = init_client(engine, &config);
//!
//! let request = Request::new(Uri::new("league.example/league.php", 0)?)
//!     .with_form_data("action=query");
//! let result = client.post_async(request, None, Headers::new()).await?;
//! println!("{} bytes", result.buffer.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! The engine requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or initialize it from within an async context. Tasks may be
//! awaited from any runtime thread.

#![warn(missing_docs)]

pub mod app;
mod client;
pub mod config;
mod error_handling;
pub mod initialization;
mod multiplexer;
mod request;
mod transfer;
mod uri;

// Re-export public API
pub use app::{run, RunReport};
pub use client::{HttpClient, TransferTask};
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use error_handling::{
    EngineStats, ErrorCategory, HttpError, InitializationError, TransportErrorKind, UriError,
};
pub use multiplexer::{
    HttpEngine, HttpResult, Multiplexer, ProgressCallback, ResultSink, TransferBinding,
    TransferEvents, TransferId, TransferOutcome,
};
pub use request::{Headers, Request};
pub use transfer::{TransferHandle, TransferOptions};
pub use uri::Uri;
