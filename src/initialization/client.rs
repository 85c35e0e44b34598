//! HTTP engine and client initialization.
//!
//! The engine is initialized once and shared; clients are cheap and may be
//! created per caller with their own defaults.

use std::sync::Arc;

use crate::client::HttpClient;
use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::multiplexer::{HttpEngine, Multiplexer};

/// Initializes the shared HTTP engine.
///
/// Creates an [`HttpEngine`] on the current Tokio runtime configured with:
/// - User-Agent header from the config
/// - Connect and request timeouts from the config
/// - Redirect following bounded by `max_redirects`
/// - Optional proxy for all transfers
///
/// # Errors
///
/// Returns an `InitializationError` if called outside a Tokio runtime, if the
/// proxy URL is invalid, or if the underlying client cannot be built.
pub fn init_engine(config: &Config) -> Result<Arc<HttpEngine>, InitializationError> {
    HttpEngine::init(config)
}

/// Creates a client over `multiplexer` with the config's per-request defaults
/// (default port, timeout, redirect following).
pub fn init_client(multiplexer: Arc<dyn Multiplexer>, config: &Config) -> HttpClient {
    let mut client = HttpClient::new(multiplexer)
        .with_default_port(config.default_port)
        .with_follow_redirects(config.follow_redirects);
    if let Some(timeout) = config.timeout() {
        client = client.with_timeout(timeout);
    }
    client
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Headers, Request};
    use crate::uri::Uri;

    #[tokio::test]
    async fn test_init_client_applies_config_defaults() {
        let config = Config {
            default_port: 8080,
            follow_redirects: false,
            timeout_seconds: 7,
            ..Default::default()
        };
        let engine = init_engine(&config).unwrap();
        let client = init_client(engine, &config);
        assert_eq!(client.default_port(), 8080);

        let handle = client
            .prepare_request(
                Request::new(Uri::new("example.com", 0).unwrap()),
                &Headers::new(),
                false,
            )
            .unwrap();
        assert_eq!(handle.url.port(), Some(8080));
        assert!(!handle.options.follow_redirects);
        assert_eq!(handle.options.timeout, config.timeout());
    }

    #[test]
    fn test_init_engine_outside_runtime_fails() {
        assert!(init_engine(&Config::default()).is_err());
    }
}
