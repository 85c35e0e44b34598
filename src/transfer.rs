//! Prepared transfers.
//!
//! A [`TransferHandle`] is everything the multiplexer needs to perform one
//! request. The client builds it from a [`crate::Request`]; registration moves
//! it into the multiplexer, which drops it when the transfer ends or is
//! deregistered.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use url::Url;

/// Per-transfer knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    /// Follow redirects (bounded by the engine's redirect limit).
    pub follow_redirects: bool,
    /// Overall timeout for this transfer; `None` uses the engine default.
    pub timeout: Option<Duration>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            timeout: None,
        }
    }
}

/// One prepared request bound for the multiplexer.
#[derive(Debug)]
pub struct TransferHandle {
    /// Request method (GET or POST).
    pub method: Method,
    /// Absolute target URL, default port already applied.
    pub url: Url,
    /// Complete request headers (defaults overlaid with caller headers).
    pub headers: HeaderMap,
    /// Request body, sent verbatim.
    pub body: Option<Vec<u8>>,
    /// Per-transfer options.
    pub options: TransferOptions,
}

impl TransferHandle {
    /// A bodiless GET with default options.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: None,
            options: TransferOptions::default(),
        }
    }

    /// `METHOD url`, for log lines.
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}
