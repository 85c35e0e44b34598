//! Caller-facing request values.

use std::collections::HashMap;

use crate::uri::Uri;

/// Extra request headers, name to value.
///
/// Keys are unique; a later insertion replaces an earlier one. When applied
/// to a transfer, names are compared case-insensitively and override the
/// client's defaults.
pub type Headers = HashMap<String, String>;

/// One HTTP request as issued by a caller.
///
/// The payload is an owned copy, so the request carries no borrow into
/// caller memory while the transfer is in flight. It is only sent for POST
/// requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Target of the request.
    pub uri: Uri,
    /// Send `data` as opaque bytes (`true`) or as textual form data (`false`).
    pub binary: bool,
    /// Request body for POST.
    pub data: Vec<u8>,
}

impl Request {
    /// A request without payload.
    pub fn new(uri: Uri) -> Self {
        Self {
            uri,
            binary: false,
            data: Vec::new(),
        }
    }

    /// Attach a textual (form data) payload.
    pub fn with_form_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.binary = false;
        self.data = data.into();
        self
    }

    /// Attach an opaque binary payload.
    pub fn with_binary_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.binary = true;
        self.data = data.into();
        self
    }
}

impl From<Uri> for Request {
    fn from(uri: Uri) -> Self {
        Request::new(uri)
    }
}
