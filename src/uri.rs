//! Request target URIs.
//!
//! A [`Uri`] is built from a server address (anything from a bare host to a
//! full URL) and an optional port. Addresses without a scheme are taken as
//! `http`. Port 0 means "not specified"; the client may then substitute its
//! default port.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::config::DEFAULT_SCHEME;
use crate::error_handling::UriError;

/// Parsed, normalized request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    url: Url,
    host: String,
    explicit_port: bool,
}

impl Uri {
    /// Parses `server_address` and applies `port` when it is non-zero.
    ///
    /// # Errors
    ///
    /// Returns a [`UriError`] if the address does not parse, names no host,
    /// or cannot carry a port.
    ///
    /// # Examples
    ///
    /// ```
    /// use clonk_http::Uri;
    ///
    /// let uri = Uri::new("league.example", 8080).unwrap();
    /// assert_eq!(uri.server_address(), "league.example");
    /// assert_eq!(uri.uri_as_string(), "http://league.example:8080/");
    /// ```
    pub fn new(server_address: &str, port: u16) -> Result<Self, UriError> {
        let trimmed = server_address.trim();
        let candidate = if trimmed.contains("://") {
            Cow::Borrowed(trimmed)
        } else {
            Cow::Owned(format!("{DEFAULT_SCHEME}://{trimmed}"))
        };

        let mut url = Url::parse(&candidate).map_err(|source| UriError::Parse {
            address: server_address.to_string(),
            source,
        })?;

        if url.host_str().map_or(true, str::is_empty) {
            return Err(UriError::MissingHost {
                address: server_address.to_string(),
            });
        }

        // `Url` normalizes the host and drops default ports; both are taken
        // from the address as written.
        let (host, written_port) = split_authority(&candidate);
        let mut explicit_port = written_port.is_some();
        if port != 0 {
            url.set_port(Some(port))
                .map_err(|()| UriError::InvalidPort {
                    address: server_address.to_string(),
                    port,
                })?;
            explicit_port = true;
        }

        Ok(Self {
            url,
            host: host.to_string(),
            explicit_port,
        })
    }

    /// Host component only, without scheme, port or path, spelled as given.
    ///
    /// IPv6 hosts are returned in brackets (`[::1]`).
    pub fn server_address(&self) -> String {
        self.host.clone()
    }

    /// The complete URI, as handed to the transfer engine.
    pub fn uri_as_string(&self) -> String {
        self.url.as_str().to_string()
    }

    /// Port given explicitly by the address or the constructor.
    pub fn port(&self) -> Option<u16> {
        if self.explicit_port {
            self.url.port_or_known_default()
        } else {
            None
        }
    }

    /// Whether a port was specified.
    pub fn has_explicit_port(&self) -> bool {
        self.explicit_port
    }

    /// Applies `port` unless a port was already specified or `port` is 0.
    pub fn with_default_port(mut self, port: u16) -> Self {
        if !self.explicit_port && port != 0 && self.url.set_port(Some(port)).is_ok() {
            self.explicit_port = true;
        }
        self
    }

    /// Borrow the underlying URL.
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Consume the URI into the underlying URL.
    pub fn into_url(self) -> Url {
        self.url
    }
}

/// Splits the authority of `url` (which must contain `://`) into the host as
/// written and the port digits, if any.
fn split_authority(url: &str) -> (&str, Option<&str>) {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port);

    let (host, port) = match host_port.strip_prefix('[') {
        Some(bracketed) => match bracketed.split_once(']') {
            Some((inner, tail)) => (&host_port[..inner.len() + 2], tail.strip_prefix(':')),
            None => (host_port, None),
        },
        None => match host_port.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        },
    };
    let port =
        port.filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
    (host, port)
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::new(s, 0)
    }
}
