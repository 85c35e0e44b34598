//! Configuration types and CLI options.
//!
//! `Config` is the library configuration used to build the shared engine and
//! the clients issuing requests through it. `Opt` is the command-line surface
//! of the `clonk-http` binary and converts into a `Config`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_REDIRECTS, DEFAULT_RETRIES, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};

/// Logging level for the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// One JSON object per line
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// Engine-wide knobs (`connect_timeout_seconds`, `max_redirects`, `proxy`,
/// `user_agent`) are applied once when the engine is initialized. The rest are
/// defaults for clients created with [`crate::initialization::init_client`].
///
/// # Examples
///
/// ```
/// use clonk_http::Config;
///
/// let config = Config {
///     default_port: 8080,
///     timeout_seconds: 5,
///     ..Default::default()
/// };
/// assert!(config.follow_redirects);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Per-request timeout in seconds (0 disables it)
    pub timeout_seconds: u64,

    /// TCP connect timeout in seconds (0 disables it)
    pub connect_timeout_seconds: u64,

    /// Whether transfers follow redirects
    pub follow_redirects: bool,

    /// Redirect hop limit when following redirects
    pub max_redirects: usize,

    /// Proxy URL for all transfers (scheme `http`, `https` or `socks5`)
    pub proxy: Option<String>,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Port used when a request's URI does not name one (0 keeps the scheme default)
    pub default_port: u16,
}

impl Config {
    /// Per-request timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }

    /// Connect timeout, `None` when disabled.
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_seconds > 0)
            .then(|| Duration::from_secs(self.connect_timeout_seconds))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            connect_timeout_seconds: DEFAULT_CONNECT_TIMEOUT_SECS,
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            proxy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_port: 0,
        }
    }
}

/// Command-line options for the `clonk-http` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "clonk-http",
    version,
    about = "Fetch one or more URLs concurrently through the shared HTTP engine"
)]
pub struct Opt {
    /// Target URLs or server addresses (`host[:port][/path]` defaults to http)
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Send this string as the POST body
    #[arg(short = 'd', long, conflicts_with = "data_file")]
    pub data: Option<String>,

    /// Send the contents of this file as the POST body
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Treat the POST body as opaque bytes instead of form data
    #[arg(long)]
    pub binary: bool,

    /// Extra request header, `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Port used when a URL does not name one
    #[arg(long, default_value_t = 0)]
    pub port: u16,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// TCP connect timeout in seconds (0 disables it)
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout_seconds: u64,

    /// Maximum redirect hops to follow
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Do not follow redirects
    #[arg(long)]
    pub no_redirects: bool,

    /// Proxy URL for all requests
    #[arg(long)]
    pub proxy: Option<String>,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Retries after a transport failure (HTTP status failures are never retried)
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: usize,

    /// Write response bodies to this file instead of stdout
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Log transfer progress
    #[arg(long)]
    pub progress: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Opt {
    /// Whether the requests are POSTs (a payload was given).
    pub fn is_post(&self) -> bool {
        self.data.is_some() || self.data_file.is_some()
    }

    /// Library configuration derived from the command line.
    pub fn config(&self) -> Config {
        Config {
            log_level: self.log_level,
            log_format: self.log_format,
            timeout_seconds: self.timeout_seconds,
            connect_timeout_seconds: self.connect_timeout_seconds,
            follow_redirects: !self.no_redirects,
            max_redirects: self.max_redirects,
            proxy: self.proxy.clone(),
            user_agent: self.user_agent.clone(),
            default_port: self.port,
        }
    }
}
