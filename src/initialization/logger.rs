//! `env_logger` setup for the CLI.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter};

/// Installs the process logger.
///
/// `RUST_LOG` is read first and `level` is applied on top of it, so the
/// command line wins. Transport crates are held at `info`, `rustls` at
/// `warn`.
///
/// # Errors
///
/// Returns [`InitializationError::LoggerError`] when a logger is already
/// installed in this process.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for noisy in ["reqwest", "hyper", "hyper_util"] {
        builder.filter_module(noisy, LevelFilter::Info);
    }
    builder.filter_module("rustls", LevelFilter::Warn);
    builder.filter_module("clonk_http", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                let line = json_line(
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    &record.args().to_string(),
                );
                writeln!(buf, "{line}")
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let (marker, level) = styled_level(record.level());
                writeln!(
                    buf,
                    "{} {} {} [{}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    marker,
                    record.target().cyan(),
                    level,
                    record.args()
                )
            });
        }
    }

    builder.try_init()?;
    Ok(())
}

/// One structured log record: `ts` in Unix milliseconds, plus level, target
/// and message.
fn json_line(ts: i64, level: Level, target: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "ts": ts,
        "level": level.as_str(),
        "target": target,
        "msg": message,
    })
}

fn styled_level(level: Level) -> (&'static str, ColoredString) {
    let name = level.as_str();
    match level {
        Level::Error => ("❌", name.red()),
        Level::Warn => ("⚠️", name.yellow()),
        Level::Info => ("✔️", name.green()),
        Level::Debug => ("🔍", name.blue()),
        Level::Trace => ("🔬", name.purple()),
    }
}
