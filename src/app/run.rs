//! The `clonk-http` run: fetch every target concurrently, write the bodies.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::future::join_all;
use log::{error, info};

use crate::app::input::{build_request, load_payload, parse_headers};
use crate::app::output::write_bodies;
use crate::app::retry::fetch_with_retry;
use crate::app::statistics::print_engine_statistics;
use crate::config::Opt;
use crate::error_handling::HttpError;
use crate::initialization::{init_client, init_engine};
use crate::multiplexer::Multiplexer;

/// Results of a `clonk-http` run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of targets requested
    pub total_urls: usize,
    /// Number of targets fetched with a 2xx response
    pub successful: usize,
    /// Failed targets with their final error, in command-line order
    pub failures: Vec<(String, HttpError)>,
    /// Response bytes written to the output
    pub bytes_written: usize,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

impl RunReport {
    /// Number of targets that failed.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Runs `clonk-http` with the parsed command line.
///
/// All targets are issued at once through one shared engine. Successful
/// bodies are written in command-line order; failures are logged and
/// reported, not returned as an error.
///
/// # Errors
///
/// Fails before any request is issued if a header, the payload file, a
/// target, or the engine configuration is invalid, and afterwards only if
/// the output cannot be written.
pub async fn run(opt: Opt) -> Result<RunReport> {
    let start_time = Instant::now();
    let config = opt.config();
    let post = opt.is_post();

    let headers = parse_headers(&opt.headers)?;
    let payload = load_payload(&opt).await?;
    let requests = opt
        .urls
        .iter()
        .map(|target| build_request(target, payload.as_deref(), opt.binary))
        .collect::<Result<Vec<_>>>()?;

    let engine = init_engine(&config).context("Failed to initialize HTTP engine")?;
    let client = init_client(Arc::clone(&engine) as Arc<dyn Multiplexer>, &config);

    info!(
        "Issuing {} {} request{}",
        requests.len(),
        if post { "POST" } else { "GET" },
        if requests.len() == 1 { "" } else { "s" }
    );

    let fetched = join_all(requests.iter().map(|request| {
        fetch_with_retry(&client, request, &headers, post, opt.retries, opt.progress)
    }))
    .await;

    let mut bodies = Vec::new();
    let mut failures = Vec::new();
    for (request, fetch) in requests.iter().zip(fetched) {
        let target = request.uri.to_string();
        match fetch.outcome {
            Ok(result) => {
                let from = result
                    .server_address
                    .map(|address| format!(" from {address}"))
                    .unwrap_or_default();
                info!(
                    "{target}: {} bytes{from} after {} attempt{}",
                    result.buffer.len(),
                    fetch.attempts,
                    if fetch.attempts == 1 { "" } else { "s" }
                );
                bodies.push(result.buffer);
            }
            Err(e) => {
                error!("{target}: {e} [{}]", e.category());
                failures.push((target, e));
            }
        }
    }

    let bytes_written = write_bodies(opt.output.as_deref(), bodies.iter().map(Vec::as_slice))?;

    engine.shutdown();
    print_engine_statistics(engine.stats());

    Ok(RunReport {
        total_urls: requests.len(),
        successful: bodies.len(),
        failures,
        bytes_written,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}
