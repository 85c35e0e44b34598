//! Turning command-line input into requests.

use anyhow::{bail, Context, Result};

use crate::config::Opt;
use crate::request::{Headers, Request};
use crate::uri::Uri;

/// Parses a `Name: value` header line.
///
/// Whitespace around the name and value is trimmed. The name must be
/// non-empty; the value may be empty.
pub fn parse_header(line: &str) -> Result<(String, String)> {
    let Some((name, value)) = line.split_once(':') else {
        bail!("Invalid header {line:?}: expected \"Name: value\"");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid header {line:?}: empty name");
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parses every header line. A later line with the same name replaces an
/// earlier one.
pub fn parse_headers(lines: &[String]) -> Result<Headers> {
    let mut headers = Headers::new();
    for line in lines {
        let (name, value) = parse_header(line)?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Loads the POST payload from `--data` or `--data-file`, `None` for GET.
pub async fn load_payload(opt: &Opt) -> Result<Option<Vec<u8>>> {
    if let Some(data) = &opt.data {
        return Ok(Some(data.clone().into_bytes()));
    }
    let Some(path) = &opt.data_file else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read payload from {}", path.display()))?;
    Ok(Some(bytes))
}

/// Builds the request for one target.
pub fn build_request(target: &str, payload: Option<&[u8]>, binary: bool) -> Result<Request> {
    let uri = Uri::new(target, 0).with_context(|| format!("Invalid target {target:?}"))?;
    let request = Request::new(uri);
    Ok(match payload {
        Some(data) if binary => request.with_binary_data(data),
        Some(data) => request.with_form_data(data),
        None => request,
    })
}
