//! Writing response bodies.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Writes `bodies` back to back to `path`, or to stdout when `path` is `None`.
///
/// Bodies are written verbatim, in the order given. Returns the number of
/// bytes written.
pub fn write_bodies<'a, I>(path: Option<&Path>, bodies: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            let written = write_all_bodies(&mut BufWriter::new(file), bodies)
                .with_context(|| format!("Failed to write output file {}", path.display()))?;
            Ok(written)
        }
        None => {
            let stdout = io::stdout();
            let written = write_all_bodies(&mut stdout.lock(), bodies)
                .context("Failed to write to stdout")?;
            Ok(written)
        }
    }
}

fn write_all_bodies<'a, W, I>(writer: &mut W, bodies: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut written = 0;
    for body in bodies {
        writer.write_all(body)?;
        written += body.len();
    }
    writer.flush()?;
    Ok(written)
}
