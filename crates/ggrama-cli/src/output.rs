//! Result emission

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Pretty-print to `out`, followed by a newline.
pub fn write_pretty<W: Write>(mut out: W, value: &Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value).context("failed to serialize the result")?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write compact JSON to `path`, replacing any existing file.
pub fn write_file(path: &Path, value: &Value) -> Result<()> {
    let text = serde_json::to_string(value).context("failed to serialize the result")?;
    std::fs::write(path, text)
        .with_context(|| format!("failed to write output file {}", path.display()))
}

/// Emit to `path` when given, stdout otherwise.
pub fn emit(path: Option<&Path>, value: &Value) -> Result<()> {
    match path {
        Some(path) => write_file(path, value),
        None => write_pretty(std::io::stdout().lock(), value),
    }
}
