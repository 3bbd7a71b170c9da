//! Clean proxy list persistence
//!
//! The collector writes its accumulator exactly once, at shutdown. The list
//! is written to a uniquely named temporary file in the destination directory
//! and then renamed over the destination, so readers never observe a
//! half-written list and concurrent runs never share a staging file.

use crate::output::report::{OutputError, OutputResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Serializes `hosts` as a JSON array and atomically writes it to `path`
///
/// # Arguments
///
/// * `path` - Destination of the clean list
/// * `hosts` - `host:port` strings in the order they were collected
///
/// # Returns
///
/// * `Ok(())` - The list is on disk at `path`
/// * `Err(OutputError)` - Serialization or I/O failed; `path` is untouched
pub async fn write_clean_list(path: &Path, hosts: &[String]) -> OutputResult<()> {
    let bytes = serde_json::to_vec_pretty(hosts)?;
    let len = bytes.len();
    let destination = path.to_path_buf();

    let written = tokio::task::spawn_blocking(move || persist_atomically(&destination, &bytes))
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        .and_then(|result| result);

    if let Err(source) = written {
        return Err(OutputError::Write {
            path: path.display().to_string(),
            source,
        });
    }

    tracing::debug!("Wrote {} bytes to {}", len, path.display());
    Ok(())
}

/// Writes `bytes` to a fresh temporary file next to `path`, then renames it
///
/// The temporary file is removed if anything fails before the rename.
fn persist_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut staging = NamedTempFile::new_in(staging_dir(path))?;
    staging.write_all(bytes)?;
    staging.as_file().sync_all()?;
    staging.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Directory holding `path`; `.` for a bare file name
fn staging_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
