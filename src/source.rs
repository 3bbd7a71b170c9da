//! Proxy list loading
//!
//! The proxy list is read once, fully, before any worker is spawned. A JSON
//! array of strings is the primary format; any file without a `.json`
//! extension is read as plain text with one entry per line.

use crate::SourceError;
use std::path::Path;

/// Loads the raw proxy entries from `path`
///
/// Entries are returned exactly as written (JSON) or trimmed (plain text);
/// turning them into endpoints is left to the dispatcher so a bad entry only
/// skips itself instead of failing the whole list.
pub fn load_proxy_list(path: &Path) -> Result<Vec<String>, SourceError> {
    let shown = path.display().to_string();

    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: shown.clone(),
        source,
    })?;

    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

    let entries = if is_json {
        parse_json_list(&content).map_err(|source| SourceError::Parse {
            path: shown.clone(),
            source,
        })?
    } else {
        parse_text_list(&content)
    };

    tracing::info!("Loaded {} proxy entries from {}", entries.len(), shown);
    Ok(entries)
}

/// Parses a JSON array of proxy strings
pub fn parse_json_list(content: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parses one proxy per line, skipping blank lines and `#` comments
pub fn parse_text_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Returns the entries from `offset` onward
///
/// An offset equal to the list length yields an empty slice; anything past it
/// is a configuration mistake and is rejected before the pool starts.
pub fn slice_from(entries: &[String], offset: usize) -> Result<&[String], SourceError> {
    entries.get(offset..).ok_or(SourceError::OffsetOutOfRange {
        offset,
        len: entries.len(),
    })
}
