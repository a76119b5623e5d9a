use crate::config::ArchiveRules;
use crate::filter::CompiledFilter;
use crate::mbox::MboxReader;
use crate::search::{ScanError, ScanStats, scan_archive};
use serde_json::json;
use std::io::{BufRead, Write};
use std::path::Path;

/// Write every matching message verbatim to `out`, in archive order
///
/// Messages keep their separator line, so the output is itself a valid
/// archive.
pub fn extract_matches<R: BufRead, W: Write>(
    reader: MboxReader<R>,
    filter: Option<&CompiledFilter>,
    rules: &ArchiveRules,
    out: &mut W,
) -> Result<ScanStats, ScanError> {
    let stats = scan_archive(reader, filter, rules, |raw, _| out.write_all(&raw.bytes))?;
    out.flush().map_err(|source| ScanError::Write {
        index: stats.messages,
        source,
    })?;
    Ok(stats)
}

pub fn format_extract_text(stats: &ScanStats, destination: Option<&Path>) -> String {
    let target = destination
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    format!(
        "Extracted {} of {} message{} to {}\n",
        stats.matches,
        stats.messages,
        if stats.messages == 1 { "" } else { "s" },
        target
    )
}

pub fn format_extract_json(
    file: &Path,
    filter: Option<&str>,
    stats: &ScanStats,
    destination: Option<&Path>,
) -> String {
    serde_json::to_string_pretty(&json!({
        "extract": {
            "file": file.display().to_string(),
            "filter": filter,
            "messages": stats.messages,
            "matches": stats.matches,
            "output": destination.map(|path| path.display().to_string()),
        }
    }))
    .unwrap_or_else(|_| "{\"extract\":{\"error\":\"failed to serialize extract output\"}}".into())
}
