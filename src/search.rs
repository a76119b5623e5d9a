use crate::config::ArchiveRules;
use crate::filter::CompiledFilter;
use crate::mbox::{MboxError, MboxReader, RawMessage};
use crate::message::Message;
use colored::Colorize;
use comfy_table::{Cell, Table};
use serde_json::json;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;

/// Placeholder group key for messages without the grouped field
pub const MISSING_VALUE: &str = "<none>";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Archive(#[from] MboxError),
    #[error("Failed to write message {index}: {source}")]
    Write {
        index: usize,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub messages: usize,
    pub matches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountGroup {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountSummary {
    pub stats: ScanStats,
    /// Field the matches were grouped by, if any
    pub by: Option<String>,
    /// Sorted by descending count, then value
    pub groups: Vec<CountGroup>,
}

/// Run `on_match` for every message accepted by `filter`, in archive order
///
/// Without a filter every message matches.
pub fn scan_archive<R, F>(
    mut reader: MboxReader<R>,
    filter: Option<&CompiledFilter>,
    rules: &ArchiveRules,
    mut on_match: F,
) -> Result<ScanStats, ScanError>
where
    R: BufRead,
    F: FnMut(&RawMessage, &Message) -> io::Result<()>,
{
    let mut stats = ScanStats::default();

    for raw in reader.by_ref() {
        let raw = raw?;
        let message = Message::from_raw(&raw, rules);
        stats.messages += 1;

        let matched = filter.is_none_or(|filter| filter.matches(&message));
        tracing::trace!(index = raw.index, matched, "evaluated message");
        if !matched {
            continue;
        }

        stats.matches += 1;
        on_match(&raw, &message).map_err(|source| ScanError::Write {
            index: raw.index,
            source,
        })?;
    }

    if reader.skipped_preamble() > 0 {
        tracing::debug!(
            bytes = reader.skipped_preamble(),
            "skipped content before the first message"
        );
    }

    Ok(stats)
}

/// Count matching messages, optionally grouped by the value of a field
pub fn count_matches<R: BufRead>(
    reader: MboxReader<R>,
    filter: Option<&CompiledFilter>,
    rules: &ArchiveRules,
    by: Option<&str>,
) -> Result<CountSummary, ScanError> {
    let mut grouped: BTreeMap<String, usize> = BTreeMap::new();

    let stats = scan_archive(reader, filter, rules, |_, message| {
        if let Some(field) = by {
            let key = message
                .get(field)
                .filter(|value| !value.is_empty())
                .unwrap_or(MISSING_VALUE);
            *grouped.entry(key.to_string()).or_insert(0) += 1;
        }
        Ok(())
    })?;

    let mut groups: Vec<_> = grouped
        .into_iter()
        .map(|(value, count)| CountGroup { value, count })
        .collect();
    groups.sort_by_key(|group| (Reverse(group.count), group.value.clone()));

    Ok(CountSummary {
        stats,
        by: by.map(str::to_string),
        groups,
    })
}

pub fn format_count_text(summary: &CountSummary) -> String {
    let Some(by) = &summary.by else {
        return format!("{}\n", summary.stats.matches);
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!(
            "{} of {} message{} matched, by {}",
            summary.stats.matches,
            summary.stats.messages,
            if summary.stats.messages == 1 { "" } else { "s" },
            by
        )
        .bold()
    );

    if summary.groups.is_empty() {
        return out;
    }

    let mut table = Table::new();
    table.set_header(vec![Cell::new(by), Cell::new("count")]);
    for group in &summary.groups {
        table.add_row(vec![Cell::new(&group.value), Cell::new(group.count)]);
    }
    let _ = writeln!(out, "{table}");

    out
}

pub fn format_count_json(file: &Path, filter: Option<&str>, summary: &CountSummary) -> String {
    let mut count = json!({
        "file": file.display().to_string(),
        "filter": filter,
        "messages": summary.stats.messages,
        "matches": summary.stats.matches,
    });

    if let Some(by) = &summary.by {
        count["by"] = json!(by);
        count["groups"] = summary
            .groups
            .iter()
            .map(|group| {
                json!({
                    "value": group.value,
                    "count": group.count,
                })
            })
            .collect();
    }

    serde_json::to_string_pretty(&json!({ "count": count }))
        .unwrap_or_else(|_| "{\"count\":{\"error\":\"failed to serialize count output\"}}".into())
}
