//! Extraction of worker-reported tool failures.

use subwatch_core::{EventKind, EventRecord};

use crate::stream::records;

/// Excerpt budget used in the compact supervision summary.
pub const POLL_EXCERPT_CHARS: usize = 150;

/// Excerpt budget used by the inspector report.
pub const INSPECT_EXCERPT_CHARS: usize = 100;

const ELLIPSIS: &str = "...";

/// Truncate `text` to `budget` characters, appending `...` when cut.
pub fn excerpt(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Error excerpts carried by one record (only `user` events carry them).
pub fn record_errors(record: &EventRecord, budget: usize) -> Vec<String> {
    if record.kind != EventKind::User {
        return Vec::new();
    }
    record
        .blocks()
        .iter()
        .filter(|block| block.is_failed_tool_result())
        .filter_map(|block| block.result_text())
        .map(|text| excerpt(&text, budget))
        .collect()
}

/// Every failed tool result in `content`, in stream order.
pub fn extract_errors(content: &str, budget: usize) -> Vec<String> {
    records(content)
        .flat_map(|record| record_errors(&record, budget))
        .collect()
}

/// Flatten an excerpt onto one protocol field: line breaks and the `|`
/// separator become spaces.
pub fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' | '|' => ' ',
            other => other,
        })
        .collect()
}
