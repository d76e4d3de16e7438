//! Terminal-state detection for task logs.
//!
//! Worker runtimes signal completion in one of two ways: an assistant message
//! whose `stop_reason` is `end_turn`, or a final event of type `result`. The
//! two come from different event-schema versions; either one is enough and
//! neither takes precedence.

use serde::Serialize;
use serde_json::Value;

/// Which marker made a log terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalMarker {
    /// `stop_reason == "end_turn"` (top level or inside `message`).
    EndTurn,
    /// `type == "result"`.
    ResultEvent,
}

impl std::fmt::Display for TerminalMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndTurn => write!(f, "end_turn"),
            Self::ResultEvent => write!(f, "result"),
        }
    }
}

/// Marker carried by a single line, if any.
fn line_marker(line: &str) -> Option<TerminalMarker> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(trimmed) else {
        return None;
    };

    if obj.get("type").and_then(Value::as_str) == Some("result") {
        return Some(TerminalMarker::ResultEvent);
    }

    let end_turn = |v: Option<&Value>| v.and_then(Value::as_str) == Some("end_turn");
    let nested = obj.get("message").and_then(|m| m.get("stop_reason"));
    if end_turn(obj.get("stop_reason")) || end_turn(nested) {
        return Some(TerminalMarker::EndTurn);
    }

    None
}

/// First terminal marker found in `content`, in stream order.
pub fn find_terminal_marker(content: &str) -> Option<TerminalMarker> {
    content.lines().find_map(line_marker)
}

/// Returns true if any line of `content` carries a terminal marker.
///
/// The verdict is monotonic: appending lines to a terminal log keeps it
/// terminal.
pub fn is_terminal(content: &str) -> bool {
    find_terminal_marker(content).is_some()
}
