//! Event records decoded from a subagent's append-only log.
//!
//! Each line of a task log is one JSON object. Only the fields the supervisor
//! and inspector look at are modelled; everything else is ignored so newer
//! worker runtimes can add fields freely.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One decoded line of a task log.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventRecord {
    /// Event type.
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Stop reason reported at the top level by some runtimes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,

    /// Message payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<EventMessage>,
}

impl EventRecord {
    /// Content blocks of the message, empty when the message is plain text
    /// or absent.
    pub fn blocks(&self) -> &[ContentBlock] {
        match &self.message {
            Some(EventMessage {
                content: MessageContent::Blocks(blocks),
                ..
            }) => blocks,
            _ => &[],
        }
    }
}

/// Event type of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Output produced by the model.
    Assistant,
    /// User turn; carries tool results.
    User,
    /// Runtime/system notification.
    System,
    /// Final execution result.
    Result,
    /// Any other event type (ignored).
    #[serde(other)]
    Other,
}

/// Message carried by an event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EventMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

/// Message content: either plain text or an ordered list of blocks.
///
/// Blocks are decoded one by one: a block that does not fit its declared
/// type becomes [`ContentBlock::Other`] instead of failing the whole list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => Self::Text(text),
            Value::Array(values) => {
                Self::Blocks(values.into_iter().map(ContentBlock::from_value).collect())
            }
            _ => Self::default(),
        })
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Blocks(Vec::new())
    }
}

/// Content block in a message.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text output.
    Text { text: String },

    /// Tool invocation.
    ToolUse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        #[serde(default)]
        input: Map<String, Value>,
    },

    /// Outcome of a tool invocation.
    ToolResult {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_use_id: Option<String>,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: Option<bool>,
    },

    /// Thinking, images and other block types.
    #[serde(other)]
    Other,
}

impl ContentBlock {
    /// Decode one block, falling back to [`ContentBlock::Other`] when the
    /// value does not match its declared type.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or(Self::Other)
    }

    /// Returns true for a tool result flagged `is_error: true`.
    pub fn is_failed_tool_result(&self) -> bool {
        matches!(
            self,
            Self::ToolResult {
                is_error: Some(true),
                ..
            }
        )
    }

    /// Flattened text of a tool result.
    ///
    /// String content is returned as is; a list of `{"type":"text"}` parts is
    /// joined with newlines; any other JSON is rendered compactly. Returns
    /// `None` for non tool-result blocks.
    pub fn result_text(&self) -> Option<String> {
        let Self::ToolResult { content, .. } = self else {
            return None;
        };
        let text = match content {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Array(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(obj) => obj
                        .get("text")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        };
        Some(text)
    }
}
