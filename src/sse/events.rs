//! Stream event types and definitions
//!
//! Contains the StreamEvent enum with the event kinds the chat-messages
//! streaming API emits that the transcript cares about.

use serde::{Deserialize, Serialize};

/// Typed events decoded from `data: ` lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental fragment of the assistant answer
    Message {
        /// Stable across every delta of one assistant turn
        message_id: String,
        /// Text to append (wire field `answer`)
        #[serde(rename = "answer")]
        delta: String,
        /// Epoch seconds, when provided
        #[serde(default, skip_serializing_if = "Option::is_none")]
        created_at: Option<i64>,
    },
    /// The assistant turn is complete
    MessageEnd {
        /// Conversation id assigned by the remote side
        conversation_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },
    /// Server-reported failure inside the stream
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
    },
}

impl StreamEvent {
    /// Returns the event kind as it appears on the wire.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            StreamEvent::Message { .. } => "message",
            StreamEvent::MessageEnd { .. } => "message_end",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// Convenience constructor used heavily in tests and fixtures.
    pub fn message(
        message_id: impl Into<String>,
        delta: impl Into<String>,
        created_at: Option<i64>,
    ) -> Self {
        StreamEvent::Message {
            message_id: message_id.into(),
            delta: delta.into(),
            created_at,
        }
    }

    /// Convenience constructor for a MessageEnd event.
    pub fn message_end(conversation_id: impl Into<String>) -> Self {
        StreamEvent::MessageEnd {
            conversation_id: conversation_id.into(),
            message_id: None,
        }
    }
}

/// Represents a classified stream line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// `data: ` payload with the prefix stripped
    Data(String),
    /// Empty keep-alive or record separator
    Empty,
    /// Anything else (`event:` lines, comments, `data:` without the space)
    Ignored(String),
}

/// Errors that can occur while decoding a data line
#[derive(Debug, Clone, PartialEq)]
pub enum SseParseError {
    /// The payload is not valid JSON
    InvalidJson { source: String },
    /// The payload is a JSON value without a string `event` field
    MissingEventKind,
    /// The kind is recognized but the payload fields do not match it
    InvalidPayload { event_type: String, source: String },
}

impl SseParseError {
    /// The event kind involved, when one was identified.
    pub fn event_type(&self) -> Option<&str> {
        match self {
            SseParseError::InvalidPayload { event_type, .. } => Some(event_type),
            _ => None,
        }
    }
}

impl std::fmt::Display for SseParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SseParseError::InvalidJson { source } => write!(f, "Invalid JSON in data line: {}", source),
            SseParseError::MissingEventKind => write!(f, "Data line has no event kind"),
            SseParseError::InvalidPayload { event_type, source } => {
                write!(f, "Invalid payload for event '{}': {}", event_type, source)
            }
        }
    }
}

impl std::error::Error for SseParseError {}
