//! Payload deserialization structs
//!
//! The wire record is a flat JSON object tagged by `event`. We read the tag
//! first so unknown kinds can be skipped without failing, then deserialize
//! the per-kind payload.

use serde::Deserialize;

/// Payload of `message` and `agent_message` events
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessagePayload {
    pub message_id: String,
    pub answer: String,
    /// Some servers send fractional seconds; both forms are accepted
    #[serde(default)]
    pub created_at: Option<serde_json::Number>,
}

impl MessagePayload {
    pub fn created_at_secs(&self) -> Option<i64> {
        let number = self.created_at.as_ref()?;
        number
            .as_i64()
            .or_else(|| number.as_f64().map(|secs| secs.trunc() as i64))
    }
}

/// Payload of `message_end` events
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessageEndPayload {
    /// Missing and `null` both read as an empty id
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

/// Payload of `error` events
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}
