//! Conversation state and the transition function that folds stream events
//! into it.

use serde::{Deserialize, Serialize};

use super::entry::{Role, TranscriptEntry};
use crate::sse::StreamEvent;

/// What a transition means for the in-flight turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The turn is still receiving deltas (or nothing changed).
    Pending,
    /// A MessageEnd closed the turn.
    TurnComplete,
    /// The server reported an error; the turn is closed.
    Failed,
}

/// Ordered transcript plus the conversation id and streaming flag.
///
/// Only the last entry may be open, and only while `is_streaming` is set and
/// its role is assistant. Every other entry is final.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    entries: Vec<TranscriptEntry>,
    conversation_id: String,
    is_streaming: bool,
}

impl ConversationState {
    /// Idle state with no entries and no conversation id.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Empty until the first MessageEnd assigns one.
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry still accepting deltas, if any.
    pub fn open_entry(&self) -> Option<&TranscriptEntry> {
        if !self.is_streaming {
            return None;
        }
        self.entries.last().filter(|e| e.role == Role::Assistant)
    }

    fn open_entry_mut(&mut self) -> Option<&mut TranscriptEntry> {
        if !self.is_streaming {
            return None;
        }
        self.entries.last_mut().filter(|e| e.role == Role::Assistant)
    }

    /// Apply one event in place.
    ///
    /// Continuation is decided by position only: a Message extends the last
    /// entry when it is an open assistant entry, whatever its `message_id`.
    pub fn apply_event(&mut self, event: &StreamEvent) -> Completion {
        match event {
            StreamEvent::Message {
                message_id,
                delta,
                created_at,
            } => {
                if let Some(open) = self.open_entry_mut() {
                    open.content.push_str(delta);
                } else {
                    tracing::debug!(message_id = %message_id, "Starting assistant entry");
                    self.entries
                        .push(TranscriptEntry::assistant(message_id.clone(), delta.clone(), *created_at));
                    self.is_streaming = true;
                }
                Completion::Pending
            }
            StreamEvent::MessageEnd {
                conversation_id, ..
            } => {
                self.is_streaming = false;
                self.conversation_id = conversation_id.clone();
                Completion::TurnComplete
            }
            StreamEvent::Error { .. } => {
                self.is_streaming = false;
                Completion::Failed
            }
        }
    }

    /// Append a user turn. Any open assistant entry is closed first so the
    /// next Message starts a new entry.
    pub fn push_user(&mut self, content: impl Into<String>) -> &TranscriptEntry {
        self.is_streaming = false;
        self.entries.push(TranscriptEntry::user(content));
        &self.entries[self.entries.len() - 1]
    }

    /// Force the stream closed without touching entries.
    ///
    /// Used on transport failure, premature end and cancellation; partial
    /// content stays in place.
    pub fn close(&mut self) {
        self.is_streaming = false;
    }
}

/// Pure transition: consume the current state and one event, return the next
/// state and what it means for the turn.
pub fn apply(mut state: ConversationState, event: &StreamEvent) -> (ConversationState, Completion) {
    let completion = state.apply_event(event);
    (state, completion)
}
