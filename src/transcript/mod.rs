//! Transcript accumulation.
//!
//! Folds decoded stream events into an append-only conversation transcript.
//! The state machine for one assistant turn is
//! `idle -> (Message) -> open -> (Message)* -> (MessageEnd) -> idle`, and the
//! same state is reused for every turn of a conversation.

mod entry;
mod state;

pub use entry::{Role, TranscriptEntry};
pub use state::{apply, Completion, ConversationState};
