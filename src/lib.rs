//! chatstream - streaming chat client for `data:`-framed event streams.
//!
//! Bytes from the network pass through three stages, one chunk at a time:
//!
//! 1. [`sse::LineReader`] reassembles UTF-8 text and splits it into lines,
//!    independent of where the chunk boundaries fall.
//! 2. [`sse::decode_line`] turns `data: ` lines into [`sse::StreamEvent`]s.
//! 3. [`transcript::apply`] folds each event into a
//!    [`transcript::ConversationState`].
//!
//! [`session::ChatSession`] wires these to the HTTP client and the
//! credentials store.

pub mod adapters;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod sse;
pub mod traits;
pub mod transcript;
