//! Stream parsing for the chat-messages event protocol
//!
//! The server answers with newline-delimited records shaped like SSE:
//! - `data: <json>` - a record tagged by its `event` field
//! - Empty lines - keep-alives and record separators (ignored)
//! - Anything else - ignored
//!
//! # Module structure
//! - `reader` - Byte chunk to logical line reassembly (LineReader, Utf8StreamDecoder)
//! - `events` - Event type definitions (StreamEvent, SseLine, SseParseError)
//! - `payloads` - Internal payload deserialization structs
//! - `decoder` - Line to event decoding (decode, decode_line, SseDecoder)

mod decoder;
mod events;
mod payloads;
mod reader;

// Re-export public types
pub use decoder::{decode, decode_line, parse_event_data, parse_sse_line, SseDecoder, DATA_PREFIX};
pub use events::{SseLine, SseParseError, StreamEvent};
pub use reader::{LineReader, Utf8StreamDecoder};
