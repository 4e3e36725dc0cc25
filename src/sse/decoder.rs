//! Event decoding for `data: ` lines.
//!
//! A line is significant only when it starts with the exact prefix `data: `.
//! Everything else (blank keep-alives, `event:` lines, comments) is ignored.
//! A malformed payload never terminates the stream: the lenient entry point
//! [`decode`] logs and drops it, while [`decode_line`] reports why.

use crate::sse::events::{SseLine, SseParseError, StreamEvent};
use crate::sse::payloads::{ErrorPayload, MessageEndPayload, MessagePayload};
use crate::sse::reader::LineReader;

/// The only prefix that marks a significant line.
pub const DATA_PREFIX: &str = "data: ";

/// Classify a single line.
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    match line.strip_prefix(DATA_PREFIX) {
        Some(rest) => SseLine::Data(rest.to_string()),
        None => SseLine::Ignored(line.to_string()),
    }
}

/// Parse the JSON remainder of a data line into a typed event.
///
/// Returns `Ok(None)` for well-formed records whose kind we do not handle.
pub fn parse_event_data(data: &str) -> Result<Option<StreamEvent>, SseParseError> {
    let value: serde_json::Value =
        serde_json::from_str(data).map_err(|e| SseParseError::InvalidJson {
            source: e.to_string(),
        })?;

    let Some(kind) = value.get("event").and_then(|v| v.as_str()) else {
        return Err(SseParseError::MissingEventKind);
    };
    let kind = kind.to_string();

    match kind.as_str() {
        "message" | "agent_message" => {
            let payload: MessagePayload = from_payload(&kind, value)?;
            let created_at = payload.created_at_secs();
            Ok(Some(StreamEvent::Message {
                message_id: payload.message_id,
                delta: payload.answer,
                created_at,
            }))
        }
        "message_end" => {
            let payload: MessageEndPayload = from_payload(&kind, value)?;
            Ok(Some(StreamEvent::MessageEnd {
                conversation_id: payload.conversation_id.unwrap_or_default(),
                message_id: payload.message_id,
            }))
        }
        "error" => {
            let payload: ErrorPayload = from_payload(&kind, value)?;
            Ok(Some(StreamEvent::Error {
                message: payload
                    .message
                    .unwrap_or_else(|| "Unknown server error".to_string()),
                code: payload.code,
                status: payload.status,
            }))
        }
        // Forward-compatible with server extensions (ping, workflow_*, tts_*, ...)
        other => {
            tracing::debug!(event_type = other, "Ignoring unhandled stream event kind");
            Ok(None)
        }
    }
}

fn from_payload<T: serde::de::DeserializeOwned>(
    kind: &str,
    value: serde_json::Value,
) -> Result<T, SseParseError> {
    serde_json::from_value(value).map_err(|e| SseParseError::InvalidPayload {
        event_type: kind.to_string(),
        source: e.to_string(),
    })
}

/// Decode a logical line, reporting why a data line was rejected.
///
/// Returns:
/// - `Ok(Some(event))` - a recognized event
/// - `Ok(None)` - the line is not a data line, or its kind is not handled
/// - `Err(error)` - a data line whose payload could not be decoded
pub fn decode_line(line: &str) -> Result<Option<StreamEvent>, SseParseError> {
    match parse_sse_line(line) {
        SseLine::Data(data) => parse_event_data(&data),
        SseLine::Empty | SseLine::Ignored(_) => Ok(None),
    }
}

/// Decode a logical line, logging and dropping malformed payloads.
pub fn decode(line: &str) -> Option<StreamEvent> {
    match decode_line(line) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed stream line");
            None
        }
    }
}

/// Stateful decoder combining line reassembly and event decoding.
///
/// Each call to [`feed`](Self::feed) processes one chunk completely and returns
/// the outcome of every data line it completed, in order.
#[derive(Debug, Default)]
pub struct SseDecoder {
    reader: LineReader,
}

impl SseDecoder {
    /// Create a decoder for a freshly opened stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<StreamEvent, SseParseError>> {
        self.reader
            .feed(chunk)
            .iter()
            .filter_map(|line| decode_line(line).transpose())
            .collect()
    }

    /// Flush the final unterminated line at end of stream.
    pub fn finish(&mut self) -> Option<Result<StreamEvent, SseParseError>> {
        let line = self.reader.finish()?;
        decode_line(&line).transpose()
    }

    /// Stop decoding after a transport failure.
    pub fn abort(&mut self) {
        self.reader.abort();
    }

    /// Reset for a new stream.
    pub fn reset(&mut self) {
        self.reader = LineReader::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_line() {
        assert_eq!(parse_sse_line(""), SseLine::Empty);
    }

    #[test]
    fn test_parse_data_line() {
        assert_eq!(
            parse_sse_line(r#"data: {"event":"ping"}"#),
            SseLine::Data(r#"{"event":"ping"}"#.to_string())
        );
    }

    #[test]
    fn test_data_prefix_must_be_exact() {
        assert!(matches!(parse_sse_line(r#"data:{"event":"message"}"#), SseLine::Ignored(_)));
        assert!(matches!(parse_sse_line(r#" data: {}"#), SseLine::Ignored(_)));
        assert!(matches!(parse_sse_line("event: message"), SseLine::Ignored(_)));
        assert!(matches!(parse_sse_line(": keep-alive"), SseLine::Ignored(_)));
    }

    #[test]
    fn test_decode_message() {
        let event = decode(
            r#"data: {"event":"message","message_id":"m1","answer":"Hel","created_at":1705395332}"#,
        );
        assert_eq!(event, Some(StreamEvent::message("m1", "Hel", Some(1705395332))));
    }

    #[test]
    fn test_decode_message_with_extra_fields() {
        let event = decode(
            r#"data: {"event":"message","task_id":"t","id":"x","message_id":"m1","conversation_id":"c1","answer":"lo","created_at":1}"#,
        );
        assert_eq!(event, Some(StreamEvent::message("m1", "lo", Some(1))));
    }

    #[test]
    fn test_decode_fractional_created_at() {
        let event = decode(r#"data: {"event":"message","message_id":"m1","answer":"a","created_at":12.75}"#);
        assert_eq!(event, Some(StreamEvent::message("m1", "a", Some(12))));
    }

    #[test]
    fn test_decode_agent_message_as_message() {
        let event = decode(r#"data: {"event":"agent_message","message_id":"m2","answer":"x"}"#);
        assert_eq!(event, Some(StreamEvent::message("m2", "x", None)));
    }

    #[test]
    fn test_decode_message_end() {
        let event = decode(r#"data: {"event":"message_end","conversation_id":"c1","metadata":{}}"#);
        assert_eq!(event, Some(StreamEvent::message_end("c1")));
    }

    #[test]
    fn test_decode_message_end_with_null_conversation_id() {
        let event = decode(r#"data: {"event":"message_end","conversation_id":null}"#);
        assert_eq!(event, Some(StreamEvent::message_end("")));
    }

    #[test]
    fn test_decode_message_end_keeps_message_id() {
        let event = decode(r#"data: {"event":"message_end","conversation_id":"c1","message_id":"m1"}"#);
        assert_eq!(
            event,
            Some(StreamEvent::MessageEnd {
                conversation_id: "c1".to_string(),
                message_id: Some("m1".to_string()),
            })
        );
    }

    #[test]
    fn test_decode_error_event() {
        let event = decode(
            r#"data: {"event":"error","status":400,"code":"invalid_param","message":"bad query"}"#,
        );
        assert_eq!(
            event,
            Some(StreamEvent::Error {
                message: "bad query".to_string(),
                code: Some("invalid_param".to_string()),
                status: Some(400),
            })
        );
    }

    #[test]
    fn test_unknown_kind_is_ignored() {
        assert_eq!(decode_line(r#"data: {"event":"ping"}"#), Ok(None));
        assert_eq!(decode_line(r#"data: {"event":"workflow_started","data":{}}"#), Ok(None));
    }

    #[test]
    fn test_invalid_json_is_reported_and_dropped() {
        assert!(matches!(
            decode_line("data: {not json"),
            Err(SseParseError::InvalidJson { .. })
        ));
        assert_eq!(decode("data: {not json"), None);
    }

    #[test]
    fn test_missing_event_kind() {
        assert_eq!(decode_line(r#"data: {"answer":"x"}"#), Err(SseParseError::MissingEventKind));
        assert_eq!(decode_line(r#"data: [1,2]"#), Err(SseParseError::MissingEventKind));
    }

    #[test]
    fn test_message_missing_answer_is_invalid_payload() {
        let result = decode_line(r#"data: {"event":"message","message_id":"m1"}"#);
        assert!(matches!(
            result,
            Err(SseParseError::InvalidPayload { ref event_type, .. }) if event_type == "message"
        ));
    }

    #[test]
    fn test_trailing_carriage_return_tolerated() {
        let event = decode("data: {\"event\":\"message_end\",\"conversation_id\":\"c1\"}\r");
        assert_eq!(event, Some(StreamEvent::message_end("c1")));
    }

    #[test]
    fn test_non_data_lines_yield_nothing() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("event: message"), None);
        assert_eq!(decode(": comment"), None);
    }

    #[test]
    fn test_sse_decoder_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(br#"data: {"event":"mess"#).is_empty());
        let events = decoder.feed(
            b"age\",\"message_id\":\"m1\",\"answer\":\"Hi\",\"created_at\":1}\n\ndata: {bad\n",
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Ok(StreamEvent::message("m1", "Hi", Some(1))));
        assert!(events[1].is_err());
    }

    #[test]
    fn test_sse_decoder_finish_parses_unterminated_record() {
        let mut decoder = SseDecoder::new();
        assert!(decoder
            .feed(br#"data: {"event":"message_end","conversation_id":"c9"}"#)
            .is_empty());
        assert_eq!(decoder.finish(), Some(Ok(StreamEvent::message_end("c9"))));
    }

    #[test]
    fn test_sse_decoder_reset() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: {\"event\":");
        decoder.reset();
        assert_eq!(decoder.finish(), None);
    }
}
