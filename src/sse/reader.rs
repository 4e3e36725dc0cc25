//! Incremental line reassembly for chunked byte streams.
//!
//! The transport hands us bytes in arbitrary slices. A logical line, or a
//! single multi-byte character, can be split across any number of reads, so
//! the reader keeps two pieces of state between calls:
//!
//! - a [`Utf8StreamDecoder`] holding the trailing bytes of an incomplete
//!   UTF-8 sequence
//! - the decode buffer: text after the last line break seen so far
//!
//! Feeding the same byte stream in any partition yields the same lines as
//! decoding and splitting the whole stream at once.

use std::borrow::Cow;

/// Stateful UTF-8 decoder that tolerates sequences split across chunks.
///
/// Bytes that are merely incomplete at the end of a chunk are held back until
/// the next call. Bytes that can never form valid UTF-8 are replaced with
/// U+FFFD, one replacement per maximal invalid subpart.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    /// Create a decoder with no pending bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, prefixed by whatever was held back from the last call.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let bytes: Cow<'_, [u8]> = if self.pending.is_empty() {
            Cow::Borrowed(chunk)
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(chunk);
            Cow::Owned(joined)
        };

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    // The prefix up to valid_up_to() is valid by definition
                    out.push_str(&String::from_utf8_lossy(valid));

                    match err.error_len() {
                        Some(invalid_len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[invalid_len..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush any held-back bytes at end of stream.
    ///
    /// An incomplete trailing sequence can no longer be completed, so it is
    /// decoded lossily.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }

    /// Number of bytes currently held back.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Reassembles complete logical lines from a chunked byte stream.
///
/// # Example
///
/// ```
/// use chatstream::sse::LineReader;
///
/// let mut reader = LineReader::new();
/// assert!(reader.feed(b"data: {\"a\"").is_empty());
/// assert_eq!(reader.feed(b":1}\nda"), vec!["data: {\"a\":1}".to_string()]);
/// assert_eq!(reader.finish(), Some("da".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct LineReader {
    decoder: Utf8StreamDecoder,
    buffer: String,
    aborted: bool,
}

impl LineReader {
    /// Create a reader for a freshly opened stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completes, in order.
    ///
    /// Line terminators are removed. The fragment after the last `\n` stays
    /// buffered until a later chunk completes it or [`finish`](Self::finish)
    /// flushes it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.aborted {
            return Vec::new();
        }

        let text = self.decoder.decode(chunk);
        self.buffer.push_str(&text);

        let Some(last_break) = self.buffer.rfind('\n') else {
            return Vec::new();
        };

        let tail = self.buffer.split_off(last_break + 1);
        let complete = std::mem::replace(&mut self.buffer, tail);

        complete[..last_break]
            .split('\n')
            .map(str::to_owned)
            .collect()
    }

    /// Signal end of stream and return the final unterminated fragment.
    ///
    /// Returns `None` when the fragment is empty. Must be called at most once
    /// per stream; later calls return `None`.
    pub fn finish(&mut self) -> Option<String> {
        if self.aborted {
            return None;
        }

        let flushed = self.decoder.finish();
        self.buffer.push_str(&flushed);
        self.aborted = true;

        let fragment = std::mem::take(&mut self.buffer);
        if fragment.is_empty() {
            None
        } else {
            Some(fragment)
        }
    }

    /// Discard all buffered state after a transport failure.
    ///
    /// No further lines are emitted by this reader.
    pub fn abort(&mut self) {
        self.aborted = true;
        self.buffer.clear();
        self.decoder = Utf8StreamDecoder::new();
    }

    /// Whether the reader has been finished or aborted.
    pub fn is_closed(&self) -> bool {
        self.aborted
    }

    /// Text buffered after the last line break.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }
}
