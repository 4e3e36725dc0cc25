//! Terminal rendering of session updates.
//!
//! Snapshots carry the whole transcript; the printer writes only the text
//! that is new since the previous snapshot so the answer appears as it
//! streams.

use std::io::{self, Write};

use crate::session::SessionUpdate;
use crate::transcript::ConversationState;

/// Writes assistant text incrementally to `out` and errors to `err`.
pub struct TranscriptPrinter<W, E> {
    out: W,
    err: E,
    /// Index of the entry being printed
    current: Option<usize>,
    /// Bytes of that entry already written
    printed: usize,
    /// Whether the cursor sits after unterminated assistant text
    line_open: bool,
}

impl TranscriptPrinter<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<W: Write, E: Write> TranscriptPrinter<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self {
            out,
            err,
            current: None,
            printed: 0,
            line_open: false,
        }
    }

    pub fn handle(&mut self, update: &SessionUpdate) -> io::Result<()> {
        match update {
            SessionUpdate::Transcript(state) => self.render(state),
            SessionUpdate::Error(e) => {
                self.end_line()?;
                if e.is_fatal() {
                    writeln!(self.err, "error: {}", e.user_message())?;
                    writeln!(self.err, "hint: {}", e.category().recovery_hint())?;
                } else {
                    writeln!(self.err, "warning: {}", e.user_message())?;
                }
                self.err.flush()
            }
        }
    }

    fn render(&mut self, state: &ConversationState) -> io::Result<()> {
        let Some(index) = state.len().checked_sub(1) else {
            self.current = None;
            return Ok(());
        };
        let entry = &state.entries()[index];

        if entry.is_assistant() {
            if self.current != Some(index) {
                self.end_line()?;
                self.current = Some(index);
                self.printed = 0;
            }
            if let Some(delta) = entry.content.get(self.printed..) {
                if !delta.is_empty() {
                    self.out.write_all(delta.as_bytes())?;
                    self.printed = entry.content.len();
                    self.line_open = true;
                }
            }
        }

        if !state.is_streaming() {
            self.end_line()?;
        }
        self.out.flush()
    }

    fn end_line(&mut self) -> io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        Ok(())
    }

    /// Consume the printer, returning the writers.
    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}
