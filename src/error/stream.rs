//! Streaming-related error types.
//!
//! These are the error notifications observers receive while a response is
//! streaming. Only transport-level variants end the stream; a malformed line
//! is reported and skipped.

use std::fmt;

use super::category::ErrorCategory;
use crate::sse::SseParseError;
use crate::traits::HttpError;

/// Markers in a failure message that identify a rejected credential.
const AUTH_REJECTION_MARKERS: &[&str] = &[
    "unauthorized",
    "invalid api key",
    "invalid_api_key",
    "access token is invalid",
    "authentication failed",
];

/// Returns true when a failure signal carries an authentication rejection.
pub fn is_auth_rejection(status: Option<u16>, message: &str) -> bool {
    if status == Some(401) {
        return true;
    }
    let lower = message.to_lowercase();
    AUTH_REJECTION_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Stream error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Reading the stream failed or the connection dropped.
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// The server rejected the credentials (HTTP 401 class).
    Auth {
        status: Option<u16>,
        message: String,
    },

    /// A data line could not be decoded. The line was skipped.
    Decode {
        event_type: Option<String>,
        message: String,
    },

    /// The stream ended before any MessageEnd was seen.
    PrematureEnd {
        /// Whether an assistant entry with partial content was kept.
        partial_content: bool,
    },

    /// The server reported an error event inside the stream.
    Backend {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },
}

impl StreamError {
    /// Classify a transport failure, separating authentication rejections.
    pub fn from_http(err: &HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } if is_auth_rejection(Some(*status), message) => {
                StreamError::Auth {
                    status: Some(*status),
                    message: message.clone(),
                }
            }
            HttpError::ServerError { status, message } => StreamError::Transport {
                message: message.clone(),
                status: Some(*status),
            },
            other => StreamError::Transport {
                message: other.to_string(),
                status: None,
            },
        }
    }

    /// Build from an `error` event, separating authentication rejections.
    pub fn from_event(message: &str, code: Option<&str>, status: Option<u16>) -> Self {
        let marker = format!("{} {}", code.unwrap_or_default(), message);
        if is_auth_rejection(status, &marker) {
            StreamError::Auth {
                status,
                message: message.to_string(),
            }
        } else {
            StreamError::Backend {
                status,
                code: code.map(str::to_string),
                message: message.to_string(),
            }
        }
    }

    /// Whether this error ends the in-flight stream.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            StreamError::Decode { .. } | StreamError::PrematureEnd { .. }
        )
    }

    /// Whether stored credentials should be invalidated.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, StreamError::Auth { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::Transport { status: Some(s), .. } if *s >= 500 => ErrorCategory::Server,
            StreamError::Transport { .. } | StreamError::PrematureEnd { .. } => ErrorCategory::Network,
            StreamError::Auth { .. } => ErrorCategory::Auth,
            StreamError::Decode { .. } => ErrorCategory::Protocol,
            StreamError::Backend { .. } => ErrorCategory::Server,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Transport { status: Some(s), .. } => {
                format!("The server answered with HTTP {}. Please try again.", s)
            }
            StreamError::Transport { .. } => {
                "Connection to the chat server was lost.".to_string()
            }
            StreamError::Auth { .. } => {
                "The API key was rejected. Please set a new one.".to_string()
            }
            StreamError::Decode { .. } => {
                "Some of the server response could not be read and was skipped.".to_string()
            }
            StreamError::PrematureEnd { partial_content: true } => {
                "The response ended early; the partial answer was kept.".to_string()
            }
            StreamError::PrematureEnd { partial_content: false } => {
                "The response ended before any answer arrived.".to_string()
            }
            StreamError::Backend { message, .. } => format!("Server error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Transport { .. } => "E_STREAM_TRANSPORT",
            StreamError::Auth { .. } => "E_STREAM_AUTH",
            StreamError::Decode { .. } => "E_STREAM_DECODE",
            StreamError::PrematureEnd { .. } => "E_STREAM_PREMATURE_END",
            StreamError::Backend { .. } => "E_STREAM_BACKEND",
        }
    }
}

impl From<SseParseError> for StreamError {
    fn from(err: SseParseError) -> Self {
        StreamError::Decode {
            event_type: err.event_type().map(str::to_string),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Transport { message, status } => match status {
                Some(s) => write!(f, "Transport error (HTTP {}): {}", s, message),
                None => write!(f, "Transport error: {}", message),
            },
            StreamError::Auth { status, message } => match status {
                Some(s) => write!(f, "Authentication rejected (HTTP {}): {}", s, message),
                None => write!(f, "Authentication rejected: {}", message),
            },
            StreamError::Decode { event_type, message } => match event_type {
                Some(t) => write!(f, "Failed to decode {} event: {}", t, message),
                None => write!(f, "Failed to decode stream line: {}", message),
            },
            StreamError::PrematureEnd { .. } => write!(f, "Stream ended without message_end"),
            StreamError::Backend { code, message, .. } => match code {
                Some(c) => write!(f, "Backend error [{}]: {}", c, message),
                None => write!(f, "Backend error: {}", message),
            },
        }
    }
}

impl std::error::Error for StreamError {}
