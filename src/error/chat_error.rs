//! Unified error type for chatstream.
//!
//! Collects the domain errors so callers that do not care which layer
//! failed can use one type with consistent categorization and messages.

use std::fmt;

use super::category::ErrorCategory;
use super::stream::StreamError;
use crate::client::ClientError;
use crate::session::SessionError;
use crate::traits::{CredentialsError, HttpError};

/// Unified error type.
#[derive(Debug)]
pub enum ChatError {
    /// Stream processing errors
    Stream(StreamError),

    /// Credentials could not be read or written
    Credentials(CredentialsError),

    /// The send could not start
    Session(SessionError),

    /// Invalid configuration or command line
    Config(String),

    /// Filesystem or terminal I/O
    Io(std::io::Error),
}

impl ChatError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::Stream(err) => err.category(),
            ChatError::Credentials(_) => ErrorCategory::System,
            ChatError::Session(SessionError::Client(ClientError::Stream(err))) => err.category(),
            ChatError::Session(SessionError::Client(ClientError::MissingApiKey)) => ErrorCategory::Auth,
            ChatError::Session(SessionError::Client(ClientError::Credentials(_))) => ErrorCategory::System,
            ChatError::Session(_) => ErrorCategory::Configuration,
            ChatError::Config(_) => ErrorCategory::Configuration,
            ChatError::Io(_) => ErrorCategory::System,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Stream(err) => err.user_message(),
            ChatError::Session(SessionError::Client(ClientError::Stream(err))) => err.user_message(),
            other => format!("{}. {}", other, other.category().recovery_hint()),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::Stream(err) => err.error_code(),
            ChatError::Session(SessionError::Client(ClientError::Stream(err))) => err.error_code(),
            ChatError::Session(SessionError::Busy) => "E_SESSION_BUSY",
            ChatError::Session(SessionError::EmptyQuery) => "E_SESSION_EMPTY_QUERY",
            ChatError::Session(SessionError::Client(ClientError::MissingApiKey)) => "E_MISSING_API_KEY",
            ChatError::Session(SessionError::Client(_)) | ChatError::Credentials(_) => "E_CREDENTIALS",
            ChatError::Config(_) => "E_CONFIG",
            ChatError::Io(_) => "E_IO",
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Stream(err) => write!(f, "{}", err),
            ChatError::Credentials(err) => write!(f, "{}", err),
            ChatError::Session(err) => write!(f, "{}", err),
            ChatError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ChatError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::Stream(err) => Some(err),
            ChatError::Credentials(err) => Some(err),
            ChatError::Session(err) => Some(err),
            ChatError::Config(_) => None,
            ChatError::Io(err) => Some(err),
        }
    }
}

impl From<StreamError> for ChatError {
    fn from(err: StreamError) -> Self {
        ChatError::Stream(err)
    }
}

impl From<HttpError> for ChatError {
    fn from(err: HttpError) -> Self {
        ChatError::Stream(StreamError::from_http(&err))
    }
}

impl From<CredentialsError> for ChatError {
    fn from(err: CredentialsError) -> Self {
        ChatError::Credentials(err)
    }
}

impl From<SessionError> for ChatError {
    fn from(err: SessionError) -> Self {
        ChatError::Session(err)
    }
}

impl From<ClientError> for ChatError {
    fn from(err: ClientError) -> Self {
        ChatError::Session(SessionError::Client(err))
    }
}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        ChatError::Io(err)
    }
}

/// Type alias for Results using ChatError.
pub type ChatResult<T> = Result<T, ChatError>;
