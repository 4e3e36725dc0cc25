//! Error category classification.
//!
//! Groups errors by how a caller should react to them: retry the send,
//! prompt for new credentials, or just tell the user.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout or dropped stream.
    /// Transient; the user may send again.
    Network,

    /// The server rejected the API key.
    /// Requires new credentials before sending again.
    Auth,

    /// The server reported an error (HTTP 5xx or an `error` event).
    Server,

    /// A payload could not be understood. Recovered locally.
    Protocol,

    /// Missing or invalid local configuration (no API key, bad URL).
    Configuration,

    /// Filesystem and other OS errors.
    System,
}

impl ErrorCategory {
    /// Returns true if sending again may succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::System => "system",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check your internet connection and send the message again",
            ErrorCategory::Auth => "Set a valid API key with --set-key",
            ErrorCategory::Server => "The server may be experiencing issues. Please try again later",
            ErrorCategory::Protocol => "Some server output could not be read and was skipped",
            ErrorCategory::Configuration => "Check CHATSTREAM_* environment variables and flags",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
