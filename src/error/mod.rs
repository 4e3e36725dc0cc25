//! Error taxonomy for streaming chat.
//!
//! - **Error Categories**: how a caller should react (retry, re-authenticate, ignore)
//! - **Stream Errors**: the notifications observers receive while a response streams
//!
//! | Variant | Ends stream | Category |
//! |---------|-------------|----------|
//! | Transport | Yes | Network / Server |
//! | Auth | Yes | Auth |
//! | Backend | Yes | Server |
//! | Decode | No (line skipped) | Protocol |
//! | PrematureEnd | Already ended (soft warning) | Network |
//!
//! Errors raised before a stream opens live next to the code that raises
//! them: [`crate::client::ClientError`] and [`crate::session::SessionError`].
//! [`ChatError`] wraps all of them for callers that want a single type.

mod category;
mod chat_error;
mod stream;

pub use category::ErrorCategory;
pub use chat_error::{ChatError, ChatResult};
pub use stream::{is_auth_rejection, StreamError};
