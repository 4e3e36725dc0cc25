//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - POST a request and stream the response body
//! - [`CredentialsProvider`] - API key storage and retrieval

pub mod credentials;
pub mod http;

pub use credentials::{CredentialsError, CredentialsProvider};
pub use http::{ByteStream, Headers, HttpClient, HttpError};
