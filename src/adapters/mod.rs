//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`EnvCredentialsProvider`] - API key from an environment variable
//! - [`FileCredentialsProvider`] - API key in `~/.chatstream/credentials.json`
//! - [`ChainedCredentials`] - Several providers consulted in order
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Canned chunk sequences
//! - [`mock::InMemoryCredentials`] - In-memory key storage

pub mod chained_credentials;
pub mod env_credentials;
pub mod file_credentials;
pub mod mock;
pub mod reqwest_http;

pub use chained_credentials::ChainedCredentials;
pub use env_credentials::{EnvCredentialsProvider, DEFAULT_API_KEY_ENV};
pub use file_credentials::FileCredentialsProvider;
pub use mock::{InMemoryCredentials, MockHttpClient, MockResponse};
pub use reqwest_http::ReqwestHttpClient;
