//! API key storage.

pub mod credentials;

pub use credentials::{Credentials, CredentialsManager};
