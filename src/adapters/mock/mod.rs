//! Mock implementations for testing.
//!
//! These stand in for the network and the credentials store so the
//! streaming core can be exercised deterministically.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - Replays canned chunk sequences
//! - [`InMemoryCredentials`] - In-memory API key storage

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod credentials;
pub mod http;

pub use credentials::InMemoryCredentials;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};

/// Lock a mutex, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
