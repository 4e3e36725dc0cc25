//! In-memory credentials provider for testing.
//!
//! Stores the API key in memory and records how often it was invalidated,
//! so tests can check the session's reaction to a rejected key.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::lock;
use crate::traits::{CredentialsError, CredentialsProvider};

/// In-memory credentials provider for testing.
///
/// Clones share state.
///
/// # Example
///
/// ```ignore
/// use chatstream::adapters::mock::InMemoryCredentials;
/// use chatstream::traits::CredentialsProvider;
///
/// let provider = InMemoryCredentials::with_api_key("app-test");
/// assert_eq!(provider.load_api_key().await?.as_deref(), Some("app-test"));
///
/// provider.invalidate().await?;
/// assert!(provider.load_api_key().await?.is_none());
/// assert_eq!(provider.invalidate_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentials {
    api_key: Arc<Mutex<Option<String>>>,
    invalidations: Arc<Mutex<usize>>,
    load_should_fail: Arc<Mutex<bool>>,
    save_should_fail: Arc<Mutex<bool>>,
}

impl InMemoryCredentials {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding `api_key`.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let provider = Self::new();
        provider.set_api_key(Some(api_key.into()));
        provider
    }

    /// Configure whether load should fail.
    pub fn set_load_should_fail(&self, should_fail: bool) {
        *lock(&self.load_should_fail) = should_fail;
    }

    /// Configure whether save should fail.
    pub fn set_save_should_fail(&self, should_fail: bool) {
        *lock(&self.save_should_fail) = should_fail;
    }

    /// Get the current key synchronously.
    pub fn api_key(&self) -> Option<String> {
        lock(&self.api_key).clone()
    }

    /// Set the current key synchronously.
    pub fn set_api_key(&self, api_key: Option<String>) {
        *lock(&self.api_key) = api_key;
    }

    /// How many times `invalidate` was called.
    pub fn invalidate_count(&self) -> usize {
        *lock(&self.invalidations)
    }
}

#[async_trait]
impl CredentialsProvider for InMemoryCredentials {
    async fn load_api_key(&self) -> Result<Option<String>, CredentialsError> {
        if *lock(&self.load_should_fail) {
            return Err(CredentialsError::LoadFailed("Mock load failure".to_string()));
        }
        Ok(self.api_key())
    }

    async fn save_api_key(&self, api_key: &str) -> Result<(), CredentialsError> {
        if *lock(&self.save_should_fail) {
            return Err(CredentialsError::SaveFailed("Mock save failure".to_string()));
        }
        self.set_api_key(Some(api_key.to_string()));
        Ok(())
    }

    async fn invalidate(&self) -> Result<(), CredentialsError> {
        *lock(&self.invalidations) += 1;
        self.set_api_key(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_empty() {
        let provider = InMemoryCredentials::new();
        assert!(provider.load_api_key().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let provider = InMemoryCredentials::new();
        provider.save_api_key("app-1").await.unwrap();
        assert_eq!(provider.load_api_key().await.unwrap().as_deref(), Some("app-1"));
    }

    #[tokio::test]
    async fn test_invalidate_counts_and_clears() {
        let provider = InMemoryCredentials::with_api_key("app-1");
        provider.invalidate().await.unwrap();
        provider.invalidate().await.unwrap();

        assert!(provider.api_key().is_none());
        assert_eq!(provider.invalidate_count(), 2);
    }

    #[tokio::test]
    async fn test_failures() {
        let provider = InMemoryCredentials::new();
        provider.set_load_should_fail(true);
        provider.set_save_should_fail(true);

        assert!(matches!(
            provider.load_api_key().await,
            Err(CredentialsError::LoadFailed(_))
        ));
        assert!(matches!(
            provider.save_api_key("k").await,
            Err(CredentialsError::SaveFailed(_))
        ));
    }

    #[test]
    fn test_clones_share_state() {
        let provider = InMemoryCredentials::new();
        let cloned = provider.clone();

        provider.set_api_key(Some("shared".to_string()));
        assert_eq!(cloned.api_key().as_deref(), Some("shared"));
    }
}
