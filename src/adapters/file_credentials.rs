//! File-based credentials provider adapter.
//!
//! Wraps [`CredentialsManager`] so the key saved with `--set-key` survives
//! between runs.

use async_trait::async_trait;

use crate::auth::credentials::{Credentials, CredentialsManager};
use crate::traits::{CredentialsError, CredentialsProvider};

/// File-based credentials provider.
///
/// Credentials are stored in `~/.chatstream/credentials.json`.
///
/// # Example
///
/// ```ignore
/// use chatstream::adapters::FileCredentialsProvider;
/// use chatstream::traits::CredentialsProvider;
///
/// let provider = FileCredentialsProvider::new()?;
/// provider.save_api_key("app-xxxx").await?;
/// assert_eq!(provider.load_api_key().await?.as_deref(), Some("app-xxxx"));
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialsProvider {
    manager: CredentialsManager,
}

impl FileCredentialsProvider {
    /// Create a provider backed by the home-directory credentials file.
    pub fn new() -> Result<Self, CredentialsError> {
        CredentialsManager::new()
            .map(Self::with_manager)
            .ok_or(CredentialsError::NoHomeDirectory)
    }

    /// Create a provider backed by an explicit manager.
    pub fn with_manager(manager: CredentialsManager) -> Self {
        Self { manager }
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &std::path::PathBuf {
        self.manager.credentials_path()
    }
}

#[async_trait]
impl CredentialsProvider for FileCredentialsProvider {
    async fn load_api_key(&self) -> Result<Option<String>, CredentialsError> {
        let creds = self.manager.load();
        if creds.has_api_key() {
            Ok(creds.api_key)
        } else {
            Ok(None)
        }
    }

    async fn save_api_key(&self, api_key: &str) -> Result<(), CredentialsError> {
        self.manager
            .save(&Credentials::with_api_key(api_key))
            .map_err(|e| CredentialsError::SaveFailed(e.to_string()))
    }

    async fn invalidate(&self) -> Result<(), CredentialsError> {
        tracing::info!("Removing rejected API key from {}", self.credentials_path().display());
        self.manager
            .clear()
            .map_err(|e| CredentialsError::ClearFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn provider_in(dir: &TempDir) -> FileCredentialsProvider {
        FileCredentialsProvider::with_manager(CredentialsManager::with_dir(dir.path()))
    }

    #[test]
    fn test_file_credentials_provider_new() {
        // This test depends on having a home directory
        let provider = FileCredentialsProvider::new().unwrap();
        assert!(provider.credentials_path().ends_with("credentials.json"));
    }

    #[tokio::test]
    async fn test_load_without_file() {
        let dir = TempDir::new().unwrap();
        let provider = provider_in(&dir);
        assert_eq!(provider.load_api_key().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let provider = provider_in(&dir);

        provider.save_api_key("app-abc").await.unwrap();
        assert_eq!(provider.load_api_key().await.unwrap().as_deref(), Some("app-abc"));
    }

    #[tokio::test]
    async fn test_invalidate_removes_key() {
        let dir = TempDir::new().unwrap();
        let provider = provider_in(&dir);

        provider.save_api_key("app-abc").await.unwrap();
        provider.invalidate().await.unwrap();

        assert_eq!(provider.load_api_key().await.unwrap(), None);
        assert!(!provider.credentials_path().exists());
    }

    #[tokio::test]
    async fn test_blank_key_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let provider = provider_in(&dir);

        provider.save_api_key("  ").await.unwrap();
        assert_eq!(provider.load_api_key().await.unwrap(), None);
    }
}
