//! Credentials provider that consults several sources in order.

use async_trait::async_trait;

use super::{EnvCredentialsProvider, FileCredentialsProvider};
use crate::traits::{CredentialsError, CredentialsProvider};

/// Tries each provider in order.
///
/// Loading returns the first key found. Saving goes to the first provider
/// that accepts writes. Invalidation reaches every provider.
pub struct ChainedCredentials {
    providers: Vec<Box<dyn CredentialsProvider>>,
}

impl ChainedCredentials {
    pub fn new(providers: Vec<Box<dyn CredentialsProvider>>) -> Self {
        Self { providers }
    }

    /// The environment variable first, then the credentials file.
    pub fn env_then_file(env: EnvCredentialsProvider, file: FileCredentialsProvider) -> Self {
        Self::new(vec![Box::new(env), Box::new(file)])
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ChainedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainedCredentials")
            .field("providers", &self.providers.len())
            .finish()
    }
}

#[async_trait]
impl CredentialsProvider for ChainedCredentials {
    async fn load_api_key(&self) -> Result<Option<String>, CredentialsError> {
        for provider in &self.providers {
            if let Some(key) = provider.load_api_key().await? {
                return Ok(Some(key));
            }
        }
        Ok(None)
    }

    async fn save_api_key(&self, api_key: &str) -> Result<(), CredentialsError> {
        for provider in &self.providers {
            match provider.save_api_key(api_key).await {
                Err(CredentialsError::ReadOnly) => continue,
                other => return other,
            }
        }
        Err(CredentialsError::ReadOnly)
    }

    async fn invalidate(&self) -> Result<(), CredentialsError> {
        let mut first_error = None;
        for provider in &self.providers {
            match provider.invalidate().await {
                Ok(()) | Err(CredentialsError::ReadOnly) => {}
                Err(e) => {
                    tracing::warn!("Failed to invalidate credentials: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
