//! Environment-variable credentials provider.

use async_trait::async_trait;

use crate::traits::{CredentialsError, CredentialsProvider};

/// Default variable holding the API key.
pub const DEFAULT_API_KEY_ENV: &str = "CHATSTREAM_API_KEY";

/// Reads the API key from an environment variable.
///
/// The variable is read on every load so a key exported after startup is
/// picked up. This provider cannot store keys.
#[derive(Debug, Clone)]
pub struct EnvCredentialsProvider {
    var: String,
}

impl EnvCredentialsProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// The variable this provider reads.
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredentialsProvider {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY_ENV)
    }
}

#[async_trait]
impl CredentialsProvider for EnvCredentialsProvider {
    async fn load_api_key(&self) -> Result<Option<String>, CredentialsError> {
        Ok(std::env::var(&self.var)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty()))
    }

    async fn save_api_key(&self, _api_key: &str) -> Result<(), CredentialsError> {
        Err(CredentialsError::ReadOnly)
    }

    async fn invalidate(&self) -> Result<(), CredentialsError> {
        tracing::warn!("API key from ${} was rejected; unset or replace it", self.var);
        Ok(())
    }
}
