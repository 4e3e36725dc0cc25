//! Credentials provider trait abstraction.
//!
//! The API key is an external collaborator concern. The session asks a
//! provider for it before each send and tells the provider to drop it when
//! the server rejects it.

use async_trait::async_trait;

/// Credentials operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    /// Failed to load credentials
    LoadFailed(String),
    /// Failed to save credentials
    SaveFailed(String),
    /// Failed to clear credentials
    ClearFailed(String),
    /// This provider cannot store keys (e.g. environment variables)
    ReadOnly,
    /// No home directory to keep the credentials file in
    NoHomeDirectory,
}

impl std::fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialsError::LoadFailed(msg) => write!(f, "Failed to load credentials: {}", msg),
            CredentialsError::SaveFailed(msg) => write!(f, "Failed to save credentials: {}", msg),
            CredentialsError::ClearFailed(msg) => {
                write!(f, "Failed to clear credentials: {}", msg)
            }
            CredentialsError::ReadOnly => write!(f, "Credentials provider is read-only"),
            CredentialsError::NoHomeDirectory => {
                write!(f, "Failed to determine home directory")
            }
        }
    }
}

impl std::error::Error for CredentialsError {}

/// Trait for API key storage and retrieval.
///
/// # Example
///
/// ```ignore
/// use chatstream::traits::CredentialsProvider;
///
/// async fn bearer<P: CredentialsProvider>(provider: &P) -> Option<String> {
///     provider.load_api_key().await.ok().flatten().map(|key| format!("Bearer {}", key))
/// }
/// ```
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Load the API key.
    ///
    /// # Returns
    /// - `Ok(Some(key))` if a key is stored
    /// - `Ok(None)` if no key is stored
    /// - `Err(error)` if loading failed
    async fn load_api_key(&self) -> Result<Option<String>, CredentialsError>;

    /// Store a new API key.
    async fn save_api_key(&self, api_key: &str) -> Result<(), CredentialsError>;

    /// Forget the stored key after the server rejected it.
    async fn invalidate(&self) -> Result<(), CredentialsError>;
}
