//! `--set-key` and `--clear-key`.

use crate::error::ChatResult;
use crate::traits::CredentialsProvider;

/// Store `key` through `provider`.
pub async fn handle_set_key<P: CredentialsProvider + ?Sized>(provider: &P, key: &str) -> ChatResult<()> {
    provider.save_api_key(key.trim()).await?;
    tracing::info!("API key saved");
    Ok(())
}

/// Remove the stored key.
pub async fn handle_clear_key<P: CredentialsProvider + ?Sized>(provider: &P) -> ChatResult<()> {
    provider.invalidate().await?;
    tracing::info!("API key cleared");
    Ok(())
}
