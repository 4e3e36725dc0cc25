//! Chat API client.
//!
//! Builds the `POST /chat-messages` request and hands back the raw response
//! body. Turning the body into events is the session's job.

use std::sync::Arc;
use thiserror::Error;

use crate::error::StreamError;
use crate::models::ChatRequest;
use crate::traits::{ByteStream, CredentialsError, CredentialsProvider, Headers, HttpClient};

/// Path of the streaming chat endpoint, relative to the base URL.
pub const CHAT_MESSAGES_PATH: &str = "/chat-messages";

/// Errors raised while opening a stream.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No API key is configured anywhere
    #[error("No API key configured. Set one with --set-key or the CHATSTREAM_API_KEY variable")]
    MissingApiKey,

    /// The credentials provider failed
    #[error("Credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    /// The request could not be serialized
    #[error("Failed to encode request: {0}")]
    Json(#[from] serde_json::Error),

    /// The server refused the request or could not be reached
    #[error("{0}")]
    Stream(#[from] StreamError),
}

impl ClientError {
    /// Whether stored credentials should be invalidated.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, ClientError::Stream(e) if e.requires_reauth())
    }
}

/// Client for the chat-messages endpoint.
pub struct ChatClient<H> {
    http: H,
    credentials: Arc<dyn CredentialsProvider>,
    base_url: String,
    user: String,
}

impl<H: HttpClient> ChatClient<H> {
    pub fn new(
        http: H,
        credentials: Arc<dyn CredentialsProvider>,
        base_url: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            http,
            credentials,
            base_url: base_url.into(),
            user: user.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Full URL of the chat-messages endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CHAT_MESSAGES_PATH)
    }

    /// Send `query` and return the streaming response body.
    ///
    /// An empty `conversation_id` starts a new conversation.
    pub async fn open_stream(&self, query: &str, conversation_id: &str) -> Result<ByteStream, ClientError> {
        let api_key = self
            .credentials
            .load_api_key()
            .await?
            .ok_or(ClientError::MissingApiKey)?;

        let request = ChatRequest::new(query, self.user.as_str()).with_conversation(conversation_id);
        let body = serde_json::to_string(&request)?;
        let url = self.endpoint();

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers.insert("Authorization".to_string(), format!("Bearer {}", api_key));

        tracing::debug!(
            "Opening stream at {} (conversation: {})",
            url,
            if conversation_id.is_empty() { "<new>" } else { conversation_id }
        );

        self.http
            .post_stream(&url, &body, &headers)
            .await
            .map_err(|e| {
                let err = StreamError::from_http(&e);
                tracing::error!("Failed to open stream: {}", err);
                ClientError::Stream(err)
            })
    }

    /// Tell the credentials provider its key was rejected.
    pub async fn invalidate_credentials(&self) {
        if let Err(e) = self.credentials.invalidate().await {
            tracing::warn!("Failed to invalidate credentials: {}", e);
        }
    }
}
