//! Mock HTTP client for testing.
//!
//! Replays canned chunk sequences so tests can drive the streaming core
//! with exact byte boundaries and failure points.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::lock;
use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: String,
}

impl RecordedRequest {
    /// Parse the recorded body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Yield these chunks, then end the body
    Stream(Vec<Bytes>),
    /// Yield these chunks, then fail mid-body
    StreamThenError(Vec<Bytes>, HttpError),
    /// Yield these chunks, then never produce another item
    StreamThenHang(Vec<Bytes>),
    /// Fail before any chunk is delivered
    Error(HttpError),
}

impl MockResponse {
    /// A stream that delivers each string as one chunk.
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        MockResponse::Stream(
            chunks
                .into_iter()
                .map(|c| Bytes::copy_from_slice(c.as_ref()))
                .collect(),
        )
    }

    /// Reject the request with the given status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        MockResponse::Error(HttpError::ServerError {
            status,
            message: message.into(),
        })
    }

    fn into_stream(self) -> Result<ByteStream, HttpError> {
        match self {
            MockResponse::Stream(chunks) => Ok(Box::pin(futures::stream::iter(
                chunks.into_iter().map(Ok),
            ))),
            MockResponse::StreamThenError(chunks, err) => Ok(Box::pin(
                futures::stream::iter(chunks.into_iter().map(Ok))
                    .chain(futures::stream::once(async move { Err(err) })),
            )),
            MockResponse::StreamThenHang(chunks) => Ok(Box::pin(
                futures::stream::iter(chunks.into_iter().map(Ok)).chain(futures::stream::pending()),
            )),
            MockResponse::Error(err) => Err(err),
        }
    }
}

/// Mock HTTP client for testing.
///
/// Responses are served from a queue in call order; once the queue is
/// empty the default response is used. Clones share state.
///
/// # Example
///
/// ```ignore
/// use chatstream::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.push_response(MockResponse::chunks([
///     "data: {\"event\":\"message\",\"message_id\":\"m1\",\"answer\":\"Hi\"}\n",
/// ]));
///
/// let body = client.post_stream("http://test/chat-messages", "{}", &Headers::new()).await?;
/// assert_eq!(client.requests().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    queued: Arc<Mutex<VecDeque<MockResponse>>>,
    default_response: Arc<Mutex<Option<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client with no responses configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client whose first call returns `response`.
    pub fn with_response(response: MockResponse) -> Self {
        let client = Self::new();
        client.push_response(response);
        client
    }

    /// Queue a response for the next unanswered call.
    pub fn push_response(&self, response: MockResponse) {
        lock(&self.queued).push_back(response);
    }

    /// Set the response used once the queue is empty.
    pub fn set_default_response(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    fn next_response(&self) -> Option<MockResponse> {
        lock(&self.queued)
            .pop_front()
            .or_else(|| lock(&self.default_response).clone())
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_stream(&self, url: &str, body: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        lock(&self.requests).push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
            body: body.to_string(),
        });

        match self.next_response() {
            Some(response) => response.into_stream(),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}
