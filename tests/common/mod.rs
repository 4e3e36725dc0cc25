//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chatstream::adapters::mock::{InMemoryCredentials, MockHttpClient, MockResponse};
use chatstream::client::ChatClient;
use chatstream::session::{ChatSession, SessionUpdate};
use chatstream::error::StreamError;
use tokio::sync::mpsc;

pub const TEST_API_KEY: &str = "app-test-key";
pub const TEST_USER: &str = "test-user";

/// The chunk sequence from the reference scenario, split mid-record.
pub fn split_record_chunks() -> Vec<&'static str> {
    vec![
        "data: {\"event\":\"mess",
        "age\",\"message_id\":\"m1\",\"answer\":\"Hi\",\"created_at\":1}\n",
        "data: {\"event\":\"message_end\",\"conversation_id\":\"c1\"}\n",
    ]
}

pub fn message_line(message_id: &str, answer: &str) -> String {
    format!(
        "data: {}\n",
        serde_json::json!({"event": "message", "message_id": message_id, "answer": answer})
    )
}

pub fn message_end_line(conversation_id: &str) -> String {
    format!(
        "data: {}\n",
        serde_json::json!({"event": "message_end", "conversation_id": conversation_id})
    )
}

pub fn error_line(status: u16, code: &str, message: &str) -> String {
    format!(
        "data: {}\n",
        serde_json::json!({"event": "error", "status": status, "code": code, "message": message})
    )
}

/// Everything a session test needs to inspect.
pub struct Harness {
    pub session: ChatSession<MockHttpClient>,
    pub updates: mpsc::UnboundedReceiver<SessionUpdate>,
    pub http: MockHttpClient,
    pub credentials: InMemoryCredentials,
}

impl Harness {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        let http = MockHttpClient::new();
        for response in responses {
            http.push_response(response);
        }
        let credentials = InMemoryCredentials::with_api_key(TEST_API_KEY);
        let client = ChatClient::new(
            http.clone(),
            Arc::new(credentials.clone()),
            "http://chat.test/v1",
            TEST_USER,
        );
        let (session, updates) = ChatSession::with_updates(client);
        Self {
            session,
            updates,
            http,
            credentials,
        }
    }

    pub fn single(response: MockResponse) -> Self {
        Self::new(vec![response])
    }

    /// Take every update delivered so far.
    pub fn drain(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.updates.try_recv() {
            updates.push(update);
        }
        updates
    }

    /// Take only the error notifications delivered so far.
    pub fn errors(&mut self) -> Vec<StreamError> {
        self.drain()
            .into_iter()
            .filter_map(|u| match u {
                SessionUpdate::Error(e) => Some(e),
                SessionUpdate::Transcript(_) => None,
            })
            .collect()
    }
}
