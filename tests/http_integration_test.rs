// End-to-end tests over real HTTP against a wiremock server.

mod common;

use std::sync::Arc;

use chatstream::adapters::{FileCredentialsProvider, ReqwestHttpClient};
use chatstream::auth::CredentialsManager;
use chatstream::client::ChatClient;
use chatstream::error::StreamError;
use chatstream::session::{CancelHandle, ChatSession, StreamOutcome};
use chatstream::traits::CredentialsProvider;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Credentials file in a temp dir, pre-loaded with the test key.
async fn file_credentials(dir: &TempDir) -> FileCredentialsProvider {
    let provider = FileCredentialsProvider::with_manager(CredentialsManager::with_dir(dir.path()));
    provider.save_api_key(common::TEST_API_KEY).await.unwrap();
    provider
}

fn session_for(server: &MockServer, credentials: FileCredentialsProvider) -> ChatSession<ReqwestHttpClient> {
    let client = ChatClient::new(
        ReqwestHttpClient::new(),
        Arc::new(credentials),
        format!("{}/v1", server.uri()),
        common::TEST_USER,
    );
    ChatSession::new(client)
}

fn event_stream_body() -> String {
    [
        common::message_line("m1", "Hello, "),
        "\n".to_string(),
        common::message_line("m1", "world"),
        "data: {\"event\":\"ping\"}\n".to_string(),
        common::message_end_line("conv-42"),
    ]
    .concat()
}

#[tokio::test]
async fn test_streamed_answer_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .and(header("authorization", "Bearer app-test-key"))
        .and(header("accept", "text/event-stream"))
        .and(body_partial_json(serde_json::json!({
            "query": "Say hello",
            "response_mode": "streaming",
            "conversation_id": "",
            "user": "test-user"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(event_stream_body(), "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let session = session_for(&server, file_credentials(&dir).await);

    let outcome = session.send("Say hello", &CancelHandle::new()).await.unwrap();
    assert_eq!(
        outcome,
        StreamOutcome::Completed {
            conversation_id: "conv-42".to_string()
        }
    );

    let state = session.state();
    assert_eq!(state.len(), 2);
    assert_eq!(state.last().unwrap().id, "m1");
    assert_eq!(state.last().unwrap().content, "Hello, world");
}

#[tokio::test]
async fn test_unauthorized_clears_credentials_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "code": "unauthorized",
            "message": "Access token is invalid",
            "status": 401
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let credentials = file_credentials(&dir).await;
    let credentials_path = credentials.credentials_path().clone();
    assert!(credentials_path.exists());

    let session = session_for(&server, credentials);
    let outcome = session.send("Hi", &CancelHandle::new()).await.unwrap();

    assert!(matches!(
        outcome,
        StreamOutcome::Failed(StreamError::Auth { status: Some(401), .. })
    ));
    assert!(!credentials_path.exists());
}

#[tokio::test]
async fn test_server_error_status_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let credentials = file_credentials(&dir).await;
    let credentials_path = credentials.credentials_path().clone();
    let session = session_for(&server, credentials);

    let outcome = session.send("Hi", &CancelHandle::new()).await.unwrap();
    match outcome {
        StreamOutcome::Failed(StreamError::Transport { status, message }) => {
            assert_eq!(status, Some(502));
            assert_eq!(message, "bad gateway");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    // Not an auth failure, so the key stays
    assert!(credentials_path.exists());
}

#[tokio::test]
async fn test_body_without_message_end_is_incomplete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(common::message_line("m1", "cut of"), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let session = session_for(&server, file_credentials(&dir).await);

    let outcome = session.send("Hi", &CancelHandle::new()).await.unwrap();
    assert_eq!(outcome, StreamOutcome::Incomplete);
    assert_eq!(session.state().last().unwrap().content, "cut of");
    assert!(!session.state().is_streaming());
}

#[tokio::test]
async fn test_follow_up_sends_conversation_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .and(body_partial_json(serde_json::json!({"conversation_id": "conv-42"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            [common::message_line("m2", "again"), common::message_end_line("conv-42")].concat(),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .and(body_partial_json(serde_json::json!({"conversation_id": ""})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(event_stream_body(), "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let session = session_for(&server, file_credentials(&dir).await);
    let cancel = CancelHandle::new();

    session.send("first", &cancel).await.unwrap();
    let outcome = session.send("second", &cancel).await.unwrap();
    assert!(outcome.is_completed());
    assert_eq!(session.state().len(), 4);
    assert_eq!(session.state().last().unwrap().content, "again");
}
