//! Chat session: drives one streamed answer at a time.
//!
//! A send pushes the user turn, opens the stream, and then processes the
//! body chunk by chunk. Each chunk goes through the line reader, the event
//! decoder and the transcript accumulator before the next one is awaited.
//! Observers get a cloned [`ConversationState`] after every applied event.

use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::client::{ChatClient, ClientError};
use crate::error::StreamError;
use crate::sse::{SseDecoder, SseParseError, StreamEvent};
use crate::traits::{ByteStream, HttpClient};
use crate::transcript::{Completion, ConversationState};

/// Notification delivered to observers while a stream is processed.
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    /// Snapshot taken right after an event was applied
    Transcript(ConversationState),
    /// Something went wrong; see [`StreamError::is_fatal`]
    Error(StreamError),
}

/// How a send ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// MessageEnd was seen and the body ended normally
    Completed { conversation_id: String },
    /// The body ended, or was cancelled, before MessageEnd
    Incomplete,
    /// Cancelled after MessageEnd was seen
    Cancelled,
    /// Transport failure, auth rejection or a server error event
    Failed(StreamError),
}

impl StreamOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StreamOutcome::Completed { .. })
    }
}

/// Errors that prevent a send from starting.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A stream is already in flight
    #[error("A response is still streaming")]
    Busy,

    /// Nothing to send
    #[error("Message is empty")]
    EmptyQuery,

    /// The request could not be built
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Lets another task stop an in-flight send.
///
/// Clones share the same signal. A handle can be reused for later sends
/// after [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Clear a previous cancellation.
    pub fn reset(&self) {
        self.tx.send_replace(false);
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once cancellation is requested. Never resolves if every
/// sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
    if closed {
        futures::future::pending::<()>().await;
    }
}

/// Clears the loading flag even if the send future is dropped.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Result of handling one decoded line.
enum Step {
    Continue,
    Stop(StreamOutcome),
}

/// A conversation with the chat server.
///
/// The session can be shared between tasks; only one send runs at a time
/// and a second concurrent send is rejected with [`SessionError::Busy`].
pub struct ChatSession<H> {
    client: ChatClient<H>,
    state: Mutex<ConversationState>,
    is_loading: AtomicBool,
    updates: Option<mpsc::UnboundedSender<SessionUpdate>>,
}

impl<H: HttpClient> ChatSession<H> {
    /// Create a session without observers.
    pub fn new(client: ChatClient<H>) -> Self {
        Self {
            client,
            state: Mutex::new(ConversationState::new()),
            is_loading: AtomicBool::new(false),
            updates: None,
        }
    }

    /// Create a session and the receiving end of its update channel.
    pub fn with_updates(client: ChatClient<H>) -> (Self, mpsc::UnboundedReceiver<SessionUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = Self::new(client);
        session.updates = Some(tx);
        (session, rx)
    }

    /// Snapshot of the conversation.
    pub fn state(&self) -> ConversationState {
        self.lock_state().clone()
    }

    pub fn conversation_id(&self) -> String {
        self.lock_state().conversation_id().to_string()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::Acquire)
    }

    /// Forget the transcript and start a new conversation.
    pub fn reset(&self) -> Result<(), SessionError> {
        if self.is_loading() {
            return Err(SessionError::Busy);
        }
        *self.lock_state() = ConversationState::new();
        Ok(())
    }

    /// Send `query` and process the streamed answer until it ends.
    ///
    /// Stream-level problems are reported through the update channel and
    /// the returned outcome. `Err` means the send never started.
    pub async fn send(&self, query: &str, cancel: &CancelHandle) -> Result<StreamOutcome, SessionError> {
        if query.trim().is_empty() {
            return Err(SessionError::EmptyQuery);
        }

        if self
            .is_loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Rejecting send while a response is streaming");
            return Err(SessionError::Busy);
        }
        let _loading = LoadingGuard(&self.is_loading);

        let conversation_id = {
            let mut state = self.lock_state();
            state.push_user(query);
            self.notify(SessionUpdate::Transcript(state.clone()));
            state.conversation_id().to_string()
        };

        let body = match self.client.open_stream(query, &conversation_id).await {
            Ok(body) => body,
            Err(ClientError::Stream(err)) => return Ok(self.fail(err).await),
            Err(other) => return Err(other.into()),
        };

        let outcome = self.drive(body, cancel).await;
        tracing::debug!("Stream finished: {:?}", outcome);
        Ok(outcome)
    }

    async fn drive(&self, mut body: ByteStream, cancel: &CancelHandle) -> StreamOutcome {
        let mut cancel_rx = cancel.subscribe();
        let mut decoder = SseDecoder::new();
        let mut saw_end = false;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancelled(&mut cancel_rx) => {
                    decoder.abort();
                    self.lock_state().close();
                    tracing::info!("Stream cancelled (message_end seen: {})", saw_end);
                    return if saw_end {
                        StreamOutcome::Cancelled
                    } else {
                        StreamOutcome::Incomplete
                    };
                }
                next = body.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    for decoded in decoder.feed(&chunk) {
                        if let Step::Stop(outcome) = self.handle(decoded, &mut saw_end).await {
                            decoder.abort();
                            return outcome;
                        }
                    }
                }
                Some(Err(e)) => {
                    decoder.abort();
                    let err = StreamError::from_http(&e);
                    tracing::error!("Stream read failed: {}", err);
                    return self.fail(err).await;
                }
                None => {
                    if let Some(decoded) = decoder.finish() {
                        if let Step::Stop(outcome) = self.handle(decoded, &mut saw_end).await {
                            return outcome;
                        }
                    }
                    return self.end_of_body(saw_end);
                }
            }
        }
    }

    async fn handle(&self, decoded: Result<StreamEvent, SseParseError>, saw_end: &mut bool) -> Step {
        let event = match decoded {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Skipping malformed stream line: {}", e);
                self.notify(SessionUpdate::Error(e.into()));
                return Step::Continue;
            }
        };

        tracing::debug!("Applying {} event", event.event_type_name());
        let completion = {
            let mut state = self.lock_state();
            let completion = state.apply_event(&event);
            self.notify(SessionUpdate::Transcript(state.clone()));
            completion
        };

        match (completion, event) {
            (Completion::TurnComplete, _) => {
                *saw_end = true;
                Step::Continue
            }
            // A message after message_end opens a turn that still needs its own end
            (Completion::Pending, StreamEvent::Message { .. }) => {
                *saw_end = false;
                Step::Continue
            }
            (
                Completion::Failed,
                StreamEvent::Error {
                    message,
                    code,
                    status,
                },
            ) => {
                let err = StreamError::from_event(&message, code.as_deref(), status);
                tracing::error!("Server reported an error: {}", err);
                Step::Stop(self.report_failure(err).await)
            }
            _ => Step::Continue,
        }
    }

    fn end_of_body(&self, saw_end: bool) -> StreamOutcome {
        let mut state = self.lock_state();
        if saw_end && !state.is_streaming() {
            return StreamOutcome::Completed {
                conversation_id: state.conversation_id().to_string(),
            };
        }

        let partial_content = state.last().is_some_and(|entry| entry.is_assistant());
        state.close();
        tracing::warn!("Stream ended without message_end (partial answer: {})", partial_content);
        self.notify(SessionUpdate::Transcript(state.clone()));
        self.notify(SessionUpdate::Error(StreamError::PrematureEnd { partial_content }));
        StreamOutcome::Incomplete
    }

    /// Close the transcript and report a fatal error.
    async fn fail(&self, err: StreamError) -> StreamOutcome {
        {
            let mut state = self.lock_state();
            state.close();
            self.notify(SessionUpdate::Transcript(state.clone()));
        }
        self.report_failure(err).await
    }

    async fn report_failure(&self, err: StreamError) -> StreamOutcome {
        if err.requires_reauth() {
            self.client.invalidate_credentials().await;
        }
        self.notify(SessionUpdate::Error(err.clone()));
        StreamOutcome::Failed(err)
    }

    fn notify(&self, update: SessionUpdate) {
        if let Some(tx) = &self.updates {
            if tx.send(update).is_err() {
                tracing::debug!("Update receiver dropped");
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
