//! One-shot and interactive chat.

use std::sync::Arc;

use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::render::TranscriptPrinter;
use crate::adapters::{ChainedCredentials, EnvCredentialsProvider, FileCredentialsProvider, ReqwestHttpClient};
use crate::client::ChatClient;
use crate::config::Config;
use crate::session::{CancelHandle, ChatSession, SessionError, SessionUpdate, StreamOutcome};
use crate::traits::HttpClient;

/// Build a session talking to the real API.
pub fn build_session(
    config: &Config,
) -> Result<(ChatSession<ReqwestHttpClient>, mpsc::UnboundedReceiver<SessionUpdate>)> {
    let http = ReqwestHttpClient::with_timeout(config.timeout())?;
    let credentials = ChainedCredentials::env_then_file(
        EnvCredentialsProvider::new(config.api_key_env.as_str()),
        FileCredentialsProvider::new()?,
    );
    let client = ChatClient::new(http, Arc::new(credentials), config.base_url.as_str(), config.user.as_str());
    Ok(ChatSession::with_updates(client))
}

/// Print updates until the session is dropped.
fn spawn_printer(mut updates: mpsc::UnboundedReceiver<SessionUpdate>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut printer = TranscriptPrinter::stdio();
        while let Some(update) = updates.recv().await {
            if let Err(e) = printer.handle(&update) {
                tracing::warn!("Failed to write output: {}", e);
            }
        }
    })
}

/// Send one query, cancelling on Ctrl-C.
async fn send_with_interrupt<H: HttpClient>(
    session: &ChatSession<H>,
    query: &str,
    cancel: &CancelHandle,
) -> Result<StreamOutcome, SessionError> {
    cancel.reset();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = session.send(query, cancel).await;
    interrupt.abort();
    result
}

/// Send a single query and wait for the whole answer.
///
/// Fails when the send could not start or the stream failed.
pub async fn run_once(config: &Config, query: &str) -> Result<()> {
    let (session, updates) = build_session(config)?;
    let printer = spawn_printer(updates);

    let outcome = send_with_interrupt(&session, query, &CancelHandle::new()).await;
    drop(session);
    if let Err(e) = printer.await {
        tracing::warn!("Printer task failed: {}", e);
    }

    match outcome? {
        StreamOutcome::Failed(e) => Err(color_eyre::eyre::eyre!(e)),
        _ => Ok(()),
    }
}

/// Read one message per stdin line and stream each answer.
pub async fn run_interactive(config: &Config) -> Result<()> {
    let (session, updates) = build_session(config)?;
    let printer = spawn_printer(updates);
    let cancel = CancelHandle::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("Connected to {}. Type /new for a new conversation, /quit to exit.", config.base_url);

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/new" => {
                session.reset()?;
                eprintln!("Started a new conversation.");
                continue;
            }
            query => match send_with_interrupt(&session, query, &cancel).await {
                Ok(StreamOutcome::Completed { conversation_id }) => {
                    tracing::debug!("Turn complete in conversation {}", conversation_id);
                }
                Ok(outcome) => tracing::info!("Turn ended: {:?}", outcome),
                Err(SessionError::Client(e)) => eprintln!("error: {}", e),
                Err(e) => return Err(e.into()),
            },
        }
    }

    drop(session);
    if let Err(e) = printer.await {
        tracing::warn!("Printer task failed: {}", e);
    }
    Ok(())
}
