//! Debounced auto-save of an editor's draft.
//!
//! Edits land in a single pending slot. A save starts `delay` after the
//! last edit, and only if no other save is in flight; edits made while a
//! save runs wait for the next cycle. In-flight saves are never cancelled.
//!
//! A failed save is retried with exponential backoff until
//! [`AutoSaveConfig::max_attempts`] attempts have failed. The status then
//! stays [`SaveStatus::Failed`] until the next edit, which always
//! supersedes the failed payload.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, sleep_until};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::SessionDraft;

/// Where drafts are saved to.
#[async_trait]
pub trait DraftSink: Send + Sync + 'static {
    async fn save(&self, draft: &SessionDraft) -> Result<(), ClientError>;
}

/// Saves drafts by updating one existing session on the server.
pub struct RemoteDraft {
    client: ApiClient,
    token: String,
    session_id: String,
}

impl RemoteDraft {
    pub fn new(client: ApiClient, token: impl Into<String>, session_id: impl Into<String>) -> Self {
        RemoteDraft {
            client,
            token: token.into(),
            session_id: session_id.into(),
        }
    }
}

#[async_trait]
impl DraftSink for RemoteDraft {
    async fn save(&self, draft: &SessionDraft) -> Result<(), ClientError> {
        self.client
            .update_session(&self.token, &self.session_id, draft)
            .await
            .map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// Nothing edited yet.
    Idle,
    /// An edit is waiting for its timer.
    Pending,
    Saving,
    Saved,
    /// A save failed and will be retried.
    Retrying { attempt: u32, message: String },
    /// Every attempt failed; cleared by the next edit.
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSaveConfig {
    /// Quiet period after the last edit.
    pub delay: Duration,
    /// Total attempts per payload, the first save included.
    pub max_attempts: u32,
    pub max_backoff: Duration,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        AutoSaveConfig {
            delay: Duration::from_secs(5),
            max_attempts: 3,
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl AutoSaveConfig {
    /// Wait before the retry that follows failed attempt number `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.delay
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Split a free-form comma list into tags: trimmed, empties dropped.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

enum Command {
    Edit(SessionDraft),
    Close,
}

/// Handle to a background auto-save worker.
pub struct AutoSaver {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SaveStatus>,
    worker: JoinHandle<()>,
}

impl AutoSaver {
    /// Start a worker on the current tokio runtime.
    pub fn spawn<S: DraftSink>(sink: S, config: AutoSaveConfig) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::Idle);

        let worker = Worker {
            sink: Arc::new(sink),
            config,
            status: status_tx,
            pending: None,
            deadline: None,
            failures: 0,
            in_flight: None,
        };

        AutoSaver {
            commands,
            status,
            worker: tokio::spawn(worker.run(rx)),
        }
    }

    /// Record the latest editor state, replacing any unsaved one.
    pub fn edit(&self, draft: SessionDraft) -> Result<(), ClientError> {
        self.commands
            .send(Command::Edit(draft))
            .map_err(|_| ClientError::Closed)
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Save any pending edit right away, then stop. Returns the final status.
    pub async fn close(self) -> SaveStatus {
        let _ = self.commands.send(Command::Close);
        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "auto-save worker crashed");
        }
        self.status.borrow().clone()
    }
}

type SaveOutcome = (SessionDraft, Result<(), ClientError>);

struct Worker<S> {
    sink: Arc<S>,
    config: AutoSaveConfig,
    status: watch::Sender<SaveStatus>,
    /// Newest unsaved payload.
    pending: Option<SessionDraft>,
    /// When `pending` becomes due.
    deadline: Option<Instant>,
    /// Failed attempts for the payload being retried.
    failures: u32,
    in_flight: Option<JoinHandle<SaveOutcome>>,
}

impl<S: DraftSink> Worker<S> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            let due = if self.in_flight.is_none() { self.deadline } else { None };

            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Edit(draft)) => self.on_edit(draft),
                    Some(Command::Close) | None => break,
                },
                _ = wait_until(due) => {
                    self.deadline = None;
                    self.start_save();
                }
                outcome = join(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.on_finished(outcome);
                }
            }
        }

        self.flush().await;
    }

    fn on_edit(&mut self, draft: SessionDraft) {
        self.pending = Some(draft);
        self.failures = 0;
        self.deadline = Some(Instant::now() + self.config.delay);
        if self.in_flight.is_none() {
            self.status.send_replace(SaveStatus::Pending);
        }
    }

    fn start_save(&mut self) {
        let Some(draft) = self.pending.take() else {
            return;
        };
        self.status.send_replace(SaveStatus::Saving);

        let sink = Arc::clone(&self.sink);
        self.in_flight = Some(tokio::spawn(async move {
            let result = sink.save(&draft).await;
            (draft, result)
        }));
    }

    fn on_finished(&mut self, outcome: Result<SaveOutcome, JoinError>) {
        let (draft, message) = match outcome {
            Ok((_, Ok(()))) => {
                self.failures = 0;
                let next = if self.pending.is_some() {
                    SaveStatus::Pending
                } else {
                    SaveStatus::Saved
                };
                self.status.send_replace(next);
                return;
            }
            Ok((draft, Err(e))) => (Some(draft), e.to_string()),
            Err(e) => (None, format!("save task failed: {e}")),
        };

        if self.pending.is_some() {
            // A newer edit replaces the failed payload.
            self.status.send_replace(SaveStatus::Pending);
            return;
        }

        self.failures += 1;
        tracing::warn!(attempt = self.failures, error = %message, "auto-save failed");

        match draft {
            Some(draft) if self.failures < self.config.max_attempts => {
                self.pending = Some(draft);
                self.deadline = Some(Instant::now() + self.config.backoff(self.failures));
                self.status.send_replace(SaveStatus::Retrying {
                    attempt: self.failures,
                    message,
                });
            }
            _ => {
                self.status.send_replace(SaveStatus::Failed { message });
            }
        }
    }

    /// Finish the in-flight save, then save whatever is still pending once.
    async fn flush(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            let outcome = handle.await;
            self.on_finished(outcome);
        }

        if let Some(draft) = self.pending.take() {
            self.status.send_replace(SaveStatus::Saving);
            let status = match self.sink.save(&draft).await {
                Ok(()) => SaveStatus::Saved,
                Err(e) => SaveStatus::Failed {
                    message: e.to_string(),
                },
            };
            self.status.send_replace(status);
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn join<T>(handle: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match handle {
        Some(handle) => handle.await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(" calm, sleep ,,  "), vec!["calm", "sleep"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = AutoSaveConfig::default();
        assert_eq!(config.backoff(1), Duration::from_secs(5));
        assert_eq!(config.backoff(2), Duration::from_secs(10));
        assert_eq!(config.backoff(3), Duration::from_secs(20));
        assert_eq!(config.backoff(5), Duration::from_secs(60));
        assert_eq!(config.backoff(40), Duration::from_secs(60));
    }
}
