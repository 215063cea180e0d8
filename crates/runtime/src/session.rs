//! Generation sessions.
//!
//! At most one session runs at a time. A session owns the provider's
//! fragment stream, accumulates text, and exposes two consumable
//! streams: raw fragments ([`Generation`] itself) and coalesced commits
//! ([`Commits`]). Cancellation is cooperative through a watch channel;
//! fragments already received stay accumulated, later ones are dropped.

use crate::coalesce::{Commit, coalesce};
use crate::error::ChatError;
use crate::stats;
use compact_str::CompactString;
use futures_core::Stream;
use futures_util::StreamExt;
use llm::{Fragment, LlmError};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use ulid::Ulid;

/// Lifecycle state of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Running,
    Completed,
    Cancelled,
    Failed(LlmError),
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

struct SessionState {
    text: String,
    fragments: usize,
    status: Status,
    elapsed: Option<Duration>,
}

struct SessionInner {
    id: CompactString,
    model: CompactString,
    started: Instant,
    state: Mutex<SessionState>,
    cancel: watch::Sender<bool>,
    done: watch::Sender<bool>,
}

/// Shared view of a running or finished session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

impl SessionHandle {
    fn new(model: &str) -> Self {
        let (cancel, _) = watch::channel(false);
        let (done, _) = watch::channel(false);
        Self {
            inner: Arc::new(SessionInner {
                id: Ulid::new().to_string().into(),
                model: model.into(),
                started: Instant::now(),
                state: Mutex::new(SessionState {
                    text: String::new(),
                    fragments: 0,
                    status: Status::Running,
                    elapsed: None,
                }),
                cancel,
                done,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn model(&self) -> &str {
        &self.inner.model
    }

    pub fn status(&self) -> Status {
        self.lock().status.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.lock().status.is_terminal()
    }

    /// Accumulated text so far.
    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    /// Fragments received so far.
    pub fn fragments(&self) -> usize {
        self.lock().fragments
    }

    /// Time from start to terminal state, once terminal.
    pub fn elapsed(&self) -> Option<Duration> {
        self.lock().elapsed
    }

    /// Request cancellation. Idempotent; a no-op once terminal.
    pub fn cancel(&self) {
        let _ = self.inner.cancel.send(true);
    }

    /// Wait until the session's pump has fully wound down.
    pub async fn wait(&self) {
        let mut done = self.inner.done.subscribe();
        let _ = done.wait_for(|finished| *finished).await;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.inner.state.lock().expect("session state lock poisoned")
    }

    /// Append a fragment and return the new accumulated text.
    fn append(&self, fragment: &Fragment) -> String {
        let mut state = self.lock();
        state.text.push_str(fragment.text());
        state.fragments += 1;
        state.text.clone()
    }

    /// Move to a terminal state. First terminal transition wins.
    fn finish(&self, status: Status) {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return;
        }
        state.elapsed = Some(self.inner.started.elapsed());
        state.status = status;
    }
}

/// Tracks the single active session.
#[derive(Default)]
pub struct SessionManager {
    slot: Mutex<Option<SessionHandle>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current session, running or not.
    pub fn current(&self) -> Option<SessionHandle> {
        self.slot.lock().expect("session slot lock poisoned").clone()
    }

    /// Start a session over `stream`, failing if one is already running.
    pub fn start<S>(
        &self,
        stream: S,
        model: &str,
        interval: Duration,
    ) -> Result<Generation, ChatError>
    where
        S: Stream<Item = Result<Fragment, LlmError>> + Send + 'static,
    {
        let mut slot = self.slot.lock().expect("session slot lock poisoned");
        if slot.as_ref().is_some_and(SessionHandle::is_running) {
            return Err(ChatError::AlreadyRunning);
        }

        let handle = SessionHandle::new(model);
        let (fragment_tx, fragment_rx) = mpsc::unbounded_channel();
        let (commit_tx, commit_rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(stream, handle.clone(), fragment_tx, commit_tx, interval));
        *slot = Some(handle.clone());
        tracing::info!(id = handle.id(), model = handle.model(), "session started");

        Ok(Generation {
            handle,
            fragments: fragment_rx,
            commits: Some(Commits { receiver: commit_rx }),
        })
    }

    /// Cancel the active session, if any, and wait for it to wind down.
    pub async fn cancel(&self) {
        let current = self.current();
        if let Some(handle) = current {
            handle.cancel();
            handle.wait().await;
        }
    }
}

/// Drives the provider stream: accumulates fragments, forwards them to
/// the caller, and feeds text snapshots through the coalescer.
async fn pump<S>(
    stream: S,
    handle: SessionHandle,
    fragment_tx: mpsc::UnboundedSender<Result<Fragment, LlmError>>,
    commit_tx: mpsc::UnboundedSender<Commit>,
    interval: Duration,
) where
    S: Stream<Item = Result<Fragment, LlmError>> + Send + 'static,
{
    let session = handle.clone();
    let mut cancel = handle.inner.cancel.subscribe();

    let snapshots = async_stream::stream! {
        let mut stream = std::pin::pin!(stream);
        loop {
            tokio::select! {
                biased;
                _ = async { cancel.wait_for(|cancelled| *cancelled).await.map(|_| ()) } => {
                    session.finish(Status::Cancelled);
                    tracing::info!(id = session.id(), "session cancelled");
                    break;
                }
                next = stream.next() => match next {
                    Some(Ok(fragment)) => {
                        let snapshot = session.append(&fragment);
                        let _ = fragment_tx.send(Ok(fragment));
                        yield snapshot;
                    }
                    Some(Err(error)) => {
                        tracing::warn!(id = session.id(), %error, "session failed");
                        let _ = fragment_tx.send(Err(error.clone()));
                        session.finish(Status::Failed(error));
                        break;
                    }
                    None => {
                        session.finish(Status::Completed);
                        tracing::debug!(
                            id = session.id(),
                            fragments = session.fragments(),
                            "session completed"
                        );
                        break;
                    }
                }
            }
        }
    };

    let mut commits = std::pin::pin!(coalesce(snapshots, interval));
    while let Some(commit) = commits.next().await {
        let _ = commit_tx.send(commit);
    }
    let _ = handle.inner.done.send(true);
}

/// A started generation. Stream it for raw fragments, or take
/// [`Generation::commits`] for the coalesced view, then [`finish`] it
/// for the annotated outcome.
///
/// [`finish`]: Generation::finish
pub struct Generation {
    handle: SessionHandle,
    fragments: mpsc::UnboundedReceiver<Result<Fragment, LlmError>>,
    commits: Option<Commits>,
}

impl Generation {
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Request cancellation of the underlying session.
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    /// Take the coalesced commit stream. Yields `None` after the first
    /// call.
    pub fn commits(&mut self) -> Option<Commits> {
        self.commits.take()
    }

    /// Wait for the session to end and produce its outcome.
    ///
    /// A completed session's text is annotated with a throughput footer
    /// before being returned.
    pub async fn finish(self) -> Result<Outcome, ChatError> {
        self.handle.wait().await;
        let elapsed = self.handle.elapsed().unwrap_or_default();
        match self.handle.status() {
            Status::Completed => {
                let throughput = stats::throughput(self.handle.fragments(), elapsed);
                let answer =
                    stats::annotate(&self.handle.text(), self.handle.model(), throughput);
                Ok(Outcome::Completed(Completed {
                    answer,
                    throughput,
                    fragments: self.handle.fragments(),
                    elapsed,
                }))
            }
            Status::Cancelled => Ok(Outcome::Cancelled),
            // An adapter reporting cancellation is not a failure.
            Status::Failed(error) if error.is_cancelled() => Ok(Outcome::Cancelled),
            Status::Failed(error) => Err(ChatError::Generation(error)),
            Status::Running => unreachable!("session signalled done while still running"),
        }
    }
}

impl Stream for Generation {
    type Item = Result<Fragment, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().fragments.poll_recv(cx)
    }
}

/// Coalesced commit stream of a generation.
pub struct Commits {
    receiver: mpsc::UnboundedReceiver<Commit>,
}

impl Stream for Commits {
    type Item = Commit;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

/// How a generation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Completed),
    Cancelled,
}

/// Result of a completed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Completed {
    /// Full answer text with the throughput footer appended.
    pub answer: String,
    /// Fragments per second over the session's lifetime.
    pub throughput: f64,
    pub fragments: usize,
    pub elapsed: Duration,
}
