//! Commit coalescing.
//!
//! Fragments can arrive far faster than any consumer wants to repaint.
//! [`coalesce`] turns a stream of accumulated-text snapshots into a
//! stream of commits spaced at least one interval apart, where each
//! commit carries the newest snapshot seen so far. A fresh snapshot
//! replaces the pending one, so a burst of fragments costs one commit.

use async_stream::stream;
use futures_core::Stream;
use futures_util::StreamExt;
use std::time::Duration;

/// One coalesced text commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full accumulated text at the time of the commit.
    pub text: String,
    /// Set on the single final commit emitted when the session ends.
    pub last: bool,
}

/// Coalesce `snapshots` into commits at most one per `interval`.
///
/// The first snapshot commits immediately. When `snapshots` ends, exactly
/// one final commit is emitted without waiting for the interval; it
/// carries the newest snapshot, or an empty string if none ever arrived.
pub fn coalesce(
    snapshots: impl Stream<Item = String>,
    interval: Duration,
) -> impl Stream<Item = Commit> {
    stream! {
        let mut snapshots = std::pin::pin!(snapshots);
        let mut pending: Option<String> = None;
        let mut committed = String::new();
        let gate = tokio::time::sleep(Duration::ZERO);
        let mut gate = std::pin::pin!(gate);

        loop {
            tokio::select! {
                next = snapshots.next() => match next {
                    Some(snapshot) => pending = Some(snapshot),
                    None => break,
                },
                _ = gate.as_mut(), if pending.is_some() => {
                    if let Some(text) = pending.take() {
                        committed.clone_from(&text);
                        gate.as_mut().reset(tokio::time::Instant::now() + interval);
                        yield Commit { text, last: false };
                    }
                }
            }
        }

        let text = pending.unwrap_or(committed);
        yield Commit { text, last: true };
    }
}
