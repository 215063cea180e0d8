//! Conversation history access.
//!
//! The engine reads prior turns through the [`TurnStore`] trait and never
//! touches a concrete backend directly. [`InMemoryStore`] is the bundled
//! implementation, useful for tests and ephemeral sessions.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use llm::Image;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

/// One completed question/answer exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub question: String,
    pub answer: String,
    /// Model that produced the answer.
    pub engine: CompactString,
    pub created_at: DateTime<Utc>,
}

/// A turn being persisted.
#[derive(Debug, Clone, Copy)]
pub struct NewTurn<'a> {
    pub conversation: &'a str,
    /// Instruction in effect when the answer was generated.
    pub instruction: &'a str,
    pub question: &'a str,
    pub answer: &'a str,
    pub image: Option<&'a Image>,
    pub engine: &'a str,
}

/// History store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The conversation does not exist.
    #[error("conversation not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Storage backend for conversation turns.
pub trait TurnStore: Send + Sync {
    /// The most recent `limit` turns of a conversation, oldest first.
    fn recent_turns(
        &self,
        conversation: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Turn>, StoreError>> + Send;

    /// Persist a completed turn, returning its id.
    fn append_turn(&self, turn: NewTurn<'_>) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Delete a turn by id.
    fn delete_turn(&self, id: i64) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Fetches prompt context from a [`TurnStore`].
///
/// A missing conversation is an empty one, not an error. Stores are
/// trusted to honor the limit, but the depth is re-clamped here so an
/// over-returning backend cannot blow the prompt budget's assumptions.
pub struct HistoryFetcher<'a, S> {
    store: &'a S,
    depth: usize,
}

impl<'a, S: TurnStore> HistoryFetcher<'a, S> {
    pub fn new(store: &'a S, depth: usize) -> Self {
        Self { store, depth }
    }

    /// The newest `depth` turns of `conversation`, oldest first.
    pub async fn recent(&self, conversation: &str) -> Result<Vec<Turn>, StoreError> {
        match self.store.recent_turns(conversation, self.depth).await {
            Ok(mut turns) => {
                if turns.len() > self.depth {
                    turns.drain(..turns.len() - self.depth);
                }
                Ok(turns)
            }
            Err(StoreError::NotFound) => Ok(Vec::new()),
            Err(other) => Err(other),
        }
    }
}

/// A stored turn with its id.
#[derive(Debug, Clone)]
struct StoredTurn {
    id: i64,
    instruction: String,
    question: String,
    answer: String,
    image_base64: Option<String>,
    engine: CompactString,
    created_at: DateTime<Utc>,
}

/// In-memory store backed by a map of conversation name to turn list.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    conversations: Mutex<BTreeMap<String, Vec<StoredTurn>>>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of turns stored for a conversation, if it exists.
    pub fn len(&self, conversation: &str) -> Option<usize> {
        self.conversations
            .lock()
            .expect("conversation lock poisoned")
            .get(conversation)
            .map(Vec::len)
    }
}

impl TurnStore for InMemoryStore {
    async fn recent_turns(&self, conversation: &str, limit: usize) -> Result<Vec<Turn>, StoreError> {
        let conversations = self
            .conversations
            .lock()
            .expect("conversation lock poisoned");
        let turns = conversations.get(conversation).ok_or(StoreError::NotFound)?;
        let skip = turns.len().saturating_sub(limit);
        Ok(turns[skip..]
            .iter()
            .map(|stored| Turn {
                question: stored.question.clone(),
                answer: stored.answer.clone(),
                engine: stored.engine.clone(),
                created_at: stored.created_at,
            })
            .collect())
    }

    async fn append_turn(&self, turn: NewTurn<'_>) -> Result<i64, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let stored = StoredTurn {
            id,
            instruction: turn.instruction.to_string(),
            question: turn.question.to_string(),
            answer: turn.answer.to_string(),
            image_base64: turn.image.map(Image::to_base64),
            engine: turn.engine.into(),
            created_at: Utc::now(),
        };
        self.conversations
            .lock()
            .expect("conversation lock poisoned")
            .entry(turn.conversation.to_string())
            .or_default()
            .push(stored);
        Ok(id)
    }

    async fn delete_turn(&self, id: i64) -> Result<(), StoreError> {
        let mut conversations = self
            .conversations
            .lock()
            .expect("conversation lock poisoned");
        for turns in conversations.values_mut() {
            if let Some(idx) = turns.iter().position(|t| t.id == id) {
                turns.remove(idx);
                return Ok(());
            }
        }
        Err(StoreError::NotFound)
    }
}
