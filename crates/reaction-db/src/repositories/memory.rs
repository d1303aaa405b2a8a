//! In-memory implementation of ReactionRepository
//!
//! Transactions are serializable: `begin` takes an exclusive lock on the
//! whole state and works on a staged copy that `commit` swaps in. Failures
//! can be injected per statement to exercise error paths.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use reaction_core::traits::{ReactionRepository, ReactionTransaction};
use reaction_core::{MessageSummary, Reaction, StorageError, StorageResult};

use crate::schema::REACTION_INDEXES;

/// Statement that can be forced to fail
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Begin,
    Insert,
    Delete,
    /// Flag recomputation of one message, in or outside a transaction
    RefreshFlag(String),
    Commit,
    ReadForPost,
    ReadWithEmoji,
    DeleteWithEmoji,
    EnsureIndexes,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    /// Rows in insertion order
    reactions: Vec<Reaction>,
    messages: HashMap<String, MessageSummary>,
    indexes: BTreeSet<&'static str>,
}

impl MemoryState {
    fn refresh_post_flag(&mut self, post_id: &str, now: DateTime<Utc>) {
        let has_reactions = self.reactions.iter().any(|r| r.post_id == post_id);
        if let Some(message) = self.messages.get_mut(post_id) {
            if message.has_reactions != has_reactions {
                message.has_reactions = has_reactions;
                message.updated_at = now;
            }
        }
    }
}

struct Shared {
    state: Arc<AsyncMutex<MemoryState>>,
    failures: Mutex<Vec<FailPoint>>,
    post_reads: AtomicU64,
}

impl Shared {
    fn check(&self, point: &FailPoint) -> StorageResult<()> {
        if self.failures.lock().contains(point) {
            return Err(StorageError::Database(format!("injected failure: {point:?}")));
        }
        Ok(())
    }
}

/// In-memory reaction repository
///
/// Cloning yields another handle to the same data.
#[derive(Clone)]
pub struct MemoryReactionRepository {
    shared: Arc<Shared>,
}

impl Default for MemoryReactionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryReactionRepository {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Arc::new(AsyncMutex::new(MemoryState::default())),
                failures: Mutex::new(Vec::new()),
                post_reads: AtomicU64::new(0),
            }),
        }
    }

    /// Register a message so flag recomputation has a row to update
    pub async fn add_message(&self, message: MessageSummary) {
        let mut state = self.shared.state.lock().await;
        state.messages.insert(message.id.clone(), message);
    }

    /// Snapshot of every stored reaction, in insertion order
    pub async fn reactions(&self) -> Vec<Reaction> {
        self.shared.state.lock().await.reactions.clone()
    }

    /// Names of the indexes created so far
    pub async fn indexes(&self) -> Vec<&'static str> {
        self.shared.state.lock().await.indexes.iter().copied().collect()
    }

    /// Make every future execution of `point` fail
    pub fn fail(&self, point: FailPoint) {
        let mut failures = self.shared.failures.lock();
        if !failures.contains(&point) {
            failures.push(point);
        }
    }

    pub fn clear_failures(&self) {
        self.shared.failures.lock().clear();
    }

    /// Number of `reactions_for_post` queries served so far
    pub fn post_reads(&self) -> u64 {
        self.shared.post_reads.load(Ordering::SeqCst)
    }
}

/// Serializable transaction over the in-memory state
pub struct MemoryReactionTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    shared: Arc<Shared>,
}

#[async_trait]
impl ReactionTransaction for MemoryReactionTransaction {
    async fn insert(&mut self, reaction: &Reaction) -> StorageResult<()> {
        self.shared.check(&FailPoint::Insert)?;

        if self.staged.reactions.iter().any(|r| r.same_identity(reaction)) {
            return Err(StorageError::UniqueViolation("reactions_pkey".to_string()));
        }
        self.staged.reactions.push(reaction.clone());
        Ok(())
    }

    async fn delete(&mut self, reaction: &Reaction) -> StorageResult<u64> {
        self.shared.check(&FailPoint::Delete)?;

        let before = self.staged.reactions.len();
        self.staged.reactions.retain(|r| !r.same_identity(reaction));
        Ok((before - self.staged.reactions.len()) as u64)
    }

    async fn refresh_post_flag(&mut self, post_id: &str, now: DateTime<Utc>) -> StorageResult<()> {
        self.shared.check(&FailPoint::RefreshFlag(post_id.to_string()))?;

        self.staged.refresh_post_flag(post_id, now);
        Ok(())
    }

    async fn commit(self) -> StorageResult<()> {
        self.shared.check(&FailPoint::Commit)?;

        let MemoryReactionTransaction { mut guard, staged, .. } = self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> StorageResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ReactionRepository for MemoryReactionRepository {
    type Tx = MemoryReactionTransaction;

    async fn begin(&self) -> StorageResult<Self::Tx> {
        self.shared.check(&FailPoint::Begin)?;

        let guard = Arc::clone(&self.shared.state).lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryReactionTransaction {
            guard,
            staged,
            shared: Arc::clone(&self.shared),
        })
    }

    async fn reactions_for_post(&self, post_id: &str) -> StorageResult<Vec<Reaction>> {
        self.shared.post_reads.fetch_add(1, Ordering::SeqCst);
        self.shared.check(&FailPoint::ReadForPost)?;

        let state = self.shared.state.lock().await;
        let mut reactions: Vec<Reaction> = state
            .reactions
            .iter()
            .filter(|r| r.post_id == post_id)
            .cloned()
            .collect();
        reactions.sort_by_key(|r| r.created_at);
        Ok(reactions)
    }

    async fn reactions_with_emoji(&self, emoji_name: &str) -> StorageResult<Vec<Reaction>> {
        self.shared.check(&FailPoint::ReadWithEmoji)?;

        let state = self.shared.state.lock().await;
        Ok(state
            .reactions
            .iter()
            .filter(|r| r.is_emoji(emoji_name))
            .cloned()
            .collect())
    }

    async fn delete_with_emoji(&self, emoji_name: &str) -> StorageResult<u64> {
        self.shared.check(&FailPoint::DeleteWithEmoji)?;

        let mut state = self.shared.state.lock().await;
        let before = state.reactions.len();
        state.reactions.retain(|r| !r.is_emoji(emoji_name));
        Ok((before - state.reactions.len()) as u64)
    }

    async fn refresh_post_flag(&self, post_id: &str, now: DateTime<Utc>) -> StorageResult<()> {
        self.shared.check(&FailPoint::RefreshFlag(post_id.to_string()))?;

        self.shared.state.lock().await.refresh_post_flag(post_id, now);
        Ok(())
    }

    async fn message_summary(&self, post_id: &str) -> StorageResult<Option<MessageSummary>> {
        Ok(self.shared.state.lock().await.messages.get(post_id).cloned())
    }

    async fn ensure_indexes(&self) -> StorageResult<()> {
        self.shared.check(&FailPoint::EnsureIndexes)?;

        let mut state = self.shared.state.lock().await;
        state
            .indexes
            .extend(REACTION_INDEXES.iter().map(|(name, _)| *name));
        Ok(())
    }
}
