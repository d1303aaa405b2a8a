//! Repository traits (ports) - define the interface for reaction storage
//!
//! The store drives its writes through these traits so the transaction
//! boundaries stay in one place regardless of the storage engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{MessageSummary, Reaction};
use crate::error::StorageResult;

/// An open transaction on the primary store
///
/// Consumed by `commit` or `rollback`. Dropping it without either must
/// leave the store unchanged.
#[async_trait]
pub trait ReactionTransaction: Send {
    /// Insert a reaction row
    ///
    /// Returns `StorageError::UniqueViolation` if the triple already exists.
    async fn insert(&mut self, reaction: &Reaction) -> StorageResult<()>;

    /// Delete the row matching the reaction's identity triple
    ///
    /// Returns the number of rows removed (zero or one).
    async fn delete(&mut self, reaction: &Reaction) -> StorageResult<u64>;

    /// Recompute `has_reactions` for a message inside this transaction
    ///
    /// `updated_at` is set to `now` only if the flag changes value.
    async fn refresh_post_flag(&mut self, post_id: &str, now: DateTime<Utc>) -> StorageResult<()>;

    /// Commit the transaction
    async fn commit(self) -> StorageResult<()>;

    /// Roll back the transaction
    async fn rollback(self) -> StorageResult<()>;
}

/// Reaction storage, including the reaction columns of messages
#[async_trait]
pub trait ReactionRepository: Send + Sync + 'static {
    type Tx: ReactionTransaction + 'static;

    /// Begin a transaction on the primary
    async fn begin(&self) -> StorageResult<Self::Tx>;

    /// All reactions of a message ordered by `created_at` ascending
    ///
    /// May be served by a lagging replica.
    async fn reactions_for_post(&self, post_id: &str) -> StorageResult<Vec<Reaction>>;

    /// All reactions using an emoji, read outside any transaction
    async fn reactions_with_emoji(&self, emoji_name: &str) -> StorageResult<Vec<Reaction>>;

    /// Delete every reaction using an emoji in a single statement
    ///
    /// Returns the number of rows removed.
    async fn delete_with_emoji(&self, emoji_name: &str) -> StorageResult<u64>;

    /// Recompute `has_reactions` for a message as a standalone write
    async fn refresh_post_flag(&self, post_id: &str, now: DateTime<Utc>) -> StorageResult<()>;

    /// Load the reaction columns of a message
    async fn message_summary(&self, post_id: &str) -> StorageResult<Option<MessageSummary>>;

    /// Create the secondary indexes on the reactions table if missing
    async fn ensure_indexes(&self) -> StorageResult<()>;
}
