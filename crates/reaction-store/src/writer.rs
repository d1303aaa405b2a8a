//! Transactional writer: single-reaction save and delete
//!
//! The row change and the parent message's flag recomputation always share
//! one transaction, so `has_reactions` can never disagree with the rows.

use chrono::Utc;
use tracing::{debug, warn};

use reaction_core::traits::{ReactionRepository, ReactionTransaction};
use reaction_core::{Operation, Reaction, StoreError, StoreResult};

/// What a successful save did to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveOutcome {
    Inserted,
    /// The triple already existed; nothing changed
    AlreadyExists,
}

/// Persist a reaction and recompute its message's flag
///
/// `reaction` is stamped and validated first; validation failures never
/// reach storage.
pub(crate) async fn save_reaction<R: ReactionRepository>(
    repo: &R,
    reaction: &mut Reaction,
) -> StoreResult<SaveOutcome> {
    let op = Operation::Save;

    reaction.pre_save();
    reaction.is_valid()?;

    let mut tx = repo
        .begin()
        .await
        .map_err(|source| StoreError::TransactionBegin { op, source })?;

    if let Err(source) = tx.insert(reaction).await {
        rollback(tx, op).await;

        if source.is_unique_violation() {
            debug!(
                post_id = %reaction.post_id,
                user_id = %reaction.user_id,
                emoji_name = %reaction.emoji_name,
                "Reaction already exists"
            );
            return Ok(SaveOutcome::AlreadyExists);
        }
        return Err(StoreError::Write { op, source });
    }

    if let Err(source) = tx.refresh_post_flag(&reaction.post_id, Utc::now()).await {
        rollback(tx, op).await;
        return Err(StoreError::FlagRecompute {
            op,
            post_id: reaction.post_id.clone(),
            source,
        });
    }

    // A failed commit already ended the transaction.
    tx.commit()
        .await
        .map_err(|source| StoreError::Commit { op, source })?;

    Ok(SaveOutcome::Inserted)
}

/// Delete one reaction and recompute its message's flag
///
/// Deleting a reaction that does not exist succeeds; the flag is still
/// recomputed. Returns the number of rows removed.
pub(crate) async fn delete_reaction<R: ReactionRepository>(
    repo: &R,
    reaction: &Reaction,
) -> StoreResult<u64> {
    let op = Operation::Delete;

    let mut tx = repo
        .begin()
        .await
        .map_err(|source| StoreError::TransactionBegin { op, source })?;

    let removed = match tx.delete(reaction).await {
        Ok(removed) => removed,
        Err(source) => {
            rollback(tx, op).await;
            return Err(StoreError::Write { op, source });
        }
    };

    if let Err(source) = tx.refresh_post_flag(&reaction.post_id, Utc::now()).await {
        rollback(tx, op).await;
        return Err(StoreError::FlagRecompute {
            op,
            post_id: reaction.post_id.clone(),
            source,
        });
    }

    tx.commit()
        .await
        .map_err(|source| StoreError::Commit { op, source })?;

    Ok(removed)
}

async fn rollback<T: ReactionTransaction>(tx: T, op: Operation) {
    if let Err(e) = tx.rollback().await {
        warn!(op = %op, error = %e, "Failed to roll back reaction transaction");
    }
}
