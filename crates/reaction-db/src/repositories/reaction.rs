//! PostgreSQL implementation of ReactionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use reaction_core::traits::{ReactionRepository, ReactionTransaction};
use reaction_core::{MessageSummary, Reaction, StorageResult};

use crate::models::{MessageSummaryModel, ReactionModel};
use crate::schema;

use super::error::map_db_error;

/// Sets `has_reactions` from the current row count; bumps `updated_at` only
/// when the flag flips. Right-hand sides see the pre-update row.
const REFRESH_POST_FLAG_QUERY: &str = r#"
    UPDATE messages
    SET updated_at = CASE
            WHEN has_reactions != (SELECT COUNT(*) > 0 FROM reactions WHERE post_id = $1) THEN $2
            ELSE updated_at
        END,
        has_reactions = (SELECT COUNT(*) > 0 FROM reactions WHERE post_id = $1)
    WHERE id = $1
"#;

/// PostgreSQL implementation of ReactionRepository
///
/// Writes go to `primary`; message reads go to `replica`.
#[derive(Clone)]
pub struct PgReactionRepository {
    primary: PgPool,
    replica: PgPool,
}

impl PgReactionRepository {
    /// Create a new PgReactionRepository
    pub fn new(primary: PgPool, replica: PgPool) -> Self {
        Self { primary, replica }
    }

    /// Create a repository that reads and writes through one pool
    pub fn single(pool: PgPool) -> Self {
        Self {
            primary: pool.clone(),
            replica: pool,
        }
    }
}

/// Open transaction on the primary pool
pub struct PgReactionTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ReactionTransaction for PgReactionTransaction {
    #[instrument(skip(self))]
    async fn insert(&mut self, reaction: &Reaction) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reactions (user_id, post_id, emoji_name, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&reaction.user_id)
        .bind(&reaction.post_id)
        .bind(&reaction.emoji_name)
        .bind(reaction.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&mut self, reaction: &Reaction) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM reactions
            WHERE post_id = $1 AND user_id = $2 AND emoji_name = $3
            "#,
        )
        .bind(&reaction.post_id)
        .bind(&reaction.user_id)
        .bind(&reaction.emoji_name)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn refresh_post_flag(&mut self, post_id: &str, now: DateTime<Utc>) -> StorageResult<()> {
        sqlx::query(REFRESH_POST_FLAG_QUERY)
            .bind(post_id)
            .bind(now)
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    async fn commit(self) -> StorageResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }

    async fn rollback(self) -> StorageResult<()> {
        self.tx.rollback().await.map_err(map_db_error)
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    type Tx = PgReactionTransaction;

    async fn begin(&self) -> StorageResult<Self::Tx> {
        let tx = self.primary.begin().await.map_err(map_db_error)?;
        Ok(PgReactionTransaction { tx })
    }

    #[instrument(skip(self))]
    async fn reactions_for_post(&self, post_id: &str) -> StorageResult<Vec<Reaction>> {
        let results = sqlx::query_as::<_, ReactionModel>(
            r#"
            SELECT user_id, post_id, emoji_name, created_at
            FROM reactions
            WHERE post_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.replica)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Reaction::from).collect())
    }

    #[instrument(skip(self))]
    async fn reactions_with_emoji(&self, emoji_name: &str) -> StorageResult<Vec<Reaction>> {
        // Read from the primary: a lagging replica could hide messages whose
        // flag must be recomputed after the delete.
        let results = sqlx::query_as::<_, ReactionModel>(
            r#"
            SELECT user_id, post_id, emoji_name, created_at
            FROM reactions
            WHERE emoji_name = $1
            "#,
        )
        .bind(emoji_name)
        .fetch_all(&self.primary)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Reaction::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete_with_emoji(&self, emoji_name: &str) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM reactions WHERE emoji_name = $1
            "#,
        )
        .bind(emoji_name)
        .execute(&self.primary)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn refresh_post_flag(&self, post_id: &str, now: DateTime<Utc>) -> StorageResult<()> {
        sqlx::query(REFRESH_POST_FLAG_QUERY)
            .bind(post_id)
            .bind(now)
            .execute(&self.primary)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn message_summary(&self, post_id: &str) -> StorageResult<Option<MessageSummary>> {
        let result = sqlx::query_as::<_, MessageSummaryModel>(
            r#"
            SELECT id, has_reactions, updated_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.primary)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(MessageSummary::from))
    }

    async fn ensure_indexes(&self) -> StorageResult<()> {
        schema::ensure_indexes(&self.primary).await
    }
}
