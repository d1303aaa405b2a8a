//! Schema helpers for the reactions table
//!
//! Table registration belongs to the owning application's migrations;
//! `create_tables` exists so tests and local setups can bootstrap a database.

use sqlx::PgPool;
use tracing::{debug, instrument};

use reaction_core::StorageResult;

use crate::repositories::map_db_error;

/// Secondary indexes on the reactions table as `(name, column)`
pub const REACTION_INDEXES: [(&str, &str); 3] = [
    ("idx_reactions_post_id", "post_id"),
    ("idx_reactions_user_id", "user_id"),
    ("idx_reactions_emoji_name", "emoji_name"),
];

/// Create the reactions indexes if they do not exist yet
#[instrument(skip(pool))]
pub async fn ensure_indexes(pool: &PgPool) -> StorageResult<()> {
    for (name, column) in REACTION_INDEXES {
        let statement = format!("CREATE INDEX IF NOT EXISTS {name} ON reactions ({column})");
        sqlx::query(&statement)
            .execute(pool)
            .await
            .map_err(map_db_error)?;
        debug!(index = name, "Ensured reaction index");
    }

    Ok(())
}

/// Create the messages and reactions tables if they do not exist yet
pub async fn create_tables(pool: &PgPool) -> StorageResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id VARCHAR(26) PRIMARY KEY,
            has_reactions BOOLEAN NOT NULL DEFAULT FALSE,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(map_db_error)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reactions (
            user_id VARCHAR(26) NOT NULL,
            post_id VARCHAR(26) NOT NULL,
            emoji_name VARCHAR(64) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            PRIMARY KEY (user_id, post_id, emoji_name)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(map_db_error)?;

    Ok(())
}
