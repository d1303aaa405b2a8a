//! Reaction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub user_id: String,
    pub post_id: String,
    pub emoji_name: String,
    pub created_at: DateTime<Utc>,
}
