//! Message database model (reaction columns only)

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Reaction-related columns of the messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageSummaryModel {
    pub id: String,
    pub has_reactions: bool,
    pub updated_at: DateTime<Utc>,
}
