//! Message summary - the reaction-related columns of a message

use chrono::{DateTime, Utc};

/// Denormalized reaction state of a message
///
/// Messages are owned by another store; reaction writes only maintain
/// `has_reactions` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: String,
    pub has_reactions: bool,
    pub updated_at: DateTime<Utc>,
}

impl MessageSummary {
    /// Create a summary for a message without reactions
    pub fn new(id: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            has_reactions: false,
            updated_at,
        }
    }
}
