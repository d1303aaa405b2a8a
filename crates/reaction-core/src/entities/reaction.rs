//! Reaction entity - a user's emoji annotation on a message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::StoreError;

/// Maximum length of user and message ids
pub const ID_MAX_LEN: usize = 26;

/// Maximum length of an emoji name
pub const EMOJI_NAME_MAX_LEN: usize = 64;

/// Reaction entity
///
/// Identified by the `(user_id, post_id, emoji_name)` triple. There is no
/// surrogate key; `created_at` only orders reactions on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Reaction {
    #[validate(length(min = 1, max = 26, message = "user_id must be 1-26 characters"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 26, message = "post_id must be 1-26 characters"))]
    pub post_id: String,
    #[validate(length(min = 1, max = 64, message = "emoji_name must be 1-64 characters"))]
    pub emoji_name: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    /// Create a new Reaction
    pub fn new(
        user_id: impl Into<String>,
        post_id: impl Into<String>,
        emoji_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            post_id: post_id.into(),
            emoji_name: emoji_name.into(),
            created_at: Utc::now(),
        }
    }

    /// Assign server-controlled fields before persisting
    pub fn pre_save(&mut self) {
        self.created_at = Utc::now();
    }

    /// Check structural constraints on the identity fields
    pub fn is_valid(&self) -> Result<(), StoreError> {
        self.validate()
            .map_err(|e| StoreError::Validation(e.to_string()))
    }

    /// Check if this reaction has the same identity triple as `other`
    #[inline]
    pub fn same_identity(&self, other: &Reaction) -> bool {
        self.user_id == other.user_id
            && self.post_id == other.post_id
            && self.emoji_name == other.emoji_name
    }

    /// Check if reaction uses a specific emoji
    #[inline]
    pub fn is_emoji(&self, emoji_name: &str) -> bool {
        self.emoji_name == emoji_name
    }
}
