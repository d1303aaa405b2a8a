//! Store errors - failures surfaced by reaction store operations

use std::fmt;

use thiserror::Error;

/// Public store operation that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Save,
    Delete,
    GetForPost,
    DeleteAllWithEmojiName,
    EnsureIndexes,
}

impl Operation {
    /// Stable snake_case name, used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Delete => "delete",
            Self::GetForPost => "get_for_post",
            Self::DeleteAllWithEmojiName => "delete_all_with_emoji_name",
            Self::EnsureIndexes => "ensure_indexes",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by a storage backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The reaction identity triple already exists
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl StorageError {
    /// Check if this error is a primary key / unique constraint violation
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}

/// Result type for backend operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced to callers of the reaction store
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid reaction: {0}")]
    Validation(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("{op}: failed to begin transaction: {source}")]
    TransactionBegin {
        op: Operation,
        #[source]
        source: StorageError,
    },

    #[error("{op}: failed to write reactions: {source}")]
    Write {
        op: Operation,
        #[source]
        source: StorageError,
    },

    #[error("{op}: failed to update reaction flag of message {post_id}: {source}")]
    FlagRecompute {
        op: Operation,
        post_id: String,
        #[source]
        source: StorageError,
    },

    #[error("{op}: failed to commit transaction: {source}")]
    Commit {
        op: Operation,
        #[source]
        source: StorageError,
    },

    #[error("{op}: failed to read reactions: {source}")]
    Read {
        op: Operation,
        #[source]
        source: StorageError,
    },

    #[error("Failed to ensure reaction indexes: {0}")]
    Schema(#[source] StorageError),

    // =========================================================================
    // Executor Errors
    // =========================================================================
    #[error("Reaction store is unavailable")]
    Unavailable,
}

impl StoreError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "INVALID_REACTION",
            Self::TransactionBegin { .. } => "TRANSACTION_BEGIN_FAILED",
            Self::Write { .. } => "REACTION_WRITE_FAILED",
            Self::FlagRecompute { .. } => "REACTION_FLAG_UPDATE_FAILED",
            Self::Commit { .. } => "TRANSACTION_COMMIT_FAILED",
            Self::Read { .. } => "REACTION_READ_FAILED",
            Self::Schema(_) => "REACTION_INDEX_FAILED",
            Self::Unavailable => "STORE_UNAVAILABLE",
        }
    }

    /// Operation that failed, if the error came from storage
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::TransactionBegin { op, .. }
            | Self::Write { op, .. }
            | Self::FlagRecompute { op, .. }
            | Self::Commit { op, .. }
            | Self::Read { op, .. } => Some(*op),
            Self::Schema(_) => Some(Operation::EnsureIndexes),
            Self::Validation(_) | Self::Unavailable => None,
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error originated in the storage engine
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::TransactionBegin { .. }
                | Self::Write { .. }
                | Self::FlagRecompute { .. }
                | Self::Commit { .. }
                | Self::Read { .. }
                | Self::Schema(_)
        )
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
