//! Error handling utilities for repositories

use reaction_core::StorageError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to StorageError
///
/// Unique violations are kept distinct so callers can treat a repeated
/// insert of the same reaction as a no-op.
pub fn map_db_error(e: SqlxError) -> StorageError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            return StorageError::UniqueViolation(constraint);
        }
    }
    StorageError::Database(e.to_string())
}
