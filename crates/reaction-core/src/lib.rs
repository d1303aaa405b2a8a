//! # reaction-core
//!
//! Domain layer for message reactions: entities, error taxonomy, and the
//! storage and metrics ports implemented by infrastructure crates.
//! This crate has zero dependencies on infrastructure (database, runtime, etc.).

pub mod entities;
pub mod error;
pub mod traits;

// Re-export commonly used types at crate root
pub use entities::{MessageSummary, Reaction, EMOJI_NAME_MAX_LEN, ID_MAX_LEN};
pub use error::{Operation, StorageError, StorageResult, StoreError, StoreResult};
pub use traits::{
    CacheMetrics, NoopMetrics, ReactionRepository, ReactionTransaction, REACTIONS_CACHE_LABEL,
};
