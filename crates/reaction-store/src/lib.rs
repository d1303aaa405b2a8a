//! # reaction-store
//!
//! Data-access layer for message reactions.
//!
//! ## Overview
//!
//! - **Transactional writes**: saving or deleting a reaction and recomputing
//!   the parent message's `has_reactions` flag happen in one transaction
//! - **Idempotent saves**: saving an existing reaction succeeds without change
//! - **Cached reads**: reactions per message are served from an expiring LRU cache
//! - **Bulk maintenance**: removing an emoji everywhere favours progress over
//!   atomicity
//!
//! Every operation runs on a bounded task pool and returns a [`StoreChannel`]
//! that resolves exactly once.
//!
//! ## Example
//!
//! ```ignore
//! use reaction_store::ReactionStore;
//!
//! let store = ReactionStore::builder(repository).build()?;
//! let saved = store.save(Reaction::new(user_id, post_id, "smile")).await?;
//! let reactions = store.get_for_post(post_id, true).await?;
//! ```

mod bulk;
mod executor;
mod reader;
mod store;
mod writer;

pub use bulk::{BulkDeleteReport, BulkPhase};
pub use executor::{StoreChannel, TaskPool};
pub use store::{ReactionStore, ReactionStoreBuilder};

pub use reaction_cache::{CacheConfigError, CacheStats, CachedReactions};
