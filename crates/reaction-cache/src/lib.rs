//! # reaction-cache
//!
//! In-process cache of the reactions attached to each message.
//!
//! ## Features
//!
//! - **Bounded**: least-recently-used entries are evicted once capacity is reached
//! - **Expiring**: entries become stale a fixed duration after insertion
//! - **Shared**: safe for concurrent use from many tasks
//!
//! ## Example
//!
//! ```ignore
//! use reaction_cache::ReactionCache;
//!
//! let cache = ReactionCache::new(20_000, Duration::from_secs(1800))?;
//! cache.put("post1", reactions.into());
//! let cached = cache.get("post1");
//! cache.remove("post1");
//! ```

mod reaction_cache;

pub use reaction_cache::{CacheConfigError, CacheStats, CachedReactions, ReactionCache, MAX_TTL};
