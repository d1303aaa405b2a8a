//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Duration, Utc};
use reaction_core::{MessageSummary, Reaction};
use reaction_db::MemoryReactionRepository;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A unique id that fits the 26 character id column
pub fn unique_id(prefix: &str) -> String {
    format!("{prefix}{:0>10}", unique_suffix())
}

/// A message last updated an hour ago, with no reactions
pub fn stale_message(id: &str) -> MessageSummary {
    MessageSummary::new(id, Utc::now() - Duration::hours(1))
}

/// A reaction by a fresh user on `post_id`
pub fn reaction_on(post_id: &str, emoji_name: &str) -> Reaction {
    Reaction::new(unique_id("user"), post_id, emoji_name)
}

/// Register messages in a memory repository and return their ids
pub async fn seed_messages(repo: &MemoryReactionRepository, count: usize) -> Vec<String> {
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let id = unique_id("post");
        repo.add_message(stale_message(&id)).await;
        ids.push(id);
    }
    ids
}
