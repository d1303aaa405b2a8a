//! Cached read path for the reactions of a message

use std::sync::Arc;

use tracing::trace;

use reaction_cache::{CachedReactions, ReactionCache};
use reaction_core::traits::ReactionRepository;
use reaction_core::{CacheMetrics, Operation, StoreError, StoreResult, REACTIONS_CACHE_LABEL};

/// Load the reactions of a message, ordered by creation time
///
/// With `allow_cache` a live cache entry is returned as is. Otherwise, or
/// on a miss, the repository is queried and the cache entry replaced; a
/// failed query leaves the cache untouched.
pub(crate) async fn reactions_for_post<R: ReactionRepository>(
    repo: &R,
    cache: &ReactionCache,
    metrics: &dyn CacheMetrics,
    post_id: &str,
    allow_cache: bool,
) -> StoreResult<CachedReactions> {
    if allow_cache {
        if let Some(cached) = cache.get(post_id) {
            metrics.increment_cache_hit(REACTIONS_CACHE_LABEL);
            trace!(post_id, "Reactions served from cache");
            return Ok(cached);
        }
    } else {
        cache.record_bypass();
    }
    metrics.increment_cache_miss(REACTIONS_CACHE_LABEL);

    let reactions: CachedReactions = repo
        .reactions_for_post(post_id)
        .await
        .map_err(|source| StoreError::Read {
            op: Operation::GetForPost,
            source,
        })?
        .into();

    cache.put(post_id, Arc::clone(&reactions));
    Ok(reactions)
}
