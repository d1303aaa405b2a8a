//! Reaction store facade
//!
//! Every public operation is spawned on the store's [`TaskPool`] and returns
//! a [`StoreChannel`] immediately.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use reaction_cache::{CacheConfigError, CacheStats, CachedReactions, ReactionCache};
use reaction_common::{CacheSettings, ExecutorSettings, StoreSettings};
use reaction_core::traits::ReactionRepository;
use reaction_core::{CacheMetrics, NoopMetrics, Operation, Reaction, StoreError};

use crate::bulk::{BulkDeleteReport, BulkDeletion};
use crate::executor::{StoreChannel, TaskPool};
use crate::reader;
use crate::writer::{self, SaveOutcome};

struct StoreInner<R> {
    repo: R,
    cache: ReactionCache,
    metrics: Arc<dyn CacheMetrics>,
}

impl<R> StoreInner<R> {
    fn invalidate(&self, post_id: &str) {
        if self.cache.remove(post_id) {
            debug!(post_id, "Invalidated reaction cache entry");
        }
    }
}

/// Asynchronous data-access layer for reactions
///
/// Successful writes invalidate the cache entries of the messages they
/// touched, so later cached reads reload from storage. A read that raced
/// with a write may still repopulate the cache with the older rows; such
/// an entry lives until its TTL expires.
pub struct ReactionStore<R: ReactionRepository> {
    inner: Arc<StoreInner<R>>,
    tasks: TaskPool,
}

impl<R: ReactionRepository> Clone for ReactionStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            tasks: self.tasks.clone(),
        }
    }
}

impl<R: ReactionRepository> ReactionStore<R> {
    /// Start building a store around a repository
    pub fn builder(repo: R) -> ReactionStoreBuilder<R> {
        ReactionStoreBuilder::new(repo)
    }

    /// Save a reaction, recomputing its message's flag in the same transaction
    ///
    /// Saving a reaction that already exists succeeds and changes nothing.
    /// Resolves to the reaction as stamped for persistence.
    pub fn save(&self, reaction: Reaction) -> StoreChannel<Reaction> {
        let inner = Arc::clone(&self.inner);

        self.tasks.spawn(Operation::Save, async move {
            let mut reaction = reaction;
            let outcome = writer::save_reaction(&inner.repo, &mut reaction).await?;

            if outcome == SaveOutcome::Inserted {
                inner.invalidate(&reaction.post_id);
                info!(
                    post_id = %reaction.post_id,
                    user_id = %reaction.user_id,
                    emoji_name = %reaction.emoji_name,
                    "Reaction added"
                );
            }
            Ok(reaction)
        })
    }

    /// Delete a reaction, recomputing its message's flag in the same transaction
    ///
    /// Deleting a reaction that does not exist is not an error.
    pub fn delete(&self, reaction: Reaction) -> StoreChannel<Reaction> {
        let inner = Arc::clone(&self.inner);

        self.tasks.spawn(Operation::Delete, async move {
            let removed = writer::delete_reaction(&inner.repo, &reaction).await?;

            inner.invalidate(&reaction.post_id);
            info!(
                post_id = %reaction.post_id,
                user_id = %reaction.user_id,
                emoji_name = %reaction.emoji_name,
                removed,
                "Reaction removed"
            );
            Ok(reaction)
        })
    }

    /// Reactions of a message ordered by creation time
    ///
    /// `allow_cache = false` always queries storage (and refreshes the cache).
    pub fn get_for_post(
        &self,
        post_id: impl Into<String>,
        allow_cache: bool,
    ) -> StoreChannel<CachedReactions> {
        let inner = Arc::clone(&self.inner);
        let post_id = post_id.into();

        self.tasks.spawn(Operation::GetForPost, async move {
            reader::reactions_for_post(
                &inner.repo,
                &inner.cache,
                inner.metrics.as_ref(),
                &post_id,
                allow_cache,
            )
            .await
        })
    }

    /// Delete every reaction using an emoji, across all messages
    ///
    /// Not atomic: once the rows are deleted the operation succeeds even if
    /// some messages' flags could not be recomputed. Those are listed in
    /// [`BulkDeleteReport::failed_posts`].
    pub fn delete_all_with_emoji_name(
        &self,
        emoji_name: impl Into<String>,
    ) -> StoreChannel<BulkDeleteReport> {
        let inner = Arc::clone(&self.inner);
        let emoji_name = emoji_name.into();

        self.tasks
            .spawn(Operation::DeleteAllWithEmojiName, async move {
                let report = BulkDeletion::new(&inner.repo, &emoji_name).run().await?;

                for post_id in &report.affected_posts {
                    inner.invalidate(post_id);
                }
                Ok(report)
            })
    }

    /// Create the reactions table's secondary indexes if missing
    pub fn ensure_indexes(&self) -> StoreChannel<()> {
        let inner = Arc::clone(&self.inner);

        self.tasks.spawn(Operation::EnsureIndexes, async move {
            inner.repo.ensure_indexes().await.map_err(StoreError::Schema)
        })
    }

    /// Drop the cached reactions of one message
    pub fn invalidate_cache_for_post(&self, post_id: &str) {
        self.inner.invalidate(post_id);
    }

    /// Drop every cached entry
    pub fn invalidate_cache(&self) {
        self.inner.cache.purge();
        debug!("Purged reaction cache");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    pub fn repository(&self) -> &R {
        &self.inner.repo
    }

    /// Stop accepting operations; pending and later calls resolve to
    /// `StoreError::Unavailable`
    pub fn close(&self) {
        self.tasks.close();
    }
}

/// Builder for [`ReactionStore`]
pub struct ReactionStoreBuilder<R> {
    repo: R,
    cache_capacity: usize,
    cache_ttl: Duration,
    max_in_flight: usize,
    metrics: Option<Arc<dyn CacheMetrics>>,
}

impl<R: ReactionRepository> ReactionStoreBuilder<R> {
    fn new(repo: R) -> Self {
        let cache = CacheSettings::default();
        let executor = ExecutorSettings::default();

        Self {
            repo,
            cache_capacity: cache.capacity,
            cache_ttl: cache.ttl(),
            max_in_flight: executor.max_in_flight,
            metrics: None,
        }
    }

    /// Apply cache and executor settings loaded from configuration
    pub fn settings(self, settings: &StoreSettings) -> Self {
        self.cache_settings(&settings.cache)
            .max_in_flight(settings.executor.max_in_flight)
    }

    pub fn cache_settings(mut self, settings: &CacheSettings) -> Self {
        self.cache_capacity = settings.capacity;
        self.cache_ttl = settings.ttl();
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Report cache hits and misses to `metrics`
    pub fn metrics(mut self, metrics: Arc<dyn CacheMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<ReactionStore<R>, CacheConfigError> {
        let cache = ReactionCache::new(self.cache_capacity, self.cache_ttl)?;
        let metrics = self.metrics.unwrap_or_else(|| Arc::new(NoopMetrics));

        Ok(ReactionStore {
            inner: Arc::new(StoreInner {
                repo: self.repo,
                cache,
                metrics,
            }),
            tasks: TaskPool::new(self.max_in_flight),
        })
    }
}
