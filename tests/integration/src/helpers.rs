//! Test helpers for integration tests
//!
//! Provides a store wired to the in-memory repository and a metrics sink
//! that counts cache hits and misses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use reaction_common::{try_init_tracing_with_config, TracingConfig};
use reaction_core::traits::ReactionRepository;
use reaction_core::{CacheMetrics, MessageSummary, REACTIONS_CACHE_LABEL};
use reaction_db::MemoryReactionRepository;
use reaction_store::ReactionStore;

/// Metrics sink counting reactions cache hits and misses
#[derive(Debug, Default)]
pub struct CountingMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CountingMetrics {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::SeqCst)
    }
}

impl CacheMetrics for CountingMetrics {
    fn increment_cache_hit(&self, label: &str) {
        assert_eq!(label, REACTIONS_CACHE_LABEL);
        self.hits.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_cache_miss(&self, label: &str) {
        assert_eq!(label, REACTIONS_CACHE_LABEL);
        self.misses.fetch_add(1, Ordering::SeqCst);
    }
}

/// Store under test plus handles to its collaborators
pub struct TestStore {
    pub store: ReactionStore<MemoryReactionRepository>,
    pub repo: MemoryReactionRepository,
    pub metrics: Arc<CountingMetrics>,
}

impl TestStore {
    /// Build a store over a fresh in-memory repository
    pub fn new() -> Result<Self> {
        Self::with_max_in_flight(16)
    }

    pub fn with_max_in_flight(max_in_flight: usize) -> Result<Self> {
        let _ = try_init_tracing_with_config(&TracingConfig::development());

        let repo = MemoryReactionRepository::new();
        let metrics = Arc::new(CountingMetrics::default());
        let store = ReactionStore::builder(repo.clone())
            .max_in_flight(max_in_flight)
            .metrics(metrics.clone())
            .build()
            .context("failed to build reaction store")?;

        Ok(Self {
            store,
            repo,
            metrics,
        })
    }

    /// Current reaction columns of a message
    pub async fn message(&self, post_id: &str) -> Result<MessageSummary> {
        self.repo
            .message_summary(post_id)
            .await?
            .with_context(|| format!("message {post_id} not found"))
    }
}
