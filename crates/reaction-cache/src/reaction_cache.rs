//! LRU cache of reactions keyed by message id, with per-entry expiry.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use reaction_core::Reaction;
use tracing::trace;

/// Longest freshness window an entry can be given
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Reactions of one message, ordered by creation time
pub type CachedReactions = Arc<[Reaction]>;

struct CacheEntry {
    reactions: CachedReactions,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Snapshot of cache counters
///
/// Reads that bypass the cache count as misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.hits as f64 / total as f64;
        rate
    }
}

/// Cache construction errors
#[derive(Debug, thiserror::Error)]
pub enum CacheConfigError {
    #[error("Cache capacity must be greater than zero")]
    ZeroCapacity,

    #[error("Cache TTL of {0:?} exceeds the maximum of one year")]
    TtlTooLarge(Duration),
}

/// Bounded, expiring cache of reactions per message
///
/// A single instance is shared by every operation of a store. All methods
/// take `&self`; the LRU list is guarded by one mutex that is never held
/// across an await point.
pub struct ReactionCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ReactionCache {
    /// Create a cache holding at most `capacity` messages, each fresh for `ttl`
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self, CacheConfigError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheConfigError::ZeroCapacity)?;
        if ttl > MAX_TTL {
            return Err(CacheConfigError::TtlTooLarge(ttl));
        }

        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Default freshness window of new entries
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up the live entry for a message
    ///
    /// Expired entries are dropped on access and reported as a miss.
    pub fn get(&self, post_id: &str) -> Option<CachedReactions> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let expired = match entries.peek(post_id) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if expired {
            entries.pop(post_id);
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(post_id, "Evicted expired reaction cache entry");
            return None;
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        entries.get(post_id).map(|entry| Arc::clone(&entry.reactions))
    }

    /// Count a read that skipped the cache as a miss
    pub fn record_bypass(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Insert or replace the entry for a message using the default TTL
    pub fn put(&self, post_id: impl Into<String>, reactions: CachedReactions) {
        self.put_with_ttl(post_id, reactions, self.ttl);
    }

    /// Insert or replace the entry for a message with an explicit TTL
    ///
    /// TTLs above [`MAX_TTL`] are clamped.
    pub fn put_with_ttl(
        &self,
        post_id: impl Into<String>,
        reactions: CachedReactions,
        ttl: Duration,
    ) {
        let entry = CacheEntry {
            reactions,
            expires_at: Instant::now() + ttl.min(MAX_TTL),
        };
        self.entries.lock().put(post_id.into(), entry);
    }

    /// Remove the entry for a message, returning whether one was present
    pub fn remove(&self, post_id: &str) -> bool {
        self.entries.lock().pop(post_id).is_some()
    }

    /// Remove every entry
    pub fn purge(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries currently held, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Current hit/miss counters and occupancy
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len(),
            capacity: entries.cap().get(),
        }
    }
}

impl std::fmt::Debug for ReactionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionCache")
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish()
    }
}
