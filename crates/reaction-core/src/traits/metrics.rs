//! Cache metrics port

/// Label reported for the reactions cache
pub const REACTIONS_CACHE_LABEL: &str = "Reactions";

/// Sink for cache hit/miss counters
pub trait CacheMetrics: Send + Sync {
    fn increment_cache_hit(&self, label: &str);

    fn increment_cache_miss(&self, label: &str);
}

/// Metrics sink that discards everything, used when none is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl CacheMetrics for NoopMetrics {
    fn increment_cache_hit(&self, _label: &str) {}

    fn increment_cache_miss(&self, _label: &str) {}
}
