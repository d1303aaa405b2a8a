//! Ports - storage and metrics interfaces consumed by the reaction store

mod metrics;
mod repositories;

pub use metrics::{CacheMetrics, NoopMetrics, REACTIONS_CACHE_LABEL};
pub use repositories::{ReactionRepository, ReactionTransaction};
