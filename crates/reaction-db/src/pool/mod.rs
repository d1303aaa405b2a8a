//! Database connection pool management

mod postgres;

pub use postgres::{create_pool, create_pools, DatabaseConfig, DatabasePools};

// Re-export PgPool for convenience
pub use sqlx::postgres::PgPool;
