//! # reaction-db
//!
//! Database layer implementing the reaction repository traits.
//!
//! ## Overview
//!
//! This crate provides the storage side of the reaction store:
//!
//! - Connection pool management (primary and read replica)
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//! - The PostgreSQL repository and an in-memory repository
//! - Index and table bootstrap helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reaction_common::StoreSettings;
//! use reaction_db::pool::{create_pools, DatabaseConfig};
//! use reaction_db::repositories::PgReactionRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = StoreSettings::from_env()?;
//!     let config = DatabaseConfig::from(&settings.database);
//!     let pools = create_pools(&config).await?;
//!     let repo = PgReactionRepository::new(pools.primary, pools.replica);
//!
//!     // Hand the repository to a ReactionStore...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod schema;

// Re-export commonly used types
pub use pool::{create_pool, create_pools, DatabaseConfig, DatabasePools, PgPool};
pub use repositories::{FailPoint, MemoryReactionRepository, PgReactionRepository};
