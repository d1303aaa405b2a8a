//! Repository implementations
//!
//! Implementations of the reaction repository traits defined in reaction-core:
//! PostgreSQL for production, and an in-memory store for tests and embedding.

mod error;
mod memory;
mod reaction;

pub use error::map_db_error;
pub use memory::{FailPoint, MemoryReactionRepository, MemoryReactionTransaction};
pub use reaction::{PgReactionRepository, PgReactionTransaction};
