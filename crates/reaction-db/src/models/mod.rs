//! Database models - SQLx-compatible structs for PostgreSQL tables

mod message;
mod reaction;

pub use message::MessageSummaryModel;
pub use reaction::ReactionModel;
