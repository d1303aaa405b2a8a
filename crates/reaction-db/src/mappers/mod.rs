//! Model to entity mappers
//!
//! `From<Model> for Entity` conversions for database rows.

mod message;
mod reaction;
