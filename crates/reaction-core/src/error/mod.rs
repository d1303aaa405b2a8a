//! Error types for the reaction store

mod store_error;

pub use store_error::{Operation, StorageError, StorageResult, StoreError, StoreResult};
