//! Configuration structs

mod store_config;

pub use store_config::{
    CacheSettings, ConfigError, DatabaseSettings, ExecutorSettings, StoreSettings,
};
