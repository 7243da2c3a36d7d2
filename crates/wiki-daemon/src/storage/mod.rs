//! Storage layer for wiki-daemon
//!
//! Provides persistent storage for pages.

#[cfg(test)]
mod conformance;
mod memory;
mod mysql;
mod pool;
mod postgres;
mod sqlite;
mod traits;

pub use memory::InMemoryStorage;
pub use mysql::MySqlStorage;
pub use pool::PoolSettings;
pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use traits::{PageStorage, SaveMode, Storage, StorageResult};
