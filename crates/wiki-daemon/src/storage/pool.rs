//! Connection pool settings shared by the SQL backends

use sqlx::pool::PoolOptions;
use std::time::Duration;

/// Sizing and recycling for a SQL connection pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    /// Close connections idle this long; `None` keeps them
    pub idle_timeout_secs: Option<u64>,
    /// Retire connections after this long; `None` keeps them
    pub max_lifetime_secs: Option<u64>,
}

impl PoolSettings {
    /// Settings that never recycle connections
    pub fn new(max_connections: u32, connect_timeout_secs: u64) -> Self {
        Self {
            max_connections,
            connect_timeout_secs,
            idle_timeout_secs: None,
            max_lifetime_secs: None,
        }
    }

    pub fn with_idle_timeout(mut self, secs: Option<u64>) -> Self {
        self.idle_timeout_secs = secs;
        self
    }

    pub fn with_max_lifetime(mut self, secs: Option<u64>) -> Self {
        self.max_lifetime_secs = secs;
        self
    }

    pub(crate) fn options<DB: sqlx::Database>(&self) -> PoolOptions<DB> {
        PoolOptions::<DB>::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .idle_timeout(self.idle_timeout_secs.map(Duration::from_secs))
            .max_lifetime(self.max_lifetime_secs.map(Duration::from_secs))
    }
}
