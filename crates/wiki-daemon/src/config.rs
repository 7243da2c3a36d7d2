//! Configuration for wiki-daemon

use crate::storage::PoolSettings;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Template configuration
    #[serde(default)]
    pub templates: TemplateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (for development/testing)
    #[default]
    Memory,

    /// PostgreSQL storage
    Postgres {
        /// Connection URL
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Connection timeout in seconds
        #[serde(default = "default_connection_timeout")]
        connect_timeout_secs: u64,

        /// Seconds before an idle connection is closed; 0 keeps it
        #[serde(default = "default_idle_timeout")]
        idle_timeout_secs: Option<u64>,

        /// Seconds before a connection is retired; 0 keeps it
        #[serde(default = "default_max_lifetime")]
        max_lifetime_secs: Option<u64>,
    },

    /// MySQL storage
    #[serde(rename = "mysql")]
    MySql {
        /// Connection URL
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Connection timeout in seconds
        #[serde(default = "default_connection_timeout")]
        connect_timeout_secs: u64,

        /// Seconds before an idle connection is closed; 0 keeps it
        #[serde(default = "default_idle_timeout")]
        idle_timeout_secs: Option<u64>,

        /// Seconds before a connection is retired; 0 keeps it
        #[serde(default = "default_max_lifetime")]
        max_lifetime_secs: Option<u64>,
    },

    /// SQLite storage
    ///
    /// Connections are kept for the life of the pool unless configured,
    /// which an in-memory database relies on.
    Sqlite {
        /// Database URL, e.g. `sqlite://wiki.db`
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Connection timeout in seconds
        #[serde(default = "default_connection_timeout")]
        connect_timeout_secs: u64,

        #[serde(default)]
        idle_timeout_secs: Option<u64>,

        #[serde(default)]
        max_lifetime_secs: Option<u64>,
    },
}

impl StorageConfig {
    /// Pick a backend from a database URL scheme
    pub fn from_url(url: &str) -> Option<Self> {
        let url = url.to_string();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(StorageConfig::Postgres {
                url,
                max_connections: default_pool_size(),
                connect_timeout_secs: default_connection_timeout(),
                idle_timeout_secs: default_idle_timeout(),
                max_lifetime_secs: default_max_lifetime(),
            })
        } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Some(StorageConfig::MySql {
                url,
                max_connections: default_pool_size(),
                connect_timeout_secs: default_connection_timeout(),
                idle_timeout_secs: default_idle_timeout(),
                max_lifetime_secs: default_max_lifetime(),
            })
        } else if url.starts_with("sqlite:") {
            Some(StorageConfig::Sqlite {
                url,
                max_connections: default_pool_size(),
                connect_timeout_secs: default_connection_timeout(),
                idle_timeout_secs: None,
                max_lifetime_secs: None,
            })
        } else if url == "memory" {
            Some(StorageConfig::Memory)
        } else {
            None
        }
    }

    /// Connection URL and pool settings, `None` for in-memory storage
    pub fn connection(&self) -> Option<(&str, PoolSettings)> {
        match self {
            StorageConfig::Memory => None,
            StorageConfig::Postgres {
                url,
                max_connections,
                connect_timeout_secs,
                idle_timeout_secs,
                max_lifetime_secs,
            }
            | StorageConfig::MySql {
                url,
                max_connections,
                connect_timeout_secs,
                idle_timeout_secs,
                max_lifetime_secs,
            }
            | StorageConfig::Sqlite {
                url,
                max_connections,
                connect_timeout_secs,
                idle_timeout_secs,
                max_lifetime_secs,
            } => {
                let nonzero = |secs: &Option<u64>| secs.filter(|&s| s > 0);
                let settings = PoolSettings::new(*max_connections, *connect_timeout_secs)
                    .with_idle_timeout(nonzero(idle_timeout_secs))
                    .with_max_lifetime(nonzero(max_lifetime_secs));
                Some((url.as_str(), settings))
            }
        }
    }
}

/// Template configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Directory holding `view.html` and `edit.html`; built-in templates when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_max_body_size() -> usize {
    2 * 1024 * 1024
}

fn default_pool_size() -> u32 {
    25
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_idle_timeout() -> Option<u64> {
    Some(600)
}

fn default_max_lifetime() -> Option<u64> {
    Some(300)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from defaults, an optional file, and `WIKI_*` env vars
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Add environment variables with WIKI_ prefix, e.g. WIKI_SERVER__LISTEN_ADDR
        builder = builder.add_source(
            config::Environment::with_prefix("WIKI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.server.listen_addr.port(), 8080);
        assert!(matches!(config.storage, StorageConfig::Memory));
        assert!(config.templates.dir.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_storage_from_url() {
        assert!(matches!(
            StorageConfig::from_url("postgres://wiki@localhost/wiki"),
            Some(StorageConfig::Postgres { max_connections: 25, .. })
        ));
        assert!(matches!(
            StorageConfig::from_url("sqlite://wiki.db"),
            Some(StorageConfig::Sqlite { .. })
        ));
        assert!(matches!(
            StorageConfig::from_url("sqlite::memory:"),
            Some(StorageConfig::Sqlite { .. })
        ));
        assert!(matches!(
            StorageConfig::from_url("memory"),
            Some(StorageConfig::Memory)
        ));
        assert!(matches!(
            StorageConfig::from_url("mysql://wiki@localhost/wiki"),
            Some(StorageConfig::MySql {
                max_lifetime_secs: Some(300),
                ..
            })
        ));
        assert!(StorageConfig::from_url("redis://localhost").is_none());
    }

    #[test]
    fn test_connection_settings() {
        assert!(StorageConfig::Memory.connection().is_none());

        let mysql = StorageConfig::from_url("mysql://wiki@localhost/wiki").unwrap();
        let (url, settings) = mysql.connection().unwrap();
        assert_eq!(url, "mysql://wiki@localhost/wiki");
        assert_eq!(settings.max_connections, 25);
        assert_eq!(settings.idle_timeout_secs, Some(600));
        assert_eq!(settings.max_lifetime_secs, Some(300));

        let sqlite = StorageConfig::from_url("sqlite::memory:").unwrap();
        let (_, settings) = sqlite.connection().unwrap();
        assert_eq!(settings, PoolSettings::new(25, 5));

        let postgres = StorageConfig::Postgres {
            url: "postgres://localhost/wiki".to_string(),
            max_connections: 4,
            connect_timeout_secs: 2,
            idle_timeout_secs: Some(0),
            max_lifetime_secs: Some(60),
        };
        let (_, settings) = postgres.connection().unwrap();
        assert_eq!(settings.idle_timeout_secs, None);
        assert_eq!(settings.max_lifetime_secs, Some(60));
    }

    #[test]
    fn test_load_mysql_pool_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wiki.toml");
        std::fs::write(
            &path,
            r#"
            [storage]
            type = "mysql"
            url = "mysql://wiki@localhost/wiki"
            max_lifetime_secs = 120
            "#,
        )
        .unwrap();

        let config = DaemonConfig::load(path.to_str()).unwrap();
        match config.storage {
            StorageConfig::MySql {
                idle_timeout_secs,
                max_lifetime_secs,
                ..
            } => {
                assert_eq!(idle_timeout_secs, Some(600));
                assert_eq!(max_lifetime_secs, Some(120));
            }
            other => panic!("unexpected storage config: {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wiki.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            listen_addr = "0.0.0.0:9090"

            [storage]
            type = "sqlite"
            url = "sqlite://pages.db"

            [templates]
            dir = "pages"
            "#,
        )
        .unwrap();

        let config = DaemonConfig::load(path.to_str()).unwrap();
        assert_eq!(config.server.listen_addr.port(), 9090);
        assert_eq!(config.server.max_body_size, 2 * 1024 * 1024);
        match config.storage {
            StorageConfig::Sqlite {
                url,
                max_connections,
                ..
            } => {
                assert_eq!(url, "sqlite://pages.db");
                assert_eq!(max_connections, 25);
            }
            other => panic!("unexpected storage config: {other:?}"),
        }
        assert_eq!(config.templates.dir, Some(PathBuf::from("pages")));
    }
}
