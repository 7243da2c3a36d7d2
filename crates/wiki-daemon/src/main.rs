//! Wiki Daemon - page editor service
//!
//! Serves `/view/<title>`, `/edit/<title>` and `/save/<title>` backed by a
//! relational page store.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wiki_daemon::config::StorageConfig;
use wiki_daemon::error::{DaemonError, DaemonResult};
use wiki_daemon::{DaemonConfig, Server};

/// Wiki Daemon CLI
#[derive(Parser)]
#[command(name = "wikid")]
#[command(about = "Wiki Daemon - page editor service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "WIKI_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "WIKI_LISTEN_ADDR")]
    listen: Option<String>,

    /// Database URL (postgres://, mysql://, sqlite:, or "memory")
    #[arg(long, env = "WIKI_DATABASE_URL")]
    database_url: Option<String>,

    /// Directory containing view.html and edit.html
    #[arg(long, env = "WIKI_TEMPLATE_DIR")]
    templates: Option<std::path::PathBuf>,

    /// Log level
    #[arg(long, env = "WIKI_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "WIKI_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    // A .env file feeds both the CLI env fallbacks and WIKI_* config vars.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(url) = &cli.database_url {
        config.storage = StorageConfig::from_url(url)
            .ok_or_else(|| DaemonError::Config(format!("Unsupported database URL: {}", url)))?;
    }
    if let Some(dir) = cli.templates {
        config.templates.dir = Some(dir);
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Failed to load .env file"),
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        "Starting wiki daemon"
    );

    let server = Server::new(config).await?;
    server.run().await
}
