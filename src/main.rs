//! Issue tracker server entry point.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use issue_tracker::adapters::sqlite::{all_embedded_migrations, create_pool, Migrator};
use issue_tracker::{
    ConfigLoader, IssueService, IssuesHttpConfig, IssuesHttpServer, SqliteIssueRepository,
};

/// Project-scoped issue tracker REST service.
#[derive(Debug, Parser)]
#[command(name = "issue-tracker", version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long, env = "ISSUE_TRACKER_HOST")]
    host: Option<String>,

    /// Override the bind port
    #[arg(long, env = "ISSUE_TRACKER_PORT")]
    port: Option<u16>,

    /// Override the SQLite database path
    #[arg(long, env = "ISSUE_TRACKER_DATABASE")]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(database) = cli.database {
        config.database.path = database;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let pool = create_pool(&config.database)
        .await
        .context("failed to open database")?;
    let applied = Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("failed to run migrations")?;
    if applied > 0 {
        tracing::info!(applied, "applied schema migrations");
    }

    let repo = Arc::new(SqliteIssueRepository::new(pool));
    let service = IssueService::new(repo);
    let server = IssuesHttpServer::new(service, IssuesHttpConfig::from(&config.server));

    server
        .serve_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
