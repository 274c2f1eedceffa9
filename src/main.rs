use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use amrsense_api::app::{app, AppState};
use amrsense_api::config::{self, Instance};
use amrsense_api::database::{DatabaseManager, PgStore};

/// AMRSense submission API
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Deployment to run: `amrsense` (full) or `basic`
    #[arg(long, env = "APP_INSTANCE")]
    instance: Option<Instance>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Port; defaults to 8080 for amrsense and 5000 for basic
    #[arg(short, long)]
    port: Option<u16>,

    /// Start even if the database is unreachable, connecting on first request
    #[arg(long)]
    lazy_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, APP_INSTANCE, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = config::config().clone();
    if let Some(instance) = args.instance {
        config.server.instance = instance;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if args.port.is_some() {
        config.server.port = args.port;
    }
    tracing::info!(
        "Starting AMRSense API ({}) in {:?} mode",
        config.server.instance.as_str(),
        config.environment
    );

    let pool = if args.lazy_db {
        DatabaseManager::connect_lazy(&config.database)?
    } else {
        DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?
    };
    let store = PgStore::new(pool.clone(), &config.database);
    let state = AppState::new(Arc::new(store), config.server.instance);
    let app = app(state, &config);

    let bind_addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Server running on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
