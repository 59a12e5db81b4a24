use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gigledger_api::config::ServerConfig;
use gigledger_api::router::build_app_router;
use gigledger_api::state::AppState;

const DEFAULT_LOG_FILTER: &str = "gigledger_api=debug,gigledger_db=debug,tower_http=debug";

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connect, verify the connection and bring the schema up to date.
async fn prepare_database(config: &ServerConfig) -> anyhow::Result<gigledger_db::DbPool> {
    let pool = gigledger_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to the database")?;
    gigledger_db::health_check(&pool)
        .await
        .context("database health check failed")?;
    gigledger_db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    tracing::info!(
        max_connections = config.db_max_connections,
        "Database ready, migrations applied"
    );
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env().context("invalid configuration")?;
    init_tracing(config.json_logs);

    let pool = prepare_database(&config).await.inspect_err(|e| {
        tracing::error!(error = ?e, "Database startup failed");
    })?;

    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("invalid HOST {:?}", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    let app = build_app_router(AppState {
        pool,
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "gigledger API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM. If a handler cannot be
/// installed that signal is simply never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
