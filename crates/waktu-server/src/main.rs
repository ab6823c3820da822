mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use waktu_sync::{PgStore, PrayerTimeService, ServiceConfig};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = waktu_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(config = ?config, "starting waktu-server");

    let pool = waktu_db::connect(&config).await?;
    let applied = waktu_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations complete");

    let source = waktu_scraper::build_source(&config)?;
    if config.source.uses_browser() {
        tracing::info!(webdriver_url = %config.webdriver_url, source = %config.source, "browser backend enabled");
    }
    let service = Arc::new(PrayerTimeService::new(
        source,
        Arc::new(PgStore::new(pool)),
        ServiceConfig::from_app_config(&config),
    ));

    let shutdown = CancellationToken::new();
    let mut scheduler = scheduler::build_scheduler(
        Arc::clone(&service),
        &config.prewarm_cron,
        shutdown.clone(),
    )
    .await?;

    let app = build_app(AppState {
        service,
        shutdown: shutdown.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    scheduler.shutdown().await?;
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
    shutdown.cancel();
}
