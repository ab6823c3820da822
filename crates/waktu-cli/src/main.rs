mod commands;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use waktu_sync::{PgStore, PrayerTimeService, ServiceConfig};

#[derive(Debug, Parser)]
#[command(name = "waktu-cli")]
#[command(about = "Malaysian prayer-time scraper and store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Today's prayer times, fetched and stored on a cache miss
    Today {
        /// Zone code such as WLY01; defaults to WAKTU_DEFAULT_ZONE
        zone: Option<String>,
    },
    /// Re-fetch today's prayer times for a zone, bypassing the cache
    Refresh { zone: String },
    /// Most recent stored rows for a zone
    History {
        zone: String,

        /// Number of rows (1-100)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Zone catalog grouped by state
    Zones,
    /// Replace the zone catalog from the source, or the built-in list
    ZonesRefresh,
    /// Refresh every zone in the catalog
    ScrapeAll(BatchArgs),
    /// Refresh the zones of one state
    ScrapeState {
        /// State name, matched case-insensitively
        state: String,

        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Apply pending database migrations
    Migrate,
}

#[derive(Debug, Clone, Copy, Args, PartialEq, Eq)]
struct BatchArgs {
    /// One zone at a time with a courtesy delay between requests
    #[arg(long)]
    sequential: bool,

    /// Maximum in-flight fetches, capped at WAKTU_MAX_CONCURRENCY
    #[arg(long, default_value_t = 3)]
    concurrency: usize,

    /// Skip the second pass over failed zones
    #[arg(long)]
    no_retry_failed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = waktu_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool = waktu_db::connect(&config).await?;

    if matches!(cli.command, Commands::Migrate) {
        let applied = waktu_db::run_migrations(&pool).await?;
        tracing::info!(applied, "migrations complete");
        return Ok(());
    }

    let source = waktu_scraper::build_source(&config)?;
    let service = PrayerTimeService::new(
        source,
        Arc::new(PgStore::new(pool)),
        ServiceConfig::from_app_config(&config),
    );

    commands::run(&service, cli.command).await
}
