//! Facmon ingestion CLI application
//!
//! Pulls machines, bearings, and readings from the upstream feed into the
//! store, for one date or a backfill window. Exits non-zero when any record
//! failed, so schedulers notice partial runs.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use facmon_ingest::feed::FeedClient;
use facmon_ingest::pipeline::{ingestion_dates, IngestionPipeline};
use facmon_server::dal::DAL;
use facmon_server::db::create_shared_connection_pool;
use facmon_server::store::{FixtureStore, SharedStore};
use facmon_utils::config::Settings;
use facmon_utils::logging::prelude::*;
use facmon_utils::tunnel::SshTunnel;

/// Embedded migrations for the database
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../facmon-models/migrations");

/// Command-line interface structure
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ingestion date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Total number of days to ingest, ending at the ingestion date
    #[arg(long, default_value_t = 0)]
    backfill_days: u32,

    /// Path to a configuration file
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = Settings::new(cli.config.clone()).expect("Failed to load configuration");
    facmon_utils::logging::init_with_format(&config.log.level, &config.log.format)
        .expect("Failed to initialize logger");

    // Returning an ExitCode instead of calling process::exit lets the tunnel
    // close cleanly on the way out.
    match run(&config, &cli).await {
        Ok(clean) => {
            if clean {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("Ingestion run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Settings, cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let _tunnel = match config.tunnel {
        Some(ref tunnel_cfg) if tunnel_cfg.enabled => Some(SshTunnel::open(tunnel_cfg)?),
        _ => None,
    };

    let store = build_store(config)?;
    let feed = FeedClient::new(&config.feed.base_url, config.feed.timeout_seconds)?;
    let pipeline = IngestionPipeline::new(
        feed,
        store,
        config.feed.axis.clone(),
        config.feed.analytics.clone(),
    );

    let end = cli.date.unwrap_or_else(|| Utc::now().date_naive());
    let dates = ingestion_dates(end, cli.backfill_days);

    info!(
        "Starting ingestion for {} date(s) ending {}",
        dates.len(),
        end
    );
    let stats = pipeline.run(&dates).await;
    info!(
        "Ingestion run complete: {} machines, {} bearings, {} readings, {} errors",
        stats.machines, stats.bearings, stats.readings, stats.errors
    );

    Ok(stats.is_clean())
}

fn build_store(config: &Settings) -> Result<SharedStore, Box<dyn std::error::Error>> {
    if config.database.fixture {
        info!("Ingesting into the in-memory fixture store");
        return Ok(Arc::new(FixtureStore::new()));
    }

    info!("Creating database connection pool");
    let pool = create_shared_connection_pool(&config.database.url, config.database.pool_size);

    info!("Running pending database migrations");
    let mut conn = pool.get().expect("Failed to get DB connection");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");

    Ok(Arc::new(DAL::new(pool)))
}
