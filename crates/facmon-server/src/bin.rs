//! Facmon server CLI application
//!
//! Command-line interface for the monitoring API server.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use dotenv::dotenv;
use tokio::signal;

use facmon_server::api::{self, AppState};
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
    /// Path to a configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the CLI
#[derive(Subcommand)]
enum Commands {
    /// Start the monitoring API server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let config = Settings::new(cli.config.clone()).expect("Failed to load configuration");

    // Initialize logger
    facmon_utils::logging::init_with_format(&config.log.level, &config.log.format)
        .expect("Failed to initialize logger");

    match cli.command {
        Commands::Serve => serve(&config).await?,
    }
    Ok(())
}

/// Starts the API server: opens the optional SSH tunnel, builds the store,
/// runs migrations, configures routes, and serves with graceful shutdown.
async fn serve(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting facmon server");

    // The tunnel must outlive the server; it closes when this binding drops.
    let _tunnel = open_tunnel(config)?;

    let store = build_store(config)?;

    info!("Configuring API routes");
    let state = AppState {
        store,
        kpi_dual_timestamps: config.dashboard.kpi_dual_timestamps,
    };
    let app = api::configure_api_routes(state);

    let addr = config.api.bind_address();
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Set up shutdown signal handler
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
        shutdown_tx.send(()).ok();
    });

    info!("Facmon server is now running");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
            info!("Shutdown signal received, stopping server");
        })
        .await?;

    Ok(())
}

fn open_tunnel(config: &Settings) -> Result<Option<SshTunnel>, Box<dyn std::error::Error>> {
    match config.tunnel {
        Some(ref tunnel_cfg) if tunnel_cfg.enabled => {
            let tunnel = SshTunnel::open(tunnel_cfg)?;
            Ok(Some(tunnel))
        }
        _ => Ok(None),
    }
}

fn build_store(config: &Settings) -> Result<SharedStore, Box<dyn std::error::Error>> {
    if config.database.fixture {
        info!("Serving from the in-memory fixture store");
        return Ok(Arc::new(FixtureStore::with_sample_data()));
    }

    info!("Creating database connection pool");
    let pool = create_shared_connection_pool(&config.database.url, config.database.pool_size);

    info!("Running pending database migrations");
    let mut conn = pool.get().expect("Failed to get DB connection");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");
    info!("Database migrations completed successfully");

    Ok(Arc::new(DAL::new(pool)))
}
