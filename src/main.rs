use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use fyuur::config::{Config, DEFAULT_CONFIG_PATH};
use fyuur::storage::{DatabaseStorage, Storage};
use fyuur::web::{app_router, AppState};
use fyuur::{logging, metrics};

#[derive(Parser)]
#[command(name = "fyuur")]
#[command(about = "Venue, artist and show listings")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to run the server on
    #[arg(short, long)]
    port: Option<u16>,

    /// Database file (created if missing)
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let mut config = Config::load(&cli.config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(database) = cli.database {
        config.database.path = database;
    }

    let _log_guard = logging::init_logging(&config.logging);

    let metrics_handle = if config.metrics.enabled {
        metrics::init_metrics()
    } else {
        None
    };

    info!("Initializing database storage...");
    let storage: Arc<dyn Storage> = Arc::new(DatabaseStorage::open(&config.database.path).await?);
    info!("Database storage initialized successfully");

    let state = AppState::new(storage)
        .with_delete_policy(config.shows.delete_policy)
        .with_metrics(metrics_handle);
    let app = app_router(state, &config.server.static_dir);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Listening on http://{} (venue delete policy: {:?})",
        addr, config.shows.delete_policy
    );
    axum::serve(listener, app).await?;

    Ok(())
}
