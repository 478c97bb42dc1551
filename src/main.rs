//! Consoles API entry point.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use consoles_api::api::{create_router, AppState};
use consoles_api::config::{Config, LogFormat};
use consoles_api::console::{ConsoleStore, InMemoryConsoleStore, MongoConsoleStore};
use consoles_api::error::AppError;
use consoles_api::metrics;
use consoles_api::utils::shutdown_signal;

/// HTTP CRUD service for game consoles.
#[derive(Parser, Debug)]
#[command(name = "consoles-api")]
#[command(about = "Serve the /consoles resource backed by MongoDB")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Keep consoles in process memory instead of MongoDB.
        #[arg(long)]
        in_memory: bool,
    },

    /// Check configuration validity.
    CheckConfig,
}

fn init_logging(verbose: bool, rust_log: &str, format: LogFormat) {
    let filter = if verbose {
        EnvFilter::new("consoles_api=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(rust_log))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration decides the log format, so load it before logging starts
    let loaded = Config::load();
    let (rust_log, format) = match &loaded {
        Ok(config) => (config.rust_log.clone(), config.log_format),
        Err(_) => ("info".to_string(), LogFormat::default()),
    };
    init_logging(args.verbose, &rust_log, format);

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(loaded),
        Some(Command::Serve { port, in_memory }) => cmd_serve(loaded, port, in_memory).await,
        None => cmd_serve(loaded, args.port, false).await,
    }
}

/// Check configuration validity.
fn cmd_check_config(loaded: Result<Config, envy::Error>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("CONSOLES API - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match loaded {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  MongoDB URI: {}", config.redacted_uri());
    println!("  Database: {}", config.database_name());
    println!("  Collection: {}", config.mongodb_collection);
    println!("  Listen Address: {}", config.bind_addr());
    println!("  Log Level: {}", config.rust_log);
    println!("  Log Format: {:?}", config.log_format);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Connect storage and serve HTTP until a shutdown signal arrives.
async fn cmd_serve(
    loaded: Result<Config, envy::Error>,
    port_override: Option<u16>,
    in_memory: bool,
) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = match loaded {
        Ok(config) => config,
        // The in-memory store needs no connection string.
        Err(e) if in_memory => {
            warn!("Configuration incomplete ({}), continuing with defaults", e);
            Config::with_uri(String::new())
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(AppError::from(e).into());
        }
    };

    if let Some(port) = port_override {
        config.port = port;
    }

    let store: Arc<dyn ConsoleStore> = if in_memory {
        warn!("Running with the in-memory store; data is lost on exit");
        Arc::new(InMemoryConsoleStore::new())
    } else {
        if let Err(e) = config.validate() {
            error!("Invalid configuration: {}", e);
            return Err(AppError::InvalidConfig(e).into());
        }

        info!("Connecting to {}...", config.redacted_uri());
        let store = MongoConsoleStore::connect(&config).await.map_err(|e| {
            error!("Failed to connect to database: {}", e);
            AppError::from(e)
        })?;
        Arc::new(store)
    };

    let mut app_state = AppState::new(store);
    match metrics::install_recorder() {
        Ok(handle) => {
            metrics::spawn_upkeep(handle.clone(), metrics::UPKEEP_INTERVAL);
            app_state = app_state.with_metrics(handle);
        }
        Err(e) => warn!("Metrics recorder unavailable: {}", e),
    }

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await.map_err(AppError::from)?;
    info!("Server launched on {}", addr);

    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::from)?;

    info!("Server stopped");
    Ok(())
}
