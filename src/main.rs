use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mtpd::config::ConfigStore;
use mtpd::coordinator::{CoordinatorSettings, EventCoordinator, VolumeState};
use mtpd::events::EventBus;
use mtpd::session::LogSessionFactory;
use mtpd::state::AppState;
use mtpd::web;

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// mtpd command line arguments
#[derive(Parser, Debug)]
#[command(name = "mtpd")]
#[command(version, about = "MTP storage-exposure gating service", long_about = None)]
struct CliArgs {
    /// Listen address (overrides config)
    #[arg(short = 'a', long, value_name = "ADDRESS")]
    address: Option<String>,

    /// HTTP port (overrides config)
    #[arg(short = 'p', long, value_name = "PORT")]
    port: Option<u16>,

    /// Config file path (default: /etc/mtpd/config.json)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_level, args.verbose);

    tracing::info!("Starting mtpd v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = args.config.unwrap_or_else(get_config_path);
    tracing::info!("Config file: {}", config_path.display());
    let config = ConfigStore::new(&config_path).load()?;

    // Event bus and coordinator
    let events = Arc::new(EventBus::new());
    let factory = Arc::new(LogSessionFactory::new());
    let coordinator = EventCoordinator::spawn(
        CoordinatorSettings::from(&config),
        factory,
        events.clone(),
    );

    // Seed volumes that were already mounted when the service came up
    for path in &config.storage.premounted {
        tracing::info!("seeding premounted volume {}", path.display());
        coordinator.storage_state_changed(
            path.clone(),
            VolumeState::Unmounted,
            VolumeState::Mounted,
        );
    }

    // Shared state and router
    let (shutdown_tx, _) = broadcast::channel(1);
    let state = AppState::new(config.clone(), coordinator, events, shutdown_tx.clone());
    let app = web::create_router(state);

    // Bind the control surface
    let address = args.address.unwrap_or_else(|| config.web.address.clone());
    let port = args.port.unwrap_or(config.web.port);
    let addr: SocketAddr = format!("{}:{}", address, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Control surface listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    tracing::info!("mtpd stopped");
    Ok(())
}

/// Wait for ctrl-c or an internal shutdown request
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!("failed to listen for ctrl-c: {}", e);
            }
            tracing::info!("Received shutdown signal");
        }
        _ = shutdown_rx.recv() => {
            tracing::info!("Internal shutdown requested");
        }
    }
}

fn init_logging(level: LogLevel, verbose_count: u8) {
    // Verbose count overrides log level
    let effective_level = match verbose_count {
        0 => level,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };

    let filter = match effective_level {
        LogLevel::Error => "mtpd=error,tower_http=error",
        LogLevel::Warn => "mtpd=warn,tower_http=warn",
        LogLevel::Info => "mtpd=info,tower_http=info",
        LogLevel::Debug => "mtpd=debug,tower_http=debug",
        LogLevel::Trace => "mtpd=trace,tower_http=debug",
    };

    // Environment variable takes highest priority
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        eprintln!("failed to initialize tracing: {}", err);
    }
}

/// Get the configuration file path
fn get_config_path() -> PathBuf {
    // Check environment variable first
    if let Ok(path) = std::env::var("MTPD_CONFIG") {
        return PathBuf::from(path);
    }

    PathBuf::from("/etc/mtpd/config.json")
}
