use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ig_profile_proxy::{
    config::Config,
    upstream::{InstagramSessionFactory, InstagramSettings},
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "ig-profile-proxy")]
#[command(version)]
#[command(about = "Cached Instagram profile lookups backed by a pool of accounts")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Directory holding per-account session files (overrides config file)
    #[arg(long, value_name = "DIR")]
    session_dir: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("ig_profile_proxy={},tower_http=trace", cli.log_level)
    } else {
        format!("ig_profile_proxy={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Instagram Profile Proxy v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(session_dir) = cli.session_dir {
        config.instagram.session_dir = session_dir;
    }
    config.validate()?;

    info!(
        "Initializing {} Instagram accounts from {}",
        config.instagram.accounts.len(),
        config.instagram.session_dir.display()
    );
    let factory = InstagramSessionFactory::new(InstagramSettings::from_config(&config.instagram)?);
    let state = AppState::initialize(config.clone(), &factory).await?;

    let web_server = WebServer::new(&config, state)?;
    info!(
        "Web server starting on http://{}:{}",
        web_server.host(),
        web_server.port()
    );

    web_server.serve().await?;
    info!("Shutdown complete");
    Ok(())
}
