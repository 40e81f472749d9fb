//! Web layer module
//!
//! This module provides the HTTP interface for the profile proxy. Handlers
//! stay thin and delegate to the service layer; errors are mapped to status
//! codes in [`responses`].
//!
//! Routes:
//! - `GET /profile/{username}`: cached profile summary, rate limited per client
//! - `GET /proxy-image/?url=`: server-side image relay
//! - `GET /`: embedded lookup page
//! - `GET /health`: pool and cache status

use anyhow::Result;
use axum::{middleware::from_fn, middleware::from_fn_with_state, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{
    cache::ProfileCache,
    config::Config,
    services::{ImageProxyService, ProfileService},
    sessions::{AccountPool, SessionStore},
    upstream::SessionFactory,
};

pub mod handlers;
pub mod middleware;
pub mod rate_limit;
pub mod responses;

// Re-export commonly used types
pub use rate_limit::ClientRateLimiter;
pub use responses::{handle_error, handle_result, ApiResponse};

const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(300);

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
    state: AppState,
}

impl WebServer {
    pub fn new(config: &Config, state: AppState) -> Result<Self> {
        let app = router(state.clone());
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;

        Ok(Self { app, addr, state })
    }

    /// Start the web server and run until SIGINT or SIGTERM
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        info!("Listening on http://{}", self.addr);

        let pruning = self
            .state
            .rate_limiter
            .clone()
            .map(|limiter| rate_limit::spawn_pruning(limiter, RATE_LIMIT_PRUNE_INTERVAL));

        axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        if let Some(task) = pruning {
            task.abort();
        }
        self.state.shutdown().await;
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully");
                    }
                    _ = sigint.recv() => {
                        info!("Received SIGINT (Ctrl+C), shutting down gracefully");
                    }
                }
            }
            _ => {
                tracing::error!("Failed to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C, shutting down gracefully");
    }
}

/// Build the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let profile_routes = Router::new()
        .route(
            "/profile/{username}",
            get(handlers::profile::get_profile),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            rate_limit::profile_rate_limit_middleware,
        ));

    Router::new()
        .merge(profile_routes)
        .route("/proxy-image/", get(handlers::image_proxy::proxy_image))
        .route("/health", get(handlers::health::health_check))
        .route("/", get(handlers::index::index))
        // Middleware (applied in reverse order)
        .layer(from_fn(middleware::request_logging_middleware))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Application state shared across all handlers.
///
/// Owns the session pool, the profile cache and the http clients. Each
/// instance is independent so tests can build as many as they need.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profile_service: ProfileService,
    pub image_proxy: ImageProxyService,
    pub rate_limiter: Option<Arc<ClientRateLimiter>>,
    pub started_at: Instant,
}

impl AppState {
    /// Assemble the state around an already initialized account pool
    pub fn new(config: Config, pool: AccountPool) -> Result<Self> {
        let cache = Arc::new(ProfileCache::new(
            config.cache.max_entries,
            config.cache.ttl_duration()?,
        ));
        let image_proxy = ImageProxyService::new(&config.image_proxy)?;
        let rate_limiter = if config.rate_limit.enabled {
            Some(Arc::new(ClientRateLimiter::per_minute(
                config.rate_limit.profile_requests_per_minute,
            )?))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            profile_service: ProfileService::new(pool, cache),
            image_proxy,
            rate_limiter,
            started_at: Instant::now(),
        })
    }

    /// Load or create a session for every configured account, then build the
    /// state. Fails when no account produced a usable session.
    pub async fn initialize(config: Config, factory: &dyn SessionFactory) -> Result<Self> {
        let store = SessionStore::new(config.instagram.session_dir.clone());
        let pool = store
            .initialize_pool(&config.instagram.accounts, factory)
            .await?;
        Self::new(config, pool)
    }

    /// Release in-memory state before the process exits
    pub async fn shutdown(&self) {
        let cached = self.profile_service.cache().len().await;
        self.profile_service.cache().clear().await;
        info!("Dropped {} cached profiles", cached);
    }
}
