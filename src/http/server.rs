//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, panic isolation)
//! - Gate `/player-info` behind the access check and the rate limiter
//! - Bind server to listener
//! - Apply configuration reloads without dropping connections

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::health::health;
use crate::http::player_info::player_info;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::static_files;
use crate::lifecycle::panic::handle_panic;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::security::{access_control_middleware, cors_layer, rate_limit_middleware, RateLimiter};
use crate::upstream::{UpstreamClient, UpstreamResult};

/// Settings that can be swapped at runtime.
pub struct InnerState {
    pub config: Arc<ProxyConfig>,
    pub upstream: UpstreamClient,
}

impl InnerState {
    fn build(config: ProxyConfig) -> UpstreamResult<Self> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        Ok(Self {
            config: Arc::new(config),
            upstream,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<ArcSwap<InnerState>>,
    rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> UpstreamResult<Self> {
        Ok(Self {
            inner: Arc::new(ArcSwap::from_pointee(InnerState::build(config)?)),
            rate_limiter: Arc::new(RateLimiter::new()),
        })
    }

    /// Current configuration.
    pub fn config(&self) -> Arc<ProxyConfig> {
        self.inner.load().config.clone()
    }

    /// Current upstream client.
    pub fn upstream(&self) -> UpstreamClient {
        self.inner.load().upstream.clone()
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Swap in a new configuration.
    ///
    /// Upstream, access and rate-limit settings apply to the next request.
    /// Listener, CORS and static-file settings are fixed at startup.
    pub fn apply_config(&self, config: ProxyConfig) {
        let current = self.config();
        if current.listener != config.listener
            || current.cors != config.cors
            || current.static_files != config.static_files
        {
            tracing::warn!("Listener, CORS and static file changes take effect after a restart");
        }

        match InnerState::build(config) {
            Ok(inner) => {
                self.inner.store(Arc::new(inner));
                tracing::info!("Configuration reloaded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected configuration reload, keeping current configuration");
            }
        }
    }
}

/// HTTP server for the player-info proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> UpstreamResult<Self> {
        let router_config = config.clone();
        let state = AppState::new(config)?;
        let router = Self::build_router(&router_config, state.clone());

        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        // Route layers run last-added first: access gate, then rate limiter.
        let lookup = Router::new()
            .route("/player-info", get(player_info))
            .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
            .route_layer(middleware::from_fn_with_state(state.clone(), access_control_middleware));

        let api = Router::new()
            .route("/health", get(health))
            .merge(lookup)
            .route_layer(middleware::from_fn(metrics::track_requests))
            .with_state(state);

        Self::outer_layers(static_files::mount(api, &config.static_files), config)
    }

    /// Layers shared by every route, applied outermost-last.
    fn outer_layers(router: Router, config: &ProxyConfig) -> Router {
        router
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(cors_layer(&config.cors, &config.access))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request.request_id(),
                )
            }))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Router without a listener, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` are applied as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let reload_state = self.state.clone();
        let reload_shutdown = shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(config) = config_updates.recv() => reload_state.apply_config(config),
                    _ = reload_shutdown.wait() => break,
                }
            }
        });

        let purge_state = self.state.clone();
        let purge_shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let window = Duration::from_secs(purge_state.config().rate_limit.window_secs);
                        purge_state.rate_limiter().purge_expired(window);
                    }
                    _ = purge_shutdown.wait() => break,
                }
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
