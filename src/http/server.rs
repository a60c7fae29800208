//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with scenario routes and fallbacks
//! - Wire up middleware (panic catching, correlation with request timeout)
//! - Bind server to listener and serve with graceful shutdown

use std::net::SocketAddr;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::{ScenarioConfig, ServiceConfig, ServiceInfo};
use crate::http::correlation::correlation_middleware;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::panics;
use crate::scenarios::{self, fallback};

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: ServiceInfo,
    pub scenarios: ScenarioConfig,
    /// Enforced by the correlation middleware.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            service: config.service.clone(),
            scenarios: config.scenarios.clone(),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        }
    }
}

/// Build the full application: `routes` plus fallbacks and middleware.
///
/// Layer order, outermost first:
/// panic catcher → correlation middleware (timeout, handler panics) → route.
///
/// Also installs the panic hook that records where faults happen.
pub fn build_router(config: &ServiceConfig, routes: Router<AppState>) -> Router {
    panics::install_hook();

    let state = AppState::from_config(config);
    routes
        .fallback(fallback::not_found)
        .method_not_allowed_fallback(fallback::method_not_allowed)
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, correlation_middleware))
        .layer(CatchPanicLayer::custom(fallback::panic_response))
}

/// HTTP server for the scenario service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving the scenario routes.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_routes(config, scenarios::routes())
    }

    /// Create a server for a custom route set (same middleware and fallbacks).
    pub fn with_routes(config: ServiceConfig, routes: Router<AppState>) -> Self {
        let router = build_router(&config, routes);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns after a Ctrl+C / SIGTERM or a message on `shutdown`, once
    /// in-flight requests have drained.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown requested");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The assembled router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
