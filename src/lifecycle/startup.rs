//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener
//! - Announce the service (version, environment, port) before traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use tokio::net::TcpListener;

use crate::config::ServiceConfig;

/// Bind the configured address and log the startup record.
#[tracing::instrument(skip_all)]
pub async fn bind_listener(config: &ServiceConfig) -> Result<TcpListener, std::io::Error> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let port = listener.local_addr()?.port();

    tracing::info!(
        version = %config.service.version,
        environment = %config.service.environment,
        port,
        "Service starting"
    );

    Ok(listener)
}
