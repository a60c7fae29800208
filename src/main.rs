//! log-scenarios
//!
//! A small HTTP service demonstrating correlation-tagged structured logging.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ CatchPanicLayer ─▶ correlation middleware ─▶ handler
//!                     (last resort)      bind CorrelationId         /health
//!                                        "Request received"         /api/data
//!                                        span with correlation_id   /api/warning
//!                                        request timeout            /api/error
//!                                        catch handler panics       /api/critical
//!                                                                   fallbacks
//!
//!     every tracing event ─▶ JsonLogLayer ─▶ one JSON line on stdout
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use log_scenarios::config::{load_config, validate_config, ConfigError, ServiceConfig};
use log_scenarios::lifecycle::{startup, Shutdown};
use log_scenarios::observability::{logging, metrics};
use log_scenarios::HttpServer;

#[derive(Parser)]
#[command(name = "log-scenarios")]
#[command(about = "HTTP service demonstrating correlation-tagged JSON logging", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address (e.g. 127.0.0.1:5000)
    #[arg(long)]
    bind: Option<String>,

    /// Override the port of the bind address
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Override the deployment environment name
    #[arg(long)]
    environment: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut ServiceConfig) {
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            config.listener.set_port(port);
        }
        if let Some(environment) = &self.environment {
            config.service.environment = environment.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability)?;

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics endpoint");
        }
    }

    let listener = startup::bind_listener(&config).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
