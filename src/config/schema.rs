//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::net::SocketAddr;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Identity reported at startup and by `/health`.
    pub service: ServiceInfo,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Tunables for the scenario endpoints.
    pub scenarios: ScenarioConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl ListenerConfig {
    /// Replace the port of the bind address.
    ///
    /// Leaves an unparsable address untouched; validation reports it.
    pub fn set_port(&mut self, port: u16) {
        if let Ok(mut addr) = self.bind_address.parse::<SocketAddr>() {
            addr.set_port(port);
            self.bind_address = addr.to_string();
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceInfo {
    /// Name reported by the health endpoint.
    pub name: String,

    /// Version reported at startup.
    pub version: String,

    /// Deployment environment reported at startup.
    pub environment: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "production".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Scenario endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Lower bound of the simulated `/api/data` latency in milliseconds.
    pub data_delay_min_ms: u64,

    /// Upper bound (inclusive) of the simulated `/api/data` latency.
    pub data_delay_max_ms: u64,
}

impl ScenarioConfig {
    /// Draw a delay uniformly from the configured range.
    pub fn sample_delay(&self) -> Duration {
        let (low, high) = if self.data_delay_min_ms <= self.data_delay_max_ms {
            (self.data_delay_min_ms, self.data_delay_max_ms)
        } else {
            (self.data_delay_max_ms, self.data_delay_min_ms)
        };
        Duration::from_millis(rand::thread_rng().gen_range(low..=high))
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            data_delay_min_ms: 10,
            data_delay_max_ms: 100,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
