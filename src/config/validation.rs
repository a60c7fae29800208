//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, ranges and levels
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("observability.log_level `{0}` is not a known level")]
    InvalidLogLevel(String),

    #[error("service.name must not be empty")]
    EmptyServiceName,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("scenarios.data_delay_min_ms ({min}) exceeds data_delay_max_ms ({max})")]
    InvertedDelayRange { min: u64, max: u64 },

    #[error("scenarios.data_delay_max_ms ({delay_ms}) does not fit in the {timeout_secs}s request timeout")]
    DelayExceedsTimeout { delay_ms: u64, timeout_secs: u64 },
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if LevelFilter::from_str(&observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }

    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    let timeout_secs = config.timeouts.request_secs;
    if timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let scenarios = &config.scenarios;
    if scenarios.data_delay_min_ms > scenarios.data_delay_max_ms {
        errors.push(ValidationError::InvertedDelayRange {
            min: scenarios.data_delay_min_ms,
            max: scenarios.data_delay_max_ms,
        });
    }

    if timeout_secs > 0 && scenarios.data_delay_max_ms >= timeout_secs.saturating_mul(1000) {
        errors.push(ValidationError::DelayExceedsTimeout {
            delay_ms: scenarios.data_delay_max_ms,
            timeout_secs,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
