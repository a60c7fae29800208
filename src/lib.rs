//! Correlation-tagged structured logging across HTTP request scenarios.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod scenarios;

pub use config::ServiceConfig;
pub use http::{CorrelationId, HttpServer};
pub use lifecycle::Shutdown;
