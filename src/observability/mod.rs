//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every handler, middleware and startup step:
//!     → tracing macros (info!/warn!/error!/critical!)
//!     → logging.rs (JsonLogLayer: one JSON line per event on stdout)
//!
//! Panics anywhere in request handling:
//!     → panics.rs (hook records location + backtrace at the panic site)
//!     → fallback internal-error record
//!
//! Correlation middleware, once per request:
//!     → metrics.rs (request counters and latency histogram)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Correlation ID flows through request spans into every record
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod panics;
