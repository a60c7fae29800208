//! Scenario endpoints.
//!
//! # Data Flow
//! ```text
//! correlation middleware (CorrelationId bound, "Request received" logged)
//!     → handlers.rs (one endpoint per severity)
//!         → error.rs (simulated failures: log + safe JSON response)
//!     → fallback.rs (no route, wrong method, uncaught panic, timeout)
//! ```
//!
//! # Routes
//! | Route          | Level    | Status |
//! |----------------|----------|--------|
//! | `/health`      | INFO     | 200    |
//! | `/api/data`    | INFO     | 200    |
//! | `/api/warning` | WARNING  | 200    |
//! | `/api/error`   | ERROR    | 400    |
//! | `/api/critical`| CRITICAL | 500    |

pub mod error;
pub mod fallback;
pub mod handlers;

use axum::routing::get;
use axum::Router;

use crate::http::server::AppState;

pub use error::ScenarioError;

/// All scenario routes, without fallbacks or middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route(handlers::DATA_ENDPOINT, get(handlers::get_data))
        .route(handlers::WARNING_ENDPOINT, get(handlers::warning))
        .route(handlers::ERROR_ENDPOINT, get(handlers::validation_error))
        .route(handlers::CRITICAL_ENDPOINT, get(handlers::critical_error))
}
