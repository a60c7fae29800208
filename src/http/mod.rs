//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → correlation.rs (bind correlation ID, log "Request received")
//!     → scenario handler or fallback
//!     → response.rs (JSON error bodies)
//!     → Send to client (with x-correlation-id)
//! ```

pub mod correlation;
pub mod request;
pub mod response;
pub mod server;

pub use correlation::{CorrelationId, CorrelationIdExt, X_CORRELATION_ID};
pub use server::{AppState, HttpServer};
