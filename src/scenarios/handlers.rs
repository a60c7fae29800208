//! Scenario handlers.
//!
//! Each handler logs one record at its scenario's level, tagged with the
//! request's correlation ID, then responds with JSON.

use std::io;
use std::time::Instant;

use axum::extract::State;
use axum::response::Response;
use axum::{Extension, Json};
use serde::Serialize;
use tracing::instrument;

use crate::http::correlation::CorrelationId;
use crate::http::server::AppState;
use crate::observability::logging::utc_timestamp;
use crate::scenarios::error::{InvalidParameter, ScenarioError};

pub const DATA_ENDPOINT: &str = "/api/data";
pub const WARNING_ENDPOINT: &str = "/api/warning";
pub const ERROR_ENDPOINT: &str = "/api/error";
pub const CRITICAL_ENDPOINT: &str = "/api/critical";

/// Page size the error scenario rejects.
const SIMULATED_PAGE_SIZE: &str = "twenty";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub message: &'static str,
    pub timestamp: String,
    pub response_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct WarningResponse {
    pub message: &'static str,
    pub warning: bool,
}

/// Liveness probe.
#[instrument(skip_all)]
pub async fn health(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
) -> Json<HealthResponse> {
    tracing::info!(correlation_id = %correlation_id, "Health check requested");

    Json(HealthResponse {
        status: "OK",
        service: state.service.name.clone(),
        timestamp: utc_timestamp(),
    })
}

/// Normal operation with variable latency.
#[instrument(skip_all)]
pub async fn get_data(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
) -> Json<DataResponse> {
    let start = Instant::now();
    tokio::time::sleep(state.scenarios.sample_delay()).await;
    let response_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    tracing::info!(
        correlation_id = %correlation_id,
        response_time_ms,
        endpoint = DATA_ENDPOINT,
        "Data retrieved successfully"
    );

    Json(DataResponse {
        message: "Data retrieved successfully",
        timestamp: utc_timestamp(),
        response_time_ms,
    })
}

/// Deprecated endpoint that still works.
#[instrument(skip_all)]
pub async fn warning(Extension(correlation_id): Extension<CorrelationId>) -> Json<WarningResponse> {
    tracing::warn!(
        correlation_id = %correlation_id,
        endpoint = WARNING_ENDPOINT,
        recommendation = "Use /api/data instead",
        "Deprecated endpoint accessed"
    );

    Json(WarningResponse {
        message: "This endpoint is deprecated. Please use /api/data instead.",
        warning: true,
    })
}

/// Client error: request parameters fail validation.
#[instrument(skip_all)]
pub async fn validation_error(Extension(correlation_id): Extension<CorrelationId>) -> Response {
    rejected_page_size().into_logged_response(correlation_id, ERROR_ENDPOINT)
}

/// Server error: a required dependency is unavailable.
#[instrument(skip_all)]
pub async fn critical_error(Extension(correlation_id): Extension<CorrelationId>) -> Response {
    primary_store_unavailable().into_logged_response(correlation_id, CRITICAL_ENDPOINT)
}

fn rejected_page_size() -> ScenarioError {
    ScenarioError::Validation {
        source: InvalidParameter {
            name: "page_size",
            value: SIMULATED_PAGE_SIZE.to_string(),
        },
    }
}

fn primary_store_unavailable() -> ScenarioError {
    ScenarioError::Critical {
        source: io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "primary datastore refused connection",
        ),
    }
}
