//! JSON response bodies shared by handlers.
//!
//! Error bodies never carry internal details beyond a short message;
//! error chains and backtraces go to the log stream only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::observability::logging::utc_timestamp;

/// Body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ErrorBody {
    pub fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
            timestamp: None,
        }
    }

    /// Stamp the body with the current time.
    pub fn timestamped(mut self) -> Self {
        self.timestamp = Some(utc_timestamp());
        self
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}
