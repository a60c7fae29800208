//! Fallback handlers invoked by the router rather than by a matched route.
//!
//! The correlation ID may be missing here (a panic can escape before the
//! correlation middleware binds one), so it is looked up as an `Option`
//! and simply left out of the record when absent.

use std::any::Any;
use std::backtrace::Backtrace;
use std::time::Duration;

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::response::Response;
use tracing::instrument;

use crate::http::correlation::{CorrelationId, CorrelationIdExt};
use crate::http::request::full_url;
use crate::http::response::ErrorBody;
use crate::observability::panics;

/// An uncaught fault, summarised for the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub error_type: &'static str,
    pub message: String,
    /// `file:line:column` where the fault was raised, when known.
    pub location: Option<String>,
    /// Backtrace taken at the fault, when the panic hook saw it.
    pub backtrace: Option<String>,
}

impl Fault {
    /// Summarise a panic payload, picking up the report the panic hook
    /// recorded on this thread.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            message.to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "panic with non-string payload".to_string()
        };

        let report = panics::take_report();

        Self {
            error_type: "Panic",
            message,
            location: report.as_ref().and_then(|r| r.location.clone()),
            backtrace: report.map(|r| r.backtrace),
        }
    }
}

/// No route matched the request path.
#[instrument(skip_all)]
pub async fn not_found(request: Request) -> Response {
    let correlation_id = request.correlation_id();
    let method = request.method();
    let url = full_url(request.uri(), request.headers());

    tracing::warn!(
        correlation_id = correlation_id.map(display),
        method = %method,
        url = %url,
        "Route not found"
    );

    ErrorBody::new(
        "Not Found",
        format!("The route {} {} does not exist", method, url),
    )
    .into_response_with(StatusCode::NOT_FOUND)
}

/// The path matched but not with this method.
#[instrument(skip_all)]
pub async fn method_not_allowed(request: Request) -> Response {
    let correlation_id = request.correlation_id();
    let method = request.method();
    let url = full_url(request.uri(), request.headers());

    tracing::warn!(
        correlation_id = correlation_id.map(display),
        method = %method,
        url = %url,
        "Method not allowed"
    );

    ErrorBody::new(
        "Method Not Allowed",
        format!("Method {} is not allowed for {}", method, url),
    )
    .into_response_with(StatusCode::METHOD_NOT_ALLOWED)
}

/// Log an uncaught fault and build the generic 500 response.
pub fn internal_error(correlation_id: Option<CorrelationId>, fault: &Fault) -> Response {
    let backtrace = match &fault.backtrace {
        Some(backtrace) => backtrace.clone(),
        None => Backtrace::capture().to_string(),
    };

    tracing::error!(
        correlation_id = correlation_id.map(display),
        error_type = fault.error_type,
        error_message = %fault.message,
        location = fault.location.as_deref(),
        backtrace = %backtrace,
        "Internal server error"
    );

    ErrorBody::new("Internal Server Error", "An unexpected error occurred")
        .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
}

/// The request outlived the configured timeout.
pub fn request_timeout(
    correlation_id: Option<CorrelationId>,
    method: &Method,
    url: &str,
    limit: Duration,
) -> Response {
    tracing::warn!(
        correlation_id = correlation_id.map(display),
        method = %method,
        url = %url,
        timeout_secs = limit.as_secs(),
        "Request timed out"
    );

    ErrorBody::new(
        "Request Timeout",
        format!("The request did not complete within {} seconds", limit.as_secs()),
    )
    .into_response_with(StatusCode::REQUEST_TIMEOUT)
}

/// Last-resort panic handler for faults outside the correlation middleware.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    internal_error(None, &Fault::from_panic(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_from_str_panic() {
        let payload = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        let fault = Fault::from_panic(payload);
        assert_eq!(fault.error_type, "Panic");
        assert_eq!(fault.message, "boom");
    }

    #[test]
    fn test_fault_from_formatted_panic() {
        let payload = std::panic::catch_unwind(|| panic!("code {}", 7)).unwrap_err();
        assert_eq!(Fault::from_panic(payload).message, "code 7");
    }

    #[test]
    fn test_fault_from_other_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(
            Fault::from_panic(payload).message,
            "panic with non-string payload"
        );
    }

    #[test]
    fn test_fault_from_panic_carries_panic_site() {
        panics::install_hook();
        let payload = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        let fault = Fault::from_panic(payload);
        assert!(fault.location.unwrap().contains("fallback.rs"));
        assert!(fault.backtrace.is_some());
    }

    #[test]
    fn test_request_timeout_response() {
        let response = request_timeout(None, &Method::GET, "/slow", Duration::from_secs(3));
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_panic_response_without_correlation() {
        let response = panic_response(Box::new("late fault"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
