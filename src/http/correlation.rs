//! Request correlation.
//!
//! # Responsibilities
//! - Generate a correlation ID for every inbound request
//! - Make it available to handlers (request extensions) and to every log
//!   record emitted while the request is processed (the
//!   `correlation_middleware` span)
//! - Log request receipt before any handler runs
//! - Enforce the request timeout
//! - Convert panics escaping a handler into the internal-error fallback
//!
//! # Design Decisions
//! - A fresh UUID v4 per request; client-supplied IDs are not trusted
//! - The ID is immutable and dropped with the request
//! - Lookup is `Option`: fallbacks must cope with a missing ID

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderValue, Request as HttpRequest};
use axum::middleware::Next;
use axum::response::Response;
use futures_util::FutureExt;
use tracing::Instrument;
use uuid::Uuid;

use crate::http::request::RequestInfo;
use crate::http::server::AppState;
use crate::observability::metrics::{self, UNMATCHED_ROUTE};
use crate::scenarios::fallback::{self, Fault};

/// Response header echoing the correlation ID back to the client.
pub const X_CORRELATION_ID: &str = "x-correlation-id";

/// Identifier shared by every log record of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a new random correlation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Lookup of the correlation ID bound to a request.
pub trait CorrelationIdExt {
    /// The bound ID, or `None` if the correlation middleware did not run.
    fn correlation_id(&self) -> Option<CorrelationId>;
}

impl<B> CorrelationIdExt for HttpRequest<B> {
    fn correlation_id(&self) -> Option<CorrelationId> {
        self.extensions().get::<CorrelationId>().copied()
    }
}

/// Lifecycle hook run before every request, matched or not.
///
/// Binds a new [`CorrelationId`], logs "Request received", runs the rest of
/// the stack inside a span named after this hook with the request timeout
/// applied, and tags the response.
pub async fn correlation_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let correlation_id = CorrelationId::new();
    request.extensions_mut().insert(correlation_id);

    let info = RequestInfo::from_request(&request);
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let span = tracing::info_span!("correlation_middleware", correlation_id = %correlation_id);
    span.in_scope(|| {
        tracing::info!(
            method = %info.method,
            url = %info.url,
            remote_addr = info.remote_addr.map(tracing::field::display),
            user_agent = info.user_agent.as_deref(),
            correlation_id = %correlation_id,
            "Request received"
        );
    });

    let handled = AssertUnwindSafe(next.run(request)).catch_unwind();
    let outcome = tokio::time::timeout(state.request_timeout, handled)
        .instrument(span.clone())
        .await;

    let mut response = match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(panic)) => span.in_scope(|| {
            fallback::internal_error(Some(correlation_id), &Fault::from_panic(panic))
        }),
        Err(_elapsed) => span.in_scope(|| {
            fallback::request_timeout(
                Some(correlation_id),
                &info.method,
                &info.url,
                state.request_timeout,
            )
        }),
    };

    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(X_CORRELATION_ID, value);
    }

    metrics::record_request(
        info.method.as_str(),
        &route,
        response.status().as_u16(),
        start,
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::collections::HashSet;

    #[test]
    fn correlation_id_unique() {
        let ids: HashSet<_> = (0..1000).map(|_| CorrelationId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn correlation_id_is_uuid_v4() {
        let id = CorrelationId::new();
        assert_eq!(id.as_uuid().get_version_num(), 4);
        assert_eq!(id.to_string().len(), 36);
        assert_eq!(Uuid::parse_str(&id.to_string()).unwrap(), *id.as_uuid());
    }

    #[test]
    fn lookup_absent_without_middleware() {
        let req = HttpRequest::builder().body(Body::empty()).unwrap();
        assert_eq!(req.correlation_id(), None);

        let mut req = req;
        let id = CorrelationId::new();
        req.extensions_mut().insert(id);
        assert_eq!(req.correlation_id(), Some(id));
    }
}
