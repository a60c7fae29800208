//! Request inspection.
//!
//! # Responsibilities
//! - Reconstruct the full request URL for logging
//! - Extract client details (remote address, user agent)
//!
//! # Design Decisions
//! - Absolute-form request targets are used as-is
//! - Otherwise the URL is rebuilt from the Host header; without one only
//!   the path and query are reported
//! - Remote address is the client IP without the port, known only when
//!   the server was started with connect info; omitted otherwise

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Method, Request, Uri};

/// The parts of a request recorded by the "Request received" log record.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub url: String,
    pub remote_addr: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl RequestInfo {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            url: full_url(request.uri(), request.headers()),
            remote_addr: request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip()),
            user_agent: request
                .headers()
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }
}

/// Full URL of a request, e.g. `http://localhost:5000/api/data?x=1`.
pub fn full_url(uri: &Uri, headers: &HeaderMap) -> String {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return uri.to_string();
    }

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{}{}", host, path_and_query),
        None => path_and_query.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_full_url_from_host_header() {
        let req = Request::builder()
            .uri("/api/data?page=2")
            .header("Host", "localhost:5000")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            full_url(req.uri(), req.headers()),
            "http://localhost:5000/api/data?page=2"
        );
    }

    #[test]
    fn test_full_url_absolute_form() {
        let req = Request::builder()
            .uri("http://example.com/health")
            .body(Body::empty())
            .unwrap();
        assert_eq!(full_url(req.uri(), req.headers()), "http://example.com/health");
    }

    #[test]
    fn test_full_url_without_host() {
        let req = Request::builder()
            .uri("/missing")
            .body(Body::empty())
            .unwrap();
        assert_eq!(full_url(req.uri(), req.headers()), "/missing");
    }

    #[test]
    fn test_request_info() {
        let addr: SocketAddr = "10.0.0.7:41000".parse().unwrap();
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/x")
            .header("Host", "svc")
            .header("User-Agent", "curl/8.0")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));

        let info = RequestInfo::from_request(&req);
        assert_eq!(info.method, Method::POST);
        assert_eq!(info.url, "http://svc/x");
        assert_eq!(info.remote_addr, Some(addr.ip()));
        assert_eq!(info.remote_addr.unwrap().to_string(), "10.0.0.7");
        assert_eq!(info.user_agent.as_deref(), Some("curl/8.0"));
    }
}
