//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response with CORS and cache headers applied
//! - Map upstream failures to the structured 500 JSON response
//! - Serve the local usage banner
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Hop-by-hop headers stripped; the server frames the relayed body
//! - CORS and cache headers overwrite whatever the upstream sent

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL, CONTENT_TYPE,
};
use axum::http::{HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::http::client::UpstreamError;
use crate::http::request::is_hop_by_hop;
use crate::routing::{RouteKind, UpstreamProfile};

/// Body of the Info route.
pub const INFO_BANNER: &str = "Cf-tmdb Worker is running\n\nUsage:\n- TMDB API: /3/movie/550\n- Emby Plugin Catalog: /plugin/";

const ALLOW_ORIGIN: HeaderValue = HeaderValue::from_static("*");
const ALLOW_METHODS: HeaderValue = HeaderValue::from_static("GET, POST, OPTIONS");
const ALLOW_HEADERS: HeaderValue = HeaderValue::from_static("*");

/// JSON body returned when forwarding fails.
#[derive(Debug, Serialize)]
pub struct ProxyFailure {
    pub error: &'static str,
    pub message: String,
}

/// Decorate an upstream response for the client.
///
/// Status and body pass through untouched.
pub fn relay(mut upstream: Response<Body>, profile: &UpstreamProfile) -> Response<Body> {
    let headers = upstream.headers_mut();

    let hop_by_hop: Vec<_> = headers
        .keys()
        .filter(|name| is_hop_by_hop(name))
        .cloned()
        .collect();
    for name in hop_by_hop {
        headers.remove(name);
    }

    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN);
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS);
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS);
    headers.insert(CACHE_CONTROL, profile.cache_control.clone());

    upstream
}

/// The 500 response for a failed forward.
pub fn proxy_failure(kind: RouteKind, error: &UpstreamError) -> Response<Body> {
    let body = ProxyFailure {
        error: kind.failure_label(),
        message: error.to_string(),
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN)],
        Json(body),
    )
        .into_response()
}

/// The usage banner served for every non-proxied path.
pub fn info() -> Response<Body> {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        INFO_BANNER,
    )
        .into_response()
}
