//! Single-pass forwarding: shape → send → relay.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};

use crate::http::client::{UpstreamClient, UpstreamError};
use crate::http::{request, response};
use crate::observability::metrics;
use crate::routing::Route;

/// Forward `inbound` to `target` on `route`'s upstream.
///
/// Never fails: upstream errors and timeouts become the route's 500 JSON
/// response. No retry is attempted.
pub async fn forward(
    client: &dyn UpstreamClient,
    upstream_timeout: Duration,
    route: &Route,
    target: String,
    inbound: Request<Body>,
) -> Response<Body> {
    let (parts, body) = inbound.into_parts();

    // Path only: the query may carry credentials.
    tracing::debug!(
        route = route.kind.as_str(),
        method = %parts.method,
        path = %parts.uri.path(),
        has_body = request::carries_body(&parts.method),
        "Forwarding request"
    );

    let outbound = request::build_upstream_request(parts, body, &route.upstream, target);

    let result = match tokio::time::timeout(upstream_timeout, client.send(outbound)).await {
        Ok(result) => result,
        Err(_) => Err(UpstreamError::Timeout(upstream_timeout)),
    };

    match result {
        Ok(upstream) => response::relay(upstream, &route.upstream),
        Err(e) => {
            tracing::error!(route = route.kind.as_str(), error = %e, "Upstream request failed");
            metrics::record_upstream_failure(route.kind.as_str());
            response::proxy_failure(route.kind, &e)
        }
    }
}
