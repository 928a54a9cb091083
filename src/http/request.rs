//! Request handling and transformation.
//!
//! # Responsibilities
//! - Drop client credentials and session state before forwarding
//! - Drop connection-scoped (hop-by-hop) headers
//! - Apply the route's fixed User-Agent and Accept headers
//! - Decide whether the inbound body travels upstream
//!
//! # Design Decisions
//! - `HeaderName` is always lowercase, so removal is case-insensitive
//! - GET and HEAD never carry a body upstream
//! - Original request is consumed; the outbound copy is built fresh

use axum::body::Body;
use axum::http::header::{
    HeaderMap, HeaderName, ACCEPT, AUTHORIZATION, CONTENT_LENGTH, COOKIE, HOST, USER_AGENT,
};
use axum::http::request::Parts;
use axum::http::Method;

use crate::http::client::UpstreamRequest;
use crate::routing::UpstreamProfile;

/// Inbound headers never forwarded upstream.
pub const STRIPPED_HEADERS: [HeaderName; 3] = [HOST, COOKIE, AUTHORIZATION];

/// Connection-scoped headers, meaningful only for a single hop.
pub const HOP_BY_HOP_HEADERS: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Whether a request with this method forwards its body.
pub fn carries_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}

/// Build the outbound header set from the inbound one.
pub fn outbound_headers(inbound: &HeaderMap, profile: &UpstreamProfile, with_body: bool) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 2);

    for (name, value) in inbound {
        if STRIPPED_HEADERS.contains(name) || is_hop_by_hop(name) {
            continue;
        }
        if !with_body && *name == CONTENT_LENGTH {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Some(accept) = &profile.accept {
        headers.insert(ACCEPT, accept.clone());
    }
    headers.insert(USER_AGENT, profile.user_agent.clone());

    headers
}

/// Returns true for headers that must not cross a proxy.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

/// Shape an inbound request into the outbound request for `target`.
pub fn build_upstream_request(
    parts: Parts,
    body: Body,
    profile: &UpstreamProfile,
    target: String,
) -> UpstreamRequest {
    let with_body = carries_body(&parts.method);
    let headers = outbound_headers(&parts.headers, profile, with_body);

    UpstreamRequest {
        method: parts.method,
        url: target,
        headers,
        body: with_body.then_some(body),
    }
}
