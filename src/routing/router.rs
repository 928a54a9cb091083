//! Route lookup and target URL construction.
//!
//! # Responsibilities
//! - Store compiled routes in priority order
//! - Classify a request path as API, Plugin or Info
//! - Build the upstream target URL for forwarding routes
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins; the API route is checked before the plugin route
//! - Explicit Info decision rather than a silent default

use axum::http::{HeaderValue, Uri};

use crate::config::validation::{parse_origin, ValidationError};
use crate::config::ProxyConfig;
use crate::routing::matcher::{AnyMatcher, Matcher, PathPrefixMatcher};

/// Path prefixes served by the movie-metadata API.
pub const API_PREFIXES: [&str; 2] = ["/3/", "/4/"];

/// Path prefix served by the plugin catalog.
pub const PLUGIN_PREFIX: &str = "/plugin/";

/// Leading segment removed from plugin paths before forwarding.
const PLUGIN_SEGMENT: &str = "/plugin";

/// Which upstream a forwarding route targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Api,
    Plugin,
}

impl RouteKind {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Api => "api",
            RouteKind::Plugin => "plugin",
        }
    }

    /// The `error` field of the 500 response when forwarding fails.
    pub fn failure_label(&self) -> &'static str {
        match self {
            RouteKind::Api => "API proxy failed",
            RouteKind::Plugin => "Plugin proxy failed",
        }
    }
}

/// Per-upstream request and response decoration, with header values
/// pre-validated at build time.
#[derive(Debug, Clone)]
pub struct UpstreamProfile {
    /// Origin without trailing slash.
    pub origin: String,
    pub user_agent: HeaderValue,
    pub accept: Option<HeaderValue>,
    /// Full `Cache-Control` value relayed to the client.
    pub cache_control: HeaderValue,
}

impl UpstreamProfile {
    /// Build a profile from config values. `section` names the config
    /// section in returned errors.
    pub fn new(
        section: &str,
        origin: &str,
        user_agent: &str,
        accept: Option<&str>,
        cache_max_age_secs: u64,
    ) -> Result<Self, ValidationError> {
        parse_origin(origin)
            .map_err(|reason| ValidationError::new(format!("{}.origin", section), reason))?;

        let user_agent = HeaderValue::from_str(user_agent).map_err(|_| {
            ValidationError::new(format!("{}.user_agent", section), "not a valid header value")
        })?;

        let accept = accept
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|_| {
                ValidationError::new(format!("{}.accept", section), "not a valid header value")
            })?;

        let cache_control = HeaderValue::from_str(&format!("public, max-age={}", cache_max_age_secs))
            .map_err(|_| {
                ValidationError::new(
                    format!("{}.cache_max_age_secs", section),
                    "not a valid header value",
                )
            })?;

        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            user_agent,
            accept,
            cache_control,
        })
    }
}

/// A compiled forwarding route.
#[derive(Debug)]
pub struct Route {
    pub kind: RouteKind,
    matcher: Box<dyn Matcher>,
    /// Leading path segment replaced by the origin, if any.
    strip_prefix: Option<&'static str>,
    pub upstream: UpstreamProfile,
}

impl Route {
    /// Returns true if this route serves the given path.
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    /// Build the upstream URL: origin + rewritten path + original query.
    ///
    /// An empty query (`/x?`) contributes nothing.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let rewritten = match self.strip_prefix {
            Some(prefix) => path.strip_prefix(prefix).unwrap_or(path),
            None => path,
        };

        let mut target = String::with_capacity(
            self.upstream.origin.len() + rewritten.len() + query.map_or(0, |q| q.len() + 1),
        );
        target.push_str(&self.upstream.origin);
        target.push_str(rewritten);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        target
    }
}

/// Outcome of classifying a request.
#[derive(Debug)]
pub enum RouteDecision<'a> {
    /// Forward to `route`'s upstream at `target`.
    Forward { route: &'a Route, target: String },
    /// Answer locally with the usage banner.
    Info,
}

/// The ordered route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Compile the route table from configuration.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ValidationError> {
        let api = UpstreamProfile::new(
            "api",
            &config.api.origin,
            &config.api.user_agent,
            config.api.accept.as_deref(),
            config.api.cache_max_age_secs,
        )?;
        let plugin = UpstreamProfile::new(
            "plugin",
            &config.plugin.origin,
            &config.plugin.user_agent,
            config.plugin.accept.as_deref(),
            config.plugin.cache_max_age_secs,
        )?;

        let routes = vec![
            Route {
                kind: RouteKind::Api,
                matcher: Box::new(AnyMatcher::prefixes(API_PREFIXES)),
                strip_prefix: None,
                upstream: api,
            },
            Route {
                kind: RouteKind::Plugin,
                matcher: Box::new(PathPrefixMatcher::new(PLUGIN_PREFIX)),
                strip_prefix: Some(PLUGIN_SEGMENT),
                upstream: plugin,
            },
        ];

        Ok(Self { routes })
    }

    /// Classify a request URI.
    pub fn decide(&self, uri: &Uri) -> RouteDecision<'_> {
        let path = uri.path();
        match self.routes.iter().find(|r| r.matches(path)) {
            Some(route) => RouteDecision::Forward {
                route,
                target: route.target_url(path, uri.query()),
            },
            None => RouteDecision::Info,
        }
    }

    /// All forwarding routes in match order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
