//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, upstream origins and header values
//! - Validate value ranges (timeouts > 0, upstream below request limit)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `plugin.origin`.
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr("listener.bind_address", &config.listener.bind_address, &mut errors);
    if config.observability.metrics_enabled {
        check_socket_addr(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    for (field, secs) in [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }
    // The outer request limit must not pre-empt the upstream failure response.
    if config.timeouts.upstream_secs >= config.timeouts.request_secs {
        errors.push(ValidationError::new(
            "timeouts.upstream_secs",
            format!(
                "must be less than timeouts.request_secs ({})",
                config.timeouts.request_secs
            ),
        ));
    }

    check_upstream(
        "api",
        &config.api.origin,
        &config.api.user_agent,
        config.api.accept.as_deref(),
        &mut errors,
    );
    check_upstream(
        "plugin",
        &config.plugin.origin,
        &config.plugin.user_agent,
        config.plugin.accept.as_deref(),
        &mut errors,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse an upstream origin: absolute http(s) URL with a host and no query
/// or fragment. A base path is allowed.
pub fn parse_origin(origin: &str) -> Result<Url, String> {
    let url = Url::parse(origin).map_err(|e| format!("invalid URL `{}`: {}", origin, e))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not carry a query or fragment".to_string());
    }

    Ok(url)
}

fn check_socket_addr(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if let Err(e) = value.parse::<SocketAddr>() {
        errors.push(ValidationError::new(field, format!("`{}`: {}", value, e)));
    }
}

fn check_upstream(
    section: &str,
    origin: &str,
    user_agent: &str,
    accept: Option<&str>,
    errors: &mut Vec<ValidationError>,
) {
    if let Err(reason) = parse_origin(origin) {
        errors.push(ValidationError::new(format!("{}.origin", section), reason));
    }
    if HeaderValue::from_str(user_agent).is_err() {
        errors.push(ValidationError::new(
            format!("{}.user_agent", section),
            "not a valid header value",
        ));
    }
    if let Some(accept) = accept {
        if HeaderValue::from_str(accept).is_err() {
            errors.push(ValidationError::new(
                format!("{}.accept", section),
                "not a valid header value",
            ));
        }
    }
}
