//! Upstream HTTP client capability.
//!
//! # Responsibilities
//! - Define the single seam through which the proxy reaches the network
//! - Provide the production implementation on top of reqwest
//! - Collapse every transport failure into [`UpstreamError`]
//!
//! # Design Decisions
//! - Trait object with boxed futures so handlers stay non-generic and tests
//!   can swap in a fake upstream
//! - Bodies stream in both directions; nothing is buffered here
//! - Redirects are relayed to the client, not followed

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Response};
use futures_util::future::BoxFuture;

use crate::config::{ClientConfig, TimeoutConfig};

/// A fully shaped outbound request.
#[derive(Debug)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Absolute target URL.
    pub url: String,
    pub headers: HeaderMap,
    /// `None` for GET and HEAD.
    pub body: Option<Body>,
}

/// Any failure while issuing or awaiting the outbound request.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Transport failure, with the target URL removed.
    #[error("{}", error_chain(.0))]
    Http(reqwest::Error),

    #[error("upstream did not respond within {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("{0}")]
    Connection(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries query credentials such as `api_key`.
        Self::Http(err.without_url())
    }
}

/// Join an error with its causes, e.g. `error sending request: connection refused`.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// The proxy's view of the network.
pub trait UpstreamClient: Send + Sync + 'static {
    /// Issue `request` and resolve once the response head has arrived.
    fn send(&self, request: UpstreamRequest) -> BoxFuture<'static, Result<Response<Body>, UpstreamError>>;
}

/// reqwest-backed upstream client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Build the client from timeout and client settings.
    pub fn new(timeouts: &TimeoutConfig, client: &ClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .redirect(reqwest::redirect::Policy::none());

        if !client.system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            inner: builder.build()?,
        })
    }
}

impl UpstreamClient for ReqwestClient {
    fn send(&self, request: UpstreamRequest) -> BoxFuture<'static, Result<Response<Body>, UpstreamError>> {
        let mut builder = self
            .inner
            .request(request.method, request.url.as_str())
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        Box::pin(async move {
            let upstream = builder.send().await?;

            let status = upstream.status();
            let headers = upstream.headers().clone();

            let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UpstreamError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "upstream did not respond within 30 seconds");

        let err = UpstreamError::Connection("connection refused".into());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_client_builds_from_defaults() {
        let client = ReqwestClient::new(&TimeoutConfig::default(), &ClientConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ReqwestClient::new(
            &TimeoutConfig::default(),
            &ClientConfig { system_proxy: false },
        )
        .unwrap();

        let result = client
            .send(UpstreamRequest {
                method: Method::GET,
                url: format!("http://{}/3/movie/550", addr),
                headers: HeaderMap::new(),
                body: None,
            })
            .await;

        assert!(matches!(result, Err(UpstreamError::Http(_))));
    }

    #[tokio::test]
    async fn test_transport_error_hides_query_and_names_cause() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ReqwestClient::new(
            &TimeoutConfig::default(),
            &ClientConfig { system_proxy: false },
        )
        .unwrap();

        let err = client
            .send(UpstreamRequest {
                method: Method::GET,
                url: format!("http://{}/3/movie/550?api_key=SECRET", addr),
                headers: HeaderMap::new(),
                body: None,
            })
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(!message.contains("api_key"), "{}", message);
        assert!(!message.contains("SECRET"), "{}", message);
        assert!(!message.contains("/3/movie/550"), "{}", message);
        assert!(message.starts_with("error sending request"), "{}", message);
        assert!(message.contains(": "), "cause missing: {}", message);
    }
}
