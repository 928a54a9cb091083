//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener and serve until shutdown
//! - Dispatch requests to the routing table
//! - Swap in a new routing table on config reload

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ProxyConfig, ValidationError};
use crate::http::client::{ReqwestClient, UpstreamClient};
use crate::http::{proxy, response};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::routing::{RouteDecision, Router as ProxyRouter};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Errors raised while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid route configuration: {0}")]
    Routes(#[from] ValidationError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<ArcSwap<ProxyRouter>>,
    pub client: Arc<dyn UpstreamClient>,
    pub upstream_timeout: Duration,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    app: Router,
    config: ProxyConfig,
    routes: Arc<ArcSwap<ProxyRouter>>,
}

impl HttpServer {
    /// Create a server that reaches upstreams over the network.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let client = ReqwestClient::new(&config.timeouts, &config.client)?;
        Self::with_client(config, Arc::new(client))
    }

    /// Create a server on top of an arbitrary upstream client.
    pub fn with_client(
        config: ProxyConfig,
        client: Arc<dyn UpstreamClient>,
    ) -> Result<Self, ServerError> {
        let routes = Arc::new(ArcSwap::from_pointee(ProxyRouter::from_config(&config)?));

        let state = AppState {
            routes: routes.clone(),
            client,
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        };

        let app = Self::build_router(&config, state);
        Ok(Self {
            app,
            config,
            routes,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    let request_id = req
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        request_id = %request_id
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// The request-handling service, for in-process use.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Replace the routing table from a new configuration.
    pub fn reload(&self, config: &ProxyConfig) -> Result<(), ValidationError> {
        apply_config(&self.routes, config)
    }

    /// Run the server until `shutdown` fires, applying route updates from
    /// `config_updates` as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            api_origin = %self.config.api.origin,
            plugin_origin = %self.config.plugin.origin,
            "HTTP server starting"
        );

        let routes = self.routes.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                if let Err(e) = apply_config(&routes, &config) {
                    tracing::error!(error = %e, "Config update rejected, keeping current routes");
                }
            }
        });

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn apply_config(
    routes: &ArcSwap<ProxyRouter>,
    config: &ProxyConfig,
) -> Result<(), ValidationError> {
    let router = ProxyRouter::from_config(config)?;
    routes.store(Arc::new(router));
    tracing::info!(
        api_origin = %config.api.origin,
        plugin_origin = %config.plugin.origin,
        "Routes reloaded"
    );
    Ok(())
}

/// Main proxy handler.
/// Classifies the path, then either answers locally or forwards.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    let start = Instant::now();
    let routes = state.routes.load_full();
    let decision = routes.decide(request.uri());

    let (label, response) = match decision {
        RouteDecision::Info => {
            tracing::debug!(path = %request.uri().path(), "Serving usage banner");
            ("info", response::info())
        }
        RouteDecision::Forward { route, target } => {
            let response = proxy::forward(
                state.client.as_ref(),
                state.upstream_timeout,
                route,
                target,
                request,
            )
            .await;
            (route.kind.as_str(), response)
        }
    };

    metrics::record_request(label, response.status().as_u16(), start);
    response
}
