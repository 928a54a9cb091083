//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → routing layer classifies the path
//!     → Info: response.rs banner
//!     → Forward: proxy.rs
//!         → request.rs (strip headers, apply route headers, body policy)
//!         → client.rs (UpstreamClient sends)
//!         → response.rs (CORS + cache headers, or 500 JSON)
//!     → Send to client
//! ```

pub mod client;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use client::{ReqwestClient, UpstreamClient, UpstreamError, UpstreamRequest};
pub use server::{AppState, HttpServer, ServerError, X_REQUEST_ID};
