//! Edge reverse proxy for the TMDB API and the Emby plugin catalog.
//!
//! `/3/*` and `/4/*` go to the movie-metadata API, `/plugin/*` goes to the
//! plugin catalog, everything else gets a usage banner. Proxied responses
//! carry permissive CORS headers and a fixed cache directive.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
