//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate prefix conditions)
//!     → Return: Forward { route, target URL } or Info
//!
//! Route Compilation (at startup and on reload):
//!     ProxyConfig
//!     → Validate origins and header values
//!     → Compile matchers in fixed order (API, Plugin)
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled ahead of time, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;

pub use router::{Route, RouteDecision, RouteKind, Router, UpstreamProfile};
