//! Request gating for Freezer.
//!
//! Everything that decides whether a request may reach the object storage
//! lives here: session tokens, fixed-window rate limiters over a shared counter
//! store, the access gateway combining them and the navigation guard for page
//! routes. Route handlers live in the feature crates.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod extract;
pub mod gateway;
pub mod middleware;
pub mod navigation;
pub mod prelude;
pub mod rate_limit;
pub mod session;

// Re-export commonly used types
pub use app::{App, AppBuilderOpts, AppState, ServerMode};
pub use config::{Credentials, GatewayConfig, Secret};
pub use extract::{Authorized, ClientAddr, ProtectedResource};
pub use gateway::{AccessGateway, Decision, GateRequest};
pub use session::{SessionTokenService, TokenCheck};

// vim: ts=4
