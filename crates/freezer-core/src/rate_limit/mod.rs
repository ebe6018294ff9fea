//! Fixed-window rate limiting over a shared counter store
//!
//! Counters live in a [`CounterAdapter`](freezer_types::counter_adapter::CounterAdapter)
//! so every server instance sees the same counts. The limiters fail open: when
//! the store is slow or unreachable the request is allowed and a warning is
//! logged.

pub mod config;
pub mod extractors;
pub mod global;
pub mod limiter;

pub use config::WindowLimit;
pub use extractors::{ClientIdentity, extract_client_identity};
pub use global::GlobalRateLimiter;
pub use limiter::{ClientRateLimiter, FixedWindowLimiter, RateDecision};

// vim: ts=4
