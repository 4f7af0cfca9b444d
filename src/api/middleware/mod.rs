//! Layers applied in front of the LinkUp handlers.
//!
//! `auth` guards `/api/*` with bearer tokens, `rate_limit` throttles every
//! route per client IP and `tracing` opens a span per request.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
