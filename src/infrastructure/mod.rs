//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - Destination cache (Redis and no-op implementations)
//! - [`classifier`] - Signature-based bot and preview classifier
//! - [`notifier`] - Outbound alert email (SendGrid and log-only)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod classifier;
pub mod notifier;
pub mod persistence;
