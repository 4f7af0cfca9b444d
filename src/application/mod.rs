//! Application layer services.
//!
//! Services consume repository and integration traits and give HTTP handlers
//! and the visit worker a small API.
//!
//! # Available Services
//!
//! - [`services::redirect_service::RedirectService`] - Short path resolution, cache first
//! - [`services::tracking_service::TrackingService`] - Classification, click recording and alerts
//! - [`services::link_service::LinkService`] - Tracked link creation and listing
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
