//! Domain layer: entities, store contracts and the pure parts of click tracking.
//!
//! # Architecture
//!
//! - [`entities`] - Links, users and tracking records
//! - [`repositories`] - Data access trait definitions
//! - [`classifier`] - Bot and link-preview classification contract
//! - [`alert_policy`] - Click alert budget and message rendering
//! - [`visit`] - Visit handed from the redirect handler to the worker
//! - [`visit_worker`] - Background consumer of the visit queue
//!
//! # Redirect Flow
//!
//! 1. The redirect handler resolves the destination and answers `307`
//! 2. A [`visit::Visit`] is sent to the bounded visit queue (non-blocking)
//! 3. [`visit_worker::run_visit_worker`] runs
//!    [`crate::application::services::TrackingService::track`] for it
//! 4. Human clicks are appended through [`repositories::ClickRepository`] and
//!    the returned count drives [`alert_policy::AlertPolicy`]

pub mod alert_policy;
pub mod classifier;
pub mod entities;
pub mod repositories;
pub mod visit;
pub mod visit_worker;
