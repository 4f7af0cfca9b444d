//! Helpers shared across layers.
//!
//! - [`db_error`] - Which database errors are safe to retry
//! - [`path_generator`] - Random short paths and API tokens
//! - [`request_signals`] - Client IPs and User-Agent from request headers
//! - [`url_normalizer`] - Destination URL normalization

pub mod db_error;
pub mod path_generator;
pub mod request_signals;
pub mod url_normalizer;
