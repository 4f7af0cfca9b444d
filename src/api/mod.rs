//! HTTP surface of LinkUp.
//!
//! The public redirect endpoint and health probe live next to the
//! token-protected links API under `/api`. Handlers stay thin: they parse the
//! request, call an application service and map its result to a response.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
