//! Repository trait definitions for the domain layer.
//!
//! These traits are the store contract seen by the redirect pipeline and the
//! link management API. Concrete implementations live in
//! `crate::infrastructure::persistence`; mocks are generated with `mockall`.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Link lookup (destination and tracking record) and creation
//! - [`ClickRepository`] - Append-only click events
//! - [`UserRepository`] - Link owners
//! - [`TokenRepository`] - API token authentication

pub mod click_repository;
pub mod link_repository;
pub mod token_repository;
pub mod user_repository;

pub use click_repository::ClickRepository;
pub use link_repository::LinkRepository;
pub use token_repository::{ApiToken, TokenRepository};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
