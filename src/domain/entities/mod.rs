//! Core domain entities.
//!
//! - [`Link`] - A tracked short path owned by a user
//! - [`User`] - A link owner
//!
//! Creation inputs use separate structs (`NewLink`), and read models that
//! join several tables (`TrackingRecord`, `LinkSummary`) live next to the
//! entity they describe.

pub mod link;
pub mod user;

pub use link::{Link, LinkSummary, NewLink, TrackingRecord};
pub use user::User;
