//! Data models for the pickup sports coordination application.
//!
//! These models preserve the legacy schema field names exactly for
//! interoperability with rows written before the rewrite.

mod game;
mod user;

pub use game::*;
pub use user::*;
