//! The registration/capacity core: pure functions over game values.
//!
//! Nothing in this module performs I/O. The repository fetches the latest
//! persisted game, these functions compute the new value, and the
//! repository writes it back under a version check.

pub mod command;
pub mod filter;
pub mod payment;
pub mod roster;
