//! Core domain + response lifecycle for Discord interactions.
//!
//! This crate is intentionally transport-agnostic. HTTP execution lives
//! behind ports (traits) implemented in adapter crates (`dix-rest`).

pub mod domain;
pub mod errors;
pub mod identity;
pub mod interaction;
pub mod logging;

pub use errors::{Error, Result};
