//! Interaction snapshot types and the response lifecycle controller.

pub mod member;
pub mod port;
pub mod responder;
pub mod types;
