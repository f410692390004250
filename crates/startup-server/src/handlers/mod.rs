//! Route handlers.

pub mod channel;
pub mod health;
pub mod render;
