//! Endpoint handlers.

pub mod publish;
pub mod system;
