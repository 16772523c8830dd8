//! Signal fusion and alert rendering.

pub mod engine;
pub mod message;

pub use engine::*;
pub use message::*;
