//! Schema module - Configuration, palette and host message types.

mod config;
mod message;
mod palette;

pub use config::*;
pub use message::*;
pub use palette::*;
