//! Control module - Pointer tracking and the idle autopilot.

mod autopilot;
mod pointer;

pub use autopilot::AutoDriver;
pub use pointer::*;
