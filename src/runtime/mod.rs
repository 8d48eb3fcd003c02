//! Runtime module - Command handling, frame loop and compositor seam.

mod compositor;
mod queue;
mod simulation_loop;

#[cfg(not(target_arch = "wasm32"))]
mod worker;

pub use compositor::*;
pub use queue::*;
pub use simulation_loop::*;

#[cfg(not(target_arch = "wasm32"))]
pub use worker::*;
