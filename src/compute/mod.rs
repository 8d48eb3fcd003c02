//! Compute module - Grid storage and the fluid stage pipeline.

mod advection;
mod buffers;
mod field;
mod force;
mod pressure;
mod sampling;
mod solver;
mod stats;
mod viscosity;

pub use advection::*;
pub use buffers::*;
pub use field::*;
pub use force::*;
pub use pressure::*;
pub use sampling::*;
pub use solver::*;
pub use stats::*;
pub use viscosity::*;
