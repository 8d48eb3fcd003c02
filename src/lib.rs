//! Ether Fluid - Real-time Eulerian fluid velocity for animated backgrounds.
//!
//! This crate simulates a 2D incompressible velocity field on a grid sized
//! from a display surface, driven by a pointer or by an idle autopilot. Each
//! frame runs semi-Lagrangian advection (optionally error-compensated),
//! pointer forcing, optional viscosity, and a Jacobi pressure projection, then
//! hands the field to a compositor for color mapping.
//!
//! # Architecture
//!
//! - `schema`: Configuration, palette and host message types
//! - `compute`: Grid storage and the stage pipeline
//! - `control`: Pointer state machine and autopilot
//! - `runtime`: Command queue, frame loop, compositor seam and native worker
//!
//! # Example
//!
//! ```rust,no_run
//! use ether_fluid::{
//!     runtime::{NullCompositor, SimulationLoop},
//!     schema::{Command, FluidConfig, SurfaceSize},
//! };
//!
//! let mut sim = SimulationLoop::new(NullCompositor, FluidConfig::default());
//! sim.post(Command::Init {
//!     surface: SurfaceSize::new(800.0, 600.0),
//!     pixel_ratio: 1.0,
//!     initial_colors: Vec::new(),
//! })
//! .unwrap();
//! sim.post(Command::Start).unwrap();
//!
//! for frame in 0..60 {
//!     sim.tick(frame as f64 * 16.0);
//! }
//! ```

pub mod compute;
pub mod control;
pub mod runtime;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::{FieldStats, FluidSolver, Grid};
pub use runtime::{Compositor, SimulationLoop};
pub use schema::{Command, Event, FluidConfig};
