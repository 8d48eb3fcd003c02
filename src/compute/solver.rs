//! Fluid solver - runs the per-frame stage pipeline.

use crate::schema::FluidConfig;

use super::{
    FieldBuffers, ForceInput, Grid, VectorField, advect_velocity, apply_force, compute_divergence,
    diffuse, project, solve_pressure,
};

/// Owns the grid buffers and advances the velocity field one frame at a time.
#[derive(Debug, Clone)]
pub struct FluidSolver {
    buffers: FieldBuffers,
    /// Frames stepped since allocation.
    pub frame: u64,
    /// Accumulated simulation time (sum of `dt`).
    pub time: f32,
}

impl FluidSolver {
    pub fn new(grid: Grid) -> Self {
        Self {
            buffers: FieldBuffers::allocate(grid),
            frame: 0,
            time: 0.0,
        }
    }

    #[inline]
    pub fn grid(&self) -> Grid {
        self.buffers.grid()
    }

    /// Reallocate for `grid` if it differs from the current one.
    ///
    /// Returns whether buffers were reallocated. Field contents are lost.
    pub fn resize(&mut self, grid: Grid) -> bool {
        let grid = Grid::new(grid.width, grid.height);
        if grid == self.grid() {
            return false;
        }
        self.buffers.resize(grid);
        true
    }

    /// Current velocity field, valid until the next `step`.
    #[inline]
    pub fn velocity(&self) -> &VectorField {
        self.buffers.velocity()
    }

    #[inline]
    pub fn velocity_mut(&mut self) -> &mut VectorField {
        self.buffers.velocity.current_mut()
    }

    /// Run one frame: advection, force, viscosity, divergence, pressure,
    /// projection. The projected field becomes current.
    pub fn step(&mut self, config: &FluidConfig, force: &ForceInput) {
        let boundary = config.boundary_mode();
        let dt = config.dt;
        let buffers = &mut self.buffers;

        advect_velocity(
            &mut buffers.velocity,
            buffers.scratch.current_mut(),
            dt,
            config.bfecc,
            boundary,
        );

        apply_force(
            buffers.velocity.current_mut(),
            force,
            config.mouse_force,
            config.cursor_size,
            boundary,
        );

        let (current, back) = buffers.velocity.split();
        let velocity = if config.is_viscous {
            diffuse(
                current,
                &mut buffers.scratch,
                config.viscous,
                dt,
                config.iterations_viscous,
                boundary,
            )
        } else {
            current
        };

        compute_divergence(velocity, &mut buffers.divergence, dt, boundary);
        let pressure = solve_pressure(
            &buffers.divergence,
            &mut buffers.pressure,
            config.iterations_poisson,
            boundary,
        );
        project(velocity, pressure, back, dt, boundary);
        buffers.velocity.swap();

        self.frame += 1;
        self.time += dt;
    }
}
