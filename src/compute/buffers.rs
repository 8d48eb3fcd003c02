//! Double-buffered storage owned by the solver.

use super::{Field, Grid, ScalarField, Texel, VectorField};

/// A pair of fields where one is current and the other is the write target.
///
/// `split` hands out the current buffer for reading and the other for
/// writing, so a pass can never read and write the same buffer.
#[derive(Debug, Clone)]
pub struct PingPong<T> {
    buffers: [Field<T>; 2],
    current: usize,
}

impl<T: Texel> PingPong<T> {
    pub fn new(grid: Grid) -> Self {
        Self {
            buffers: [Field::new(grid), Field::new(grid)],
            current: 0,
        }
    }

    #[inline]
    pub fn current(&self) -> &Field<T> {
        &self.buffers[self.current]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut Field<T> {
        &mut self.buffers[self.current]
    }

    /// `(read, write)`: the current buffer and the other one.
    #[inline]
    pub fn split(&mut self) -> (&Field<T>, &mut Field<T>) {
        let [a, b] = &mut self.buffers;
        if self.current == 0 { (a, b) } else { (b, a) }
    }

    /// The non-current buffer, for passes whose input lives elsewhere.
    #[inline]
    pub fn back_mut(&mut self) -> &mut Field<T> {
        &mut self.buffers[1 - self.current]
    }

    /// Make the other buffer current.
    #[inline]
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Reallocate both buffers, discarding contents.
    pub fn reallocate(&mut self, grid: Grid) {
        for buffer in &mut self.buffers {
            buffer.reallocate(grid);
        }
        self.current = 0;
    }

    pub fn grid(&self) -> Grid {
        self.current().grid()
    }
}

/// Every grid buffer the stage pipeline touches.
///
/// The scratch pair serves viscosity iterations and, earlier in the same
/// frame, the intermediate fields of error-compensated advection.
#[derive(Debug, Clone)]
pub struct FieldBuffers {
    pub velocity: PingPong<[f32; 2]>,
    pub pressure: PingPong<f32>,
    pub divergence: ScalarField,
    pub scratch: PingPong<[f32; 2]>,
}

impl FieldBuffers {
    /// Allocate all buffers for `grid`.
    pub fn allocate(grid: Grid) -> Self {
        let grid = Grid::new(grid.width, grid.height);
        Self {
            velocity: PingPong::new(grid),
            pressure: PingPong::new(grid),
            divergence: ScalarField::new(grid),
            scratch: PingPong::new(grid),
        }
    }

    /// Reallocate in place for a new grid. Field contents are discarded.
    pub fn resize(&mut self, grid: Grid) {
        let grid = Grid::new(grid.width, grid.height);
        self.velocity.reallocate(grid);
        self.pressure.reallocate(grid);
        self.divergence.reallocate(grid);
        self.scratch.reallocate(grid);
    }

    pub fn grid(&self) -> Grid {
        self.velocity.grid()
    }

    /// The authoritative velocity field.
    #[inline]
    pub fn velocity(&self) -> &VectorField {
        self.velocity.current()
    }
}
