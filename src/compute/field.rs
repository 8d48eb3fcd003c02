//! Grid geometry and flat field storage.
//!
//! Fields are stored row-major with `j = 0` as the bottom row, so that cell
//! `(i, j)` sits at normalized coordinate `((i + 0.5) / w, (j + 0.5) / h)` and
//! NDC `y = +1` maps to the top row.

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use super::BoundaryMode;

/// Largest grid extent per axis. Requests above this are clamped rather than
/// allowed to fail allocation inside the frame loop.
pub const MAX_GRID_DIM: usize = 2048;

/// Discretized simulation domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    /// Create a grid, clamping each axis to `[1, MAX_GRID_DIM]`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.clamp(1, MAX_GRID_DIM),
            height: height.clamp(1, MAX_GRID_DIM),
        }
    }

    /// Derive the grid from a display surface scaled by `resolution`.
    ///
    /// Negative or NaN products saturate to zero and are then clamped to one.
    pub fn from_surface(surface_width: f32, surface_height: f32, resolution: f32) -> Self {
        let width = (surface_width * resolution).round() as usize;
        let height = (surface_height * resolution).round() as usize;
        Self::new(width, height)
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Grids are never empty; provided for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of one cell in normalized coordinates.
    #[inline]
    pub fn cell_scale(&self) -> [f32; 2] {
        [1.0 / self.width as f32, 1.0 / self.height as f32]
    }

    /// `max(w, h) / (w, h)`: keeps advection speed independent of aspect.
    #[inline]
    pub fn aspect_ratio(&self) -> [f32; 2] {
        let longest = self.width.max(self.height) as f32;
        [longest / self.width as f32, longest / self.height as f32]
    }

    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        j * self.width + i
    }

    /// Normalized coordinate of a cell center.
    #[inline]
    pub fn uv(&self, i: usize, j: usize) -> [f32; 2] {
        [
            (i as f32 + 0.5) / self.width as f32,
            (j as f32 + 0.5) / self.height as f32,
        ]
    }

    /// Whether the cell lies on the outermost ring of the domain.
    #[inline]
    pub fn is_rim(&self, i: usize, j: usize) -> bool {
        i == 0 || j == 0 || i + 1 == self.width || j + 1 == self.height
    }
}

/// Value types that can live in a field and be bilinearly sampled.
pub trait Texel: Copy + Default + Send + Sync {
    fn lerp(a: Self, b: Self, t: f32) -> Self;
    fn component_min(a: Self, b: Self) -> Self;
    fn component_max(a: Self, b: Self) -> Self;
    /// `a + (a - b) * s`, the extrapolation used by error compensation.
    fn extrapolate(a: Self, b: Self, s: f32) -> Self;
    fn clamp_between(value: Self, lo: Self, hi: Self) -> Self {
        Self::component_min(Self::component_max(value, lo), hi)
    }
}

impl Texel for f32 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }

    #[inline]
    fn component_min(a: Self, b: Self) -> Self {
        a.min(b)
    }

    #[inline]
    fn component_max(a: Self, b: Self) -> Self {
        a.max(b)
    }

    #[inline]
    fn extrapolate(a: Self, b: Self, s: f32) -> Self {
        a + (a - b) * s
    }
}

impl Texel for [f32; 2] {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
    }

    #[inline]
    fn component_min(a: Self, b: Self) -> Self {
        [a[0].min(b[0]), a[1].min(b[1])]
    }

    #[inline]
    fn component_max(a: Self, b: Self) -> Self {
        [a[0].max(b[0]), a[1].max(b[1])]
    }

    #[inline]
    fn extrapolate(a: Self, b: Self, s: f32) -> Self {
        [a[0] + (a[0] - b[0]) * s, a[1] + (a[1] - b[1]) * s]
    }
}

/// A value per grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    data: Vec<T>,
    grid: Grid,
}

/// Scalar field (pressure, divergence).
pub type ScalarField = Field<f32>;

/// Two-component velocity field.
pub type VectorField = Field<[f32; 2]>;

impl<T: Texel> Field<T> {
    /// Zero-filled field covering `grid`.
    pub fn new(grid: Grid) -> Self {
        Self {
            data: vec![T::default(); grid.len()],
            grid,
        }
    }

    #[inline]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[self.grid.idx(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let idx = self.grid.idx(i, j);
        self.data[idx] = value;
    }

    /// Value at a possibly out-of-range cell, resolved by the boundary mode.
    #[inline]
    pub fn at(&self, i: isize, j: isize, boundary: BoundaryMode) -> T {
        let x = boundary.resolve(i, self.grid.width);
        let y = boundary.resolve(j, self.grid.height);
        self.data[y * self.grid.width + x]
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Copy another field of the same grid into this one.
    pub fn copy_from(&mut self, other: &Self) {
        debug_assert_eq!(self.grid, other.grid, "field grids differ");
        self.data.copy_from_slice(&other.data);
    }

    /// Resize to a new grid, discarding all contents.
    pub fn reallocate(&mut self, grid: Grid) {
        self.grid = grid;
        self.data.clear();
        self.data.resize(grid.len(), T::default());
    }

    /// Overwrite every row through `f(j, row)`.
    ///
    /// Rows are processed in parallel on native targets.
    pub fn update_rows<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        let width = self.grid.width;

        #[cfg(not(target_arch = "wasm32"))]
        self.data
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(j, row)| f(j, row));

        #[cfg(target_arch = "wasm32")]
        self.data
            .chunks_mut(width)
            .enumerate()
            .for_each(|(j, row)| f(j, row));
    }
}
