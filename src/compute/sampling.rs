//! Boundary handling and bilinear field sampling.

use serde::{Deserialize, Serialize};

use super::{Field, Grid, Texel};

/// How the domain edge behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryMode {
    /// The one-cell rim is a wall held at zero; samples past it clamp.
    #[default]
    Contained,
    /// Every cell is simulated; samples past the edge mirror back inside.
    Bounce,
}

impl BoundaryMode {
    /// Map a possibly out-of-range index onto `[0, n)`.
    #[inline]
    pub fn resolve(self, index: isize, n: usize) -> usize {
        let n = n as isize;
        match self {
            BoundaryMode::Contained => index.clamp(0, n - 1) as usize,
            BoundaryMode::Bounce => {
                // Symmetric reflection: -1 -> 0, -2 -> 1, n -> n-1.
                let period = 2 * n;
                let m = index.rem_euclid(period);
                if m < n {
                    m as usize
                } else {
                    (period - 1 - m) as usize
                }
            }
        }
    }

    /// Whether a stage must leave this cell at zero instead of computing it.
    #[inline]
    pub fn is_wall(self, grid: Grid, i: usize, j: usize) -> bool {
        self == BoundaryMode::Contained && grid.is_rim(i, j)
    }
}

/// The four texels around a sample point and the interpolation weights.
#[derive(Debug, Clone, Copy)]
pub struct Footprint<T> {
    pub texels: [T; 4],
    pub fx: f32,
    pub fy: f32,
}

impl<T: Texel> Footprint<T> {
    #[inline]
    pub fn interpolate(&self) -> T {
        let [t00, t10, t01, t11] = self.texels;
        let bottom = T::lerp(t00, t10, self.fx);
        let top = T::lerp(t01, t11, self.fx);
        T::lerp(bottom, top, self.fy)
    }

    /// Per-component `(min, max)` of the four texels.
    #[inline]
    pub fn bounds(&self) -> (T, T) {
        let [t00, t10, t01, t11] = self.texels;
        let lo = T::component_min(T::component_min(t00, t10), T::component_min(t01, t11));
        let hi = T::component_max(T::component_max(t00, t10), T::component_max(t01, t11));
        (lo, hi)
    }
}

/// Gather the bilinear footprint of `field` at normalized coordinate `uv`.
#[inline]
pub fn footprint<T: Texel>(field: &Field<T>, uv: [f32; 2], boundary: BoundaryMode) -> Footprint<T> {
    let grid = field.grid();
    let x = uv[0] * grid.width as f32 - 0.5;
    let y = uv[1] * grid.height as f32 - 0.5;
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = if (x - x0).is_finite() { x - x0 } else { 0.0 };
    let fy = if (y - y0).is_finite() { y - y0 } else { 0.0 };

    let i0 = x0 as isize;
    let j0 = y0 as isize;
    let i1 = i0.saturating_add(1);
    let j1 = j0.saturating_add(1);

    Footprint {
        texels: [
            field.at(i0, j0, boundary),
            field.at(i1, j0, boundary),
            field.at(i0, j1, boundary),
            field.at(i1, j1, boundary),
        ],
        fx,
        fy,
    }
}

/// Bilinear sample of `field` at normalized coordinate `uv`.
#[inline]
pub fn sample<T: Texel>(field: &Field<T>, uv: [f32; 2], boundary: BoundaryMode) -> T {
    footprint(field, uv, boundary).interpolate()
}
