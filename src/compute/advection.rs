//! Semi-Lagrangian self-advection of the velocity field.
//!
//! Each cell traces backward along the velocity and samples the field at the
//! departure point. With error compensation enabled (BFECC) the step is run
//! forward, then backward, and half of the round-trip error is removed from
//! the source before the final forward step. The result is limited to the
//! range of the source texels around the departure point so the correction
//! cannot introduce new extrema.

use super::{BoundaryMode, PingPong, Texel, VectorField, footprint, sample};

/// Advect `source` along `velocity` for one step of `dt`, writing `out`.
///
/// A negative `dt` traces forward instead of backward.
pub fn advect_into(
    source: &VectorField,
    velocity: &VectorField,
    out: &mut VectorField,
    dt: f32,
    boundary: BoundaryMode,
) {
    let grid = out.grid();
    let ratio = grid.aspect_ratio();

    out.update_rows(|j, row| {
        for (i, cell) in row.iter_mut().enumerate() {
            if boundary.is_wall(grid, i, j) {
                *cell = [0.0, 0.0];
                continue;
            }
            let uv = grid.uv(i, j);
            let v = velocity.get(i, j);
            let departure = [uv[0] - v[0] * dt * ratio[0], uv[1] - v[1] * dt * ratio[1]];
            *cell = sample(source, departure, boundary);
        }
    });
}

/// Error-compensated advection (BFECC) of `source` along `velocity`.
///
/// `scratch` receives the backward trace and then the corrected source; its
/// previous contents are irrelevant.
pub fn advect_compensated_into(
    source: &VectorField,
    velocity: &VectorField,
    out: &mut VectorField,
    scratch: &mut VectorField,
    dt: f32,
    boundary: BoundaryMode,
) {
    let grid = out.grid();
    let ratio = grid.aspect_ratio();

    // Forward, then back again: scratch holds the round-tripped source.
    advect_into(source, velocity, out, dt, boundary);
    advect_into(out, velocity, scratch, -dt, boundary);

    // source - (roundtrip - source) / 2
    scratch.update_rows(|j, row| {
        for (i, cell) in row.iter_mut().enumerate() {
            *cell = Texel::extrapolate(source.get(i, j), *cell, 0.5);
        }
    });

    let corrected: &VectorField = scratch;
    out.update_rows(|j, row| {
        for (i, cell) in row.iter_mut().enumerate() {
            if boundary.is_wall(grid, i, j) {
                *cell = [0.0, 0.0];
                continue;
            }
            let uv = grid.uv(i, j);
            let v = velocity.get(i, j);
            let departure = [uv[0] - v[0] * dt * ratio[0], uv[1] - v[1] * dt * ratio[1]];
            let value = sample(corrected, departure, boundary);
            let (lo, hi) = footprint(source, departure, boundary).bounds();
            *cell = Texel::clamp_between(value, lo, hi);
        }
    });
}

/// Self-advect the current velocity into the back buffer and swap.
pub fn advect_velocity(
    velocity: &mut PingPong<[f32; 2]>,
    scratch: &mut VectorField,
    dt: f32,
    error_compensation: bool,
    boundary: BoundaryMode,
) {
    {
        let (current, next) = velocity.split();
        if error_compensation {
            advect_compensated_into(current, current, next, scratch, dt, boundary);
        } else {
            advect_into(current, current, next, dt, boundary);
        }
    }
    velocity.swap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Grid;

    /// Narrow bump in the x component, centered on column `center`.
    fn bump(grid: Grid, center: usize) -> VectorField {
        let mut field = VectorField::new(grid);
        for j in 0..grid.height {
            for di in 0..3 {
                field.set(center + di - 1, j, [1.0, 0.0]);
            }
        }
        field
    }

    fn uniform(grid: Grid, v: [f32; 2]) -> VectorField {
        let mut field = VectorField::new(grid);
        field.fill(v);
        field
    }

    /// Energy of the x component farther than `radius` columns from `center`.
    fn spread_outside(field: &VectorField, center: f32, radius: f32) -> f32 {
        let grid = field.grid();
        let mut energy = 0.0;
        for j in 0..grid.height {
            for i in 0..grid.width {
                if (i as f32 - center).abs() > radius {
                    let v = field.get(i, j)[0];
                    energy += v * v;
                }
            }
        }
        energy
    }

    #[test]
    fn test_zero_velocity_is_identity() {
        let grid = Grid::new(16, 16);
        let source = bump(grid, 8);
        let velocity = VectorField::new(grid);
        let mut out = VectorField::new(grid);
        advect_into(&source, &velocity, &mut out, 0.014, BoundaryMode::Bounce);
        assert_eq!(out, source);
    }

    #[test]
    fn test_uniform_flow_moves_bump_downstream() {
        let grid = Grid::new(32, 8);
        let source = bump(grid, 10);
        // One full cell per step: v * dt * ratio = 1/32
        let velocity = uniform(grid, [1.0 / 32.0, 0.0]);
        let mut out = VectorField::new(grid);
        advect_into(&source, &velocity, &mut out, 1.0, BoundaryMode::Bounce);

        for j in 0..grid.height {
            assert!((out.get(11, j)[0] - 1.0).abs() < 1e-5);
            assert!(out.get(8, j)[0].abs() < 1e-5, "trailing edge should be empty");
        }
    }

    #[test]
    fn test_error_compensation_reduces_spread() {
        let grid = Grid::new(96, 4);
        let start = 20usize;
        // 0.37 cells per step so every step interpolates
        let cells_per_step = 0.37f32;
        let steps = 40;
        let velocity = uniform(grid, [cells_per_step / grid.width as f32, 0.0]);

        let mut plain = bump(grid, start);
        let mut compensated = plain.clone();
        let mut out = VectorField::new(grid);
        let mut scratch = VectorField::new(grid);

        for _ in 0..steps {
            advect_into(&plain, &velocity, &mut out, 1.0, BoundaryMode::Bounce);
            std::mem::swap(&mut plain, &mut out);

            advect_compensated_into(
                &compensated,
                &velocity,
                &mut out,
                &mut scratch,
                1.0,
                BoundaryMode::Bounce,
            );
            std::mem::swap(&mut compensated, &mut out);
        }

        let center = start as f32 + cells_per_step * steps as f32;
        let plain_spread = spread_outside(&plain, center, 2.0);
        let compensated_spread = spread_outside(&compensated, center, 2.0);

        assert!(
            compensated_spread < plain_spread,
            "BFECC should spread less: {} vs plain {}",
            compensated_spread,
            plain_spread
        );
    }

    #[test]
    fn test_contained_keeps_rim_at_zero() {
        let grid = Grid::new(12, 12);
        let mut velocity = PingPong::new(grid);
        velocity.current_mut().fill([0.3, -0.2]);
        let mut scratch = VectorField::new(grid);

        advect_velocity(&mut velocity, &mut scratch, 0.014, true, BoundaryMode::Contained);

        let field = velocity.current();
        for j in 0..grid.height {
            for i in 0..grid.width {
                if grid.is_rim(i, j) {
                    assert_eq!(field.get(i, j), [0.0, 0.0], "rim ({}, {}) must be zero", i, j);
                }
            }
        }
        assert!(field.get(6, 6)[0] > 0.0, "interior keeps its motion");
    }

    #[test]
    fn test_self_advection_swaps_buffers() {
        let grid = Grid::new(8, 8);
        let mut velocity = PingPong::new(grid);
        velocity.current_mut().fill([0.1, 0.1]);
        let mut scratch = VectorField::new(grid);

        advect_velocity(&mut velocity, &mut scratch, 0.014, false, BoundaryMode::Bounce);

        // Uniform field self-advects to itself
        for v in velocity.current().as_slice() {
            assert!((v[0] - 0.1).abs() < 1e-6 && (v[1] - 0.1).abs() < 1e-6);
        }
    }
}
