//! Implicit velocity diffusion by Jacobi iteration.

use super::{BoundaryMode, PingPong, VectorField};

/// Offset, in cells, of the neighbor samples in each Jacobi update.
const NEIGHBOR_OFFSET: isize = 2;

/// One Jacobi iteration: `prev` is the previous iterate, `original` the
/// velocity before diffusion.
///
/// `new = (4 * original + nu * dt * sum(prev at +-2 cells)) / (4 * (1 + nu * dt))`
pub fn jacobi_viscosity_step(
    original: &VectorField,
    prev: &VectorField,
    next: &mut VectorField,
    viscosity: f32,
    dt: f32,
    boundary: BoundaryMode,
) {
    let grid = next.grid();
    let alpha = viscosity * dt;
    let denom = 4.0 * (1.0 + alpha);
    let o = NEIGHBOR_OFFSET;

    next.update_rows(|j, row| {
        let jj = j as isize;
        for (i, cell) in row.iter_mut().enumerate() {
            if boundary.is_wall(grid, i, j) {
                *cell = [0.0, 0.0];
                continue;
            }
            let ii = i as isize;
            let old = original.get(i, j);
            let r = prev.at(ii + o, jj, boundary);
            let l = prev.at(ii - o, jj, boundary);
            let t = prev.at(ii, jj + o, boundary);
            let b = prev.at(ii, jj - o, boundary);
            *cell = [
                (4.0 * old[0] + alpha * (r[0] + l[0] + t[0] + b[0])) / denom,
                (4.0 * old[1] + alpha * (r[1] + l[1] + t[1] + b[1])) / denom,
            ];
        }
    });
}

/// Diffuse `velocity` over `iterations` Jacobi steps using the scratch pair.
///
/// Returns the scratch buffer holding the final iterate, which becomes the
/// velocity seen by the rest of the frame.
pub fn diffuse<'a>(
    velocity: &VectorField,
    scratch: &'a mut PingPong<[f32; 2]>,
    viscosity: f32,
    dt: f32,
    iterations: usize,
    boundary: BoundaryMode,
) -> &'a VectorField {
    scratch.current_mut().copy_from(velocity);
    for _ in 0..iterations {
        let (prev, next) = scratch.split();
        jacobi_viscosity_step(velocity, prev, next, viscosity, dt, boundary);
        scratch.swap();
    }
    scratch.current()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Grid;

    fn swirl(grid: Grid) -> VectorField {
        let mut field = VectorField::new(grid);
        for j in 1..grid.height - 1 {
            for i in 1..grid.width - 1 {
                let x = i as f32 / grid.width as f32 - 0.5;
                let y = j as f32 / grid.height as f32 - 0.5;
                field.set(i, j, [-y * 3.0, x * 3.0]);
            }
        }
        field
    }

    #[test]
    fn test_zero_viscosity_is_identity() {
        let grid = Grid::new(24, 16);
        let velocity = swirl(grid);
        let mut scratch = PingPong::new(grid);
        let result = diffuse(&velocity, &mut scratch, 0.0, 0.014, 32, BoundaryMode::Contained);

        for (a, b) in result.as_slice().iter().zip(velocity.as_slice()) {
            assert!(
                (a[0] - b[0]).abs() < 1e-6 && (a[1] - b[1]).abs() < 1e-6,
                "zero viscosity must not change the field: {:?} vs {:?}",
                a,
                b
            );
        }
    }

    #[test]
    fn test_zero_iterations_returns_copy() {
        let grid = Grid::new(8, 8);
        let velocity = swirl(grid);
        let mut scratch = PingPong::new(grid);
        let result = diffuse(&velocity, &mut scratch, 30.0, 0.014, 0, BoundaryMode::Bounce);
        assert_eq!(result, &velocity);
    }

    #[test]
    fn test_viscosity_never_amplifies() {
        let grid = Grid::new(32, 32);
        let mut velocity = VectorField::new(grid);
        for j in 0..grid.height {
            for i in 0..grid.width {
                let s = if (i / 3 + j / 5) % 2 == 0 { 1.0 } else { -1.0 };
                velocity.set(i, j, [s, -0.5 * s]);
            }
        }
        let mut scratch = PingPong::new(grid);
        let result = diffuse(&velocity, &mut scratch, 30.0, 0.014, 32, BoundaryMode::Bounce);

        let max_after = result
            .as_slice()
            .iter()
            .map(|v| v[0].abs().max(v[1].abs()))
            .fold(0.0f32, f32::max);
        assert!(max_after <= 1.0 + 1e-6, "Jacobi averaging cannot exceed input range: {}", max_after);
        assert!(
            result.as_slice() != velocity.as_slice(),
            "non-zero viscosity should change a blocky field"
        );
    }

    #[test]
    fn test_viscosity_damps_isolated_spike() {
        let grid = Grid::new(32, 32);
        let mut velocity = VectorField::new(grid);
        velocity.set(16, 16, [1.0, 0.0]);
        let mut scratch = PingPong::new(grid);
        let result = diffuse(&velocity, &mut scratch, 30.0, 0.014, 32, BoundaryMode::Contained);

        let peak = result.get(16, 16)[0];
        assert!(peak < 1.0 && peak > 0.0, "spike should shrink but stay positive: {}", peak);
        assert!(result.get(18, 16)[0] > 0.0, "spreads to the 2-cell neighbor");
    }
}
