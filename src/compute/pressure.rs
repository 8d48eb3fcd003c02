//! Incompressibility: divergence, Poisson pressure solve, projection.
//!
//! The three passes share one discretization. Divergence and the pressure
//! gradient are central differences over one cell on each side, so their
//! composition is a Laplacian whose neighbors sit two cells away. The Jacobi
//! solver therefore samples the previous iterate at a 2-cell offset; a 1-cell
//! stencil would solve a different equation and leave a checkerboard residual.

use super::{BoundaryMode, PingPong, ScalarField, VectorField};

/// Neighbor offset of the Poisson stencil.
const POISSON_OFFSET: isize = 2;

/// Central-difference divergence of `velocity`, divided by `dt`.
pub fn compute_divergence(
    velocity: &VectorField,
    divergence: &mut ScalarField,
    dt: f32,
    boundary: BoundaryMode,
) {
    let grid = divergence.grid();
    divergence.update_rows(|j, row| {
        let jj = j as isize;
        for (i, cell) in row.iter_mut().enumerate() {
            if boundary.is_wall(grid, i, j) {
                *cell = 0.0;
                continue;
            }
            let ii = i as isize;
            let x0 = velocity.at(ii - 1, jj, boundary)[0];
            let x1 = velocity.at(ii + 1, jj, boundary)[0];
            let y0 = velocity.at(ii, jj - 1, boundary)[1];
            let y1 = velocity.at(ii, jj + 1, boundary)[1];
            *cell = (x1 - x0 + y1 - y0) / 2.0 / dt;
        }
    });
}

/// One Jacobi iteration of `lap(p) = div` on the 2-cell stencil.
pub fn jacobi_pressure_step(
    prev: &ScalarField,
    divergence: &ScalarField,
    next: &mut ScalarField,
    boundary: BoundaryMode,
) {
    let grid = next.grid();
    let o = POISSON_OFFSET;
    next.update_rows(|j, row| {
        let jj = j as isize;
        for (i, cell) in row.iter_mut().enumerate() {
            if boundary.is_wall(grid, i, j) {
                *cell = 0.0;
                continue;
            }
            let ii = i as isize;
            let p0 = prev.at(ii + o, jj, boundary);
            let p1 = prev.at(ii - o, jj, boundary);
            let p2 = prev.at(ii, jj + o, boundary);
            let p3 = prev.at(ii, jj - o, boundary);
            *cell = (p0 + p1 + p2 + p3) / 4.0 - divergence.get(i, j);
        }
    });
}

/// Solve for pressure from a zero start with a fixed number of iterations.
///
/// There is no convergence check; per-frame cost stays constant.
pub fn solve_pressure<'a>(
    divergence: &ScalarField,
    pressure: &'a mut PingPong<f32>,
    iterations: usize,
    boundary: BoundaryMode,
) -> &'a ScalarField {
    pressure.current_mut().fill(0.0);
    for _ in 0..iterations {
        let (prev, next) = pressure.split();
        jacobi_pressure_step(prev, divergence, next, boundary);
        pressure.swap();
    }
    pressure.current()
}

/// Subtract the pressure gradient: `v - 0.5 * (dp/dx, dp/dy) * dt`.
pub fn project(
    velocity: &VectorField,
    pressure: &ScalarField,
    out: &mut VectorField,
    dt: f32,
    boundary: BoundaryMode,
) {
    let grid = out.grid();
    out.update_rows(|j, row| {
        let jj = j as isize;
        for (i, cell) in row.iter_mut().enumerate() {
            if boundary.is_wall(grid, i, j) {
                *cell = [0.0, 0.0];
                continue;
            }
            let ii = i as isize;
            let p0 = pressure.at(ii + 1, jj, boundary);
            let p1 = pressure.at(ii - 1, jj, boundary);
            let p2 = pressure.at(ii, jj + 1, boundary);
            let p3 = pressure.at(ii, jj - 1, boundary);
            let v = velocity.get(i, j);
            *cell = [v[0] - (p0 - p1) * 0.5 * dt, v[1] - (p2 - p3) * 0.5 * dt];
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{Grid, mean_abs_divergence};

    /// Radially outward jet around the domain center: strongly divergent.
    fn source_blob(grid: Grid) -> VectorField {
        let mut field = VectorField::new(grid);
        let cx = grid.width as f32 * 0.5;
        let cy = grid.height as f32 * 0.5;
        let radius = grid.width.min(grid.height) as f32 * 0.2;
        for j in 1..grid.height - 1 {
            for i in 1..grid.width - 1 {
                let dx = i as f32 + 0.5 - cx;
                let dy = j as f32 + 0.5 - cy;
                let r2 = (dx * dx + dy * dy) / (radius * radius);
                let w = (-r2).exp();
                field.set(i, j, [dx / radius * w, dy / radius * w]);
            }
        }
        field
    }

    fn project_once(velocity: &VectorField, iterations: usize, boundary: BoundaryMode) -> VectorField {
        let grid = velocity.grid();
        let dt = 0.014;
        let mut divergence = ScalarField::new(grid);
        let mut pressure = PingPong::new(grid);
        let mut out = VectorField::new(grid);
        compute_divergence(velocity, &mut divergence, dt, boundary);
        let p = solve_pressure(&divergence, &mut pressure, iterations, boundary);
        project(velocity, p, &mut out, dt, boundary);
        out
    }

    #[test]
    fn test_divergence_of_uniform_field_is_zero() {
        let grid = Grid::new(16, 16);
        let mut velocity = VectorField::new(grid);
        velocity.fill([0.7, -0.3]);
        let mut divergence = ScalarField::new(grid);
        compute_divergence(&velocity, &mut divergence, 0.014, BoundaryMode::Bounce);
        assert!(divergence.as_slice().iter().all(|d| d.abs() < 1e-5));
    }

    #[test]
    fn test_divergence_of_linear_expansion() {
        let grid = Grid::new(16, 16);
        let mut velocity = VectorField::new(grid);
        for j in 0..16 {
            for i in 0..16 {
                velocity.set(i, j, [i as f32, j as f32]);
            }
        }
        let mut divergence = ScalarField::new(grid);
        compute_divergence(&velocity, &mut divergence, 0.5, BoundaryMode::Contained);
        // (2 + 2) / 2 / 0.5 in the interior
        assert!((divergence.get(8, 8) - 4.0).abs() < 1e-5);
        assert_eq!(divergence.get(0, 5), 0.0, "rim is a wall");
    }

    #[test]
    fn test_zero_divergence_gives_zero_pressure() {
        let grid = Grid::new(12, 12);
        let divergence = ScalarField::new(grid);
        let mut pressure = PingPong::new(grid);
        pressure.current_mut().fill(3.0);
        let p = solve_pressure(&divergence, &mut pressure, 8, BoundaryMode::Contained);
        assert!(p.as_slice().iter().all(|v| *v == 0.0), "pressure starts from zero each solve");
    }

    #[test]
    fn test_poisson_uses_two_cell_stencil() {
        let grid = Grid::new(16, 16);
        let mut divergence = ScalarField::new(grid);
        divergence.set(8, 8, -4.0);
        let mut pressure = PingPong::new(grid);
        let p = solve_pressure(&divergence, &mut pressure, 2, BoundaryMode::Contained);

        // Iteration 1 puts 4 at (8, 8); iteration 2 spreads 1 to the +-2 neighbors
        assert!((p.get(8, 8) - 4.0).abs() < 1e-6);
        assert!((p.get(10, 8) - 1.0).abs() < 1e-6);
        assert!((p.get(8, 6) - 1.0).abs() < 1e-6);
        assert_eq!(p.get(9, 8), 0.0, "1-cell neighbors are not coupled");
    }

    #[test]
    fn test_projection_reduces_divergence_contained() {
        let grid = Grid::new(64, 48);
        let velocity = source_blob(grid);
        let before = mean_abs_divergence(&velocity, BoundaryMode::Contained);

        for iterations in [4, 32] {
            let projected = project_once(&velocity, iterations, BoundaryMode::Contained);
            let after = mean_abs_divergence(&projected, BoundaryMode::Contained);
            assert!(
                after < before,
                "{} iterations: divergence {} should drop below {}",
                iterations,
                after,
                before
            );
        }
    }

    #[test]
    fn test_projection_reduces_divergence_bounce() {
        let grid = Grid::new(48, 48);
        let velocity = source_blob(grid);
        let before = mean_abs_divergence(&velocity, BoundaryMode::Bounce);
        let projected = project_once(&velocity, 32, BoundaryMode::Bounce);
        let after = mean_abs_divergence(&projected, BoundaryMode::Bounce);
        assert!(after < before, "divergence {} should drop below {}", after, before);
    }

    #[test]
    fn test_more_iterations_remove_more_divergence() {
        let grid = Grid::new(64, 64);
        let velocity = source_blob(grid);
        let few = mean_abs_divergence(&project_once(&velocity, 2, BoundaryMode::Contained), BoundaryMode::Contained);
        let many = mean_abs_divergence(&project_once(&velocity, 64, BoundaryMode::Contained), BoundaryMode::Contained);
        assert!(many < few, "64 iterations ({}) should beat 2 ({})", many, few);
    }
}
