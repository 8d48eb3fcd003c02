//! Summary statistics over a velocity field.

use serde::Serialize;

use super::{BoundaryMode, VectorField};

/// Mean absolute central-difference divergence over the simulated cells.
///
/// Uses the raw difference `(vx(i+1) - vx(i-1)) + (vy(j+1) - vy(j-1))` without
/// the `1 / (2 dt)` factor, so values are comparable across time steps.
pub fn mean_abs_divergence(velocity: &VectorField, boundary: BoundaryMode) -> f32 {
    let grid = velocity.grid();
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for j in 0..grid.height {
        let jj = j as isize;
        for i in 0..grid.width {
            if boundary.is_wall(grid, i, j) {
                continue;
            }
            let ii = i as isize;
            let div = velocity.at(ii + 1, jj, boundary)[0] - velocity.at(ii - 1, jj, boundary)[0]
                + velocity.at(ii, jj + 1, boundary)[1]
                - velocity.at(ii, jj - 1, boundary)[1];
            sum += div.abs() as f64;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        (sum / count as f64) as f32
    }
}

/// Speed and divergence summary of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStats {
    pub mean_speed: f32,
    pub max_speed: f32,
    pub mean_abs_divergence: f32,
}

impl FieldStats {
    pub fn compute(velocity: &VectorField, boundary: BoundaryMode) -> Self {
        let cells = velocity.as_slice();
        if cells.is_empty() {
            return Self::default();
        }

        let mut sum_speed = 0.0f64;
        let mut max_speed = 0.0f32;
        for v in cells {
            let speed = (v[0] * v[0] + v[1] * v[1]).sqrt();
            sum_speed += speed as f64;
            max_speed = max_speed.max(speed);
        }

        Self {
            mean_speed: (sum_speed / cells.len() as f64) as f32,
            max_speed,
            mean_abs_divergence: mean_abs_divergence(velocity, boundary),
        }
    }
}
