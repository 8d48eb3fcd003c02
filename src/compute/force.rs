//! Pointer-driven force injection.

use super::{BoundaryMode, Grid, VectorField};

/// Pointer state handed to the force stage each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceInput {
    /// Pointer position in NDC, `[-1, 1]²`, y up.
    pub position: [f32; 2],
    /// Frame-to-frame pointer movement in NDC.
    pub delta: [f32; 2],
}

impl ForceInput {
    /// Force vector in velocity units: the UV-space delta scaled by strength.
    #[inline]
    pub fn force(&self, mouse_force: f32) -> [f32; 2] {
        [
            self.delta[0] * 0.5 * mouse_force,
            self.delta[1] * 0.5 * mouse_force,
        ]
    }
}

/// Clamp the pointer so the force footprint stays inside the domain.
///
/// The margin per axis is `2 * cursor_size * cell_scale` in NDC. When the
/// margin exceeds the domain the pointer collapses onto the center.
pub fn clamp_pointer(position: [f32; 2], cursor_size: f32, grid: Grid) -> [f32; 2] {
    let scale = grid.cell_scale();
    let mut clamped = [0.0f32; 2];
    for axis in 0..2 {
        let margin = 2.0 * cursor_size * scale[axis];
        let lo = -1.0 + margin;
        let hi = 1.0 - margin;
        clamped[axis] = if lo > hi || position[axis].is_nan() {
            0.0
        } else {
            position[axis].clamp(lo, hi)
        };
    }
    clamped
}

/// Add a radially falling-off impulse around the pointer.
///
/// The cursor radius is `cursor_size / 2` cells; each cell within it receives
/// `force * (1 - dist / radius)²`.
pub fn apply_force(
    velocity: &mut VectorField,
    input: &ForceInput,
    mouse_force: f32,
    cursor_size: f32,
    boundary: BoundaryMode,
) {
    let force = input.force(mouse_force);
    if force == [0.0, 0.0] || !force[0].is_finite() || !force[1].is_finite() {
        return;
    }
    let radius = cursor_size * 0.5;
    if radius <= 0.0 {
        return;
    }

    let grid = velocity.grid();
    let center = clamp_pointer(input.position, cursor_size, grid);
    // Continuous cell coordinates: cell i spans [i, i + 1)
    let cx = (center[0] + 1.0) * 0.5 * grid.width as f32;
    let cy = (center[1] + 1.0) * 0.5 * grid.height as f32;

    velocity.update_rows(|j, row| {
        let dy = j as f32 + 0.5 - cy;
        if dy.abs() >= radius {
            return;
        }
        for (i, cell) in row.iter_mut().enumerate() {
            if boundary.is_wall(grid, i, j) {
                continue;
            }
            let dx = i as f32 + 0.5 - cx;
            let dist = (dx * dx + dy * dy).sqrt();
            let d = 1.0 - (dist / radius).min(1.0);
            if d <= 0.0 {
                continue;
            }
            let weight = d * d;
            cell[0] += force[0] * weight;
            cell[1] += force[1] * weight;
        }
    });
}
