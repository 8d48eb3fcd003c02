//! Consumer side of the simulation: receives the velocity field each frame.
//!
//! Color mapping and drawing live outside this crate; a compositor only sees
//! the final velocity, the palette and the boundary mode.

use log::info;

use crate::compute::{BoundaryMode, FieldStats, VectorField};
use crate::schema::{Palette, SurfaceSize};

/// Everything a compositor needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub velocity: &'a VectorField,
    pub palette: &'a Palette,
    pub boundary: BoundaryMode,
    pub frame: u64,
}

/// Draws the simulation onto a surface.
pub trait Compositor {
    /// Acquire surface resources. Called once on `init`; an error aborts
    /// initialization and no frames are produced.
    fn prepare(&mut self, surface: SurfaceSize, pixel_ratio: f32) -> Result<(), CompositeError>;

    /// Surface size changed.
    fn resize(&mut self, _surface: SurfaceSize) {}

    /// Draw one frame.
    fn present(&mut self, frame: &FrameView<'_>);
}

/// Reject surfaces that cannot back a drawable.
pub fn check_surface(surface: SurfaceSize, pixel_ratio: f32) -> Result<(), CompositeError> {
    let usable = |v: f32| v.is_finite() && v > 0.0;
    if !usable(surface.width) || !usable(surface.height) || !usable(pixel_ratio) {
        return Err(CompositeError::InvalidSurface {
            width: surface.width,
            height: surface.height,
            pixel_ratio,
        });
    }
    Ok(())
}

/// Discards frames. Used headless and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCompositor;

impl Compositor for NullCompositor {
    fn prepare(&mut self, surface: SurfaceSize, pixel_ratio: f32) -> Result<(), CompositeError> {
        check_surface(surface, pixel_ratio)
    }

    fn present(&mut self, _frame: &FrameView<'_>) {}
}

/// Computes `FieldStats` every `interval` frames and logs them.
#[derive(Debug, Clone)]
pub struct StatsCompositor {
    interval: u64,
    last: Option<FieldStats>,
    presented: u64,
}

impl StatsCompositor {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            last: None,
            presented: 0,
        }
    }

    /// Most recently computed stats.
    pub fn last(&self) -> Option<FieldStats> {
        self.last
    }

    /// Frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Compositor for StatsCompositor {
    fn prepare(&mut self, surface: SurfaceSize, pixel_ratio: f32) -> Result<(), CompositeError> {
        check_surface(surface, pixel_ratio)
    }

    fn present(&mut self, frame: &FrameView<'_>) {
        self.presented += 1;
        if frame.frame % self.interval == 0 {
            let stats = FieldStats::compute(frame.velocity, frame.boundary);
            info!(
                "Frame {}: mean speed {:.4}, max speed {:.4}, mean |div| {:.6}",
                frame.frame, stats.mean_speed, stats.max_speed, stats.mean_abs_divergence
            );
            self.last = Some(stats);
        }
    }
}

/// Compositor errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompositeError {
    #[error("Surface {width}x{height} @ {pixel_ratio} cannot be drawn to")]
    InvalidSurface {
        width: f32,
        height: f32,
        pixel_ratio: f32,
    },
    #[error("Compositor unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Grid;

    #[test]
    fn test_check_surface() {
        assert!(check_surface(SurfaceSize::new(800.0, 600.0), 1.0).is_ok());
        assert!(check_surface(SurfaceSize::new(0.0, 600.0), 1.0).is_err());
        assert!(check_surface(SurfaceSize::new(800.0, f32::NAN), 1.0).is_err());
        assert!(check_surface(SurfaceSize::new(800.0, 600.0), 0.0).is_err());
    }

    #[test]
    fn test_stats_compositor_samples_on_interval() {
        let mut compositor = StatsCompositor::new(2);
        let mut velocity = VectorField::new(Grid::new(4, 4));
        velocity.fill([1.0, 0.0]);
        let palette = Palette::default();

        for frame in 1..=3 {
            compositor.present(&FrameView {
                velocity: &velocity,
                palette: &palette,
                boundary: BoundaryMode::Bounce,
                frame,
            });
        }
        assert_eq!(compositor.presented(), 3);
        let stats = compositor.last().expect("frame 2 is sampled");
        assert!((stats.mean_speed - 1.0).abs() < 1e-6);
    }
}
