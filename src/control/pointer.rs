//! Pointer state machine: arbitrates between user input and the autopilot.

use log::debug;

use crate::compute::ForceInput;
use crate::schema::{FluidConfig, SurfaceSize};

use super::AutoDriver;
use super::autopilot::smoothstep;

/// Who currently owns the force position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMode {
    /// No recent input; the autopilot may start.
    Idle,
    /// Synthetic wander drives the pointer.
    Autopilot,
    /// Raw user positions drive the pointer.
    UserControl,
    /// Interpolating from the autopilot position to the user position.
    Takeover,
}

#[derive(Debug, Clone, Copy)]
struct Takeover {
    from: [f32; 2],
    to: [f32; 2],
    start: f64,
}

/// Convert a device-pixel position (origin top-left) into NDC, y up.
pub fn device_to_ndc(x: f32, y: f32, surface: SurfaceSize, pixel_ratio: f32) -> [f32; 2] {
    let width = (surface.width * pixel_ratio).max(1.0);
    let height = (surface.height * pixel_ratio).max(1.0);
    [x / width * 2.0 - 1.0, -(y / height * 2.0 - 1.0)]
}

/// Tracks the force position and the frame-to-frame delta fed to the solver.
///
/// Timestamps are milliseconds on any monotonic clock.
#[derive(Debug, Clone)]
pub struct PointerController {
    mode: PointerMode,
    driver: AutoDriver,
    takeover: Option<Takeover>,
    coords: Option<[f32; 2]>,
    previous: Option<[f32; 2]>,
    takeover_duration_ms: f64,
    intensity: f32,
    hovering: bool,
    last_input: f64,
}

impl PointerController {
    pub fn new(config: &FluidConfig, now: f64) -> Self {
        Self {
            mode: PointerMode::Idle,
            driver: AutoDriver::new(config),
            takeover: None,
            coords: None,
            previous: None,
            takeover_duration_ms: config.takeover_duration_ms(),
            intensity: config.auto_intensity,
            hovering: false,
            last_input: now,
        }
    }

    pub fn apply_config(&mut self, config: &FluidConfig) {
        self.driver.apply_config(config);
        self.takeover_duration_ms = config.takeover_duration_ms();
        self.intensity = config.auto_intensity;
    }

    #[inline]
    pub fn mode(&self) -> PointerMode {
        self.mode
    }

    /// Last computed force position, if any is known yet.
    #[inline]
    pub fn position(&self) -> Option<[f32; 2]> {
        self.coords
    }

    #[inline]
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    fn set_mode(&mut self, mode: PointerMode) {
        if self.mode != mode {
            debug!("Pointer mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Record a user pointer position in NDC.
    pub fn pointer_moved(&mut self, position: [f32; 2], now: f64) {
        self.last_input = now;
        match self.mode {
            PointerMode::Autopilot => {
                self.driver.stop();
                self.takeover = Some(Takeover {
                    from: self.coords.unwrap_or(position),
                    to: position,
                    start: now,
                });
                self.set_mode(PointerMode::Takeover);
            }
            PointerMode::Takeover => {
                if let Some(takeover) = self.takeover.as_mut() {
                    takeover.to = position;
                }
            }
            PointerMode::Idle | PointerMode::UserControl => {
                self.coords = Some(position);
                self.set_mode(PointerMode::UserControl);
            }
        }
    }

    /// Pointer entered or left the surface.
    pub fn set_hovering(&mut self, inside: bool, now: f64) {
        self.hovering = inside;
        if !inside {
            self.last_input = now;
            if self.mode == PointerMode::UserControl {
                self.set_mode(PointerMode::Idle);
            }
        }
    }

    fn update_autopilot(&mut self, now: f64) {
        if self.mode == PointerMode::Takeover {
            return;
        }
        let idle_for = now - self.last_input;
        let idle_long_enough = idle_for >= self.driver.resume_delay_ms;
        let may_drive = self.driver.enabled && !self.hovering && idle_long_enough;

        match self.mode {
            PointerMode::Autopilot if !may_drive => {
                self.driver.stop();
                self.set_mode(PointerMode::Idle);
            }
            PointerMode::UserControl if idle_long_enough => self.set_mode(PointerMode::Idle),
            _ => {}
        }

        if may_drive && self.mode == PointerMode::Idle {
            self.driver.start(self.coords.unwrap_or([0.0, 0.0]), now);
            self.set_mode(PointerMode::Autopilot);
        }
        if self.mode == PointerMode::Autopilot {
            self.coords = Some(self.driver.tick(now));
        }
    }

    fn update_takeover(&mut self, now: f64) {
        let Some(takeover) = self.takeover else {
            return;
        };
        let t = if self.takeover_duration_ms > 0.0 {
            ((now - takeover.start) / self.takeover_duration_ms) as f32
        } else {
            1.0
        };
        if t >= 1.0 {
            self.takeover = None;
            self.coords = Some(takeover.to);
            self.previous = Some(takeover.to);
            self.set_mode(PointerMode::UserControl);
        } else {
            let k = smoothstep(t);
            self.coords = Some([
                takeover.from[0] + (takeover.to[0] - takeover.from[0]) * k,
                takeover.from[1] + (takeover.to[1] - takeover.from[1]) * k,
            ]);
        }
    }

    /// Advance timers and produce this frame's force input.
    pub fn update(&mut self, now: f64) -> ForceInput {
        self.update_autopilot(now);
        self.update_takeover(now);

        let Some(coords) = self.coords else {
            return ForceInput::default();
        };
        let mut delta = match self.previous {
            Some(previous) => [coords[0] - previous[0], coords[1] - previous[1]],
            None => [0.0, 0.0],
        };
        self.previous = Some(coords);

        if self.mode == PointerMode::Autopilot {
            delta[0] *= self.intensity;
            delta[1] *= self.intensity;
        }
        ForceInput {
            position: coords,
            delta,
        }
    }
}
