//! Autonomous pointer wander used while the user is idle.

use rand::prelude::*;

use crate::schema::FluidConfig;

/// Targets are drawn from `[-(1 - margin), 1 - margin]²`.
const TARGET_MARGIN: f32 = 0.2;
/// Distance at which a target counts as reached.
const ARRIVAL_RADIUS: f32 = 0.01;
/// Real-time gaps longer than this (seconds) are treated as a stall.
const MAX_TICK_SECONDS: f32 = 0.2;
/// Step used in place of a stalled gap.
const STALL_TICK_SECONDS: f32 = 0.016;

#[inline]
pub(crate) fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Moves a synthetic pointer toward random targets at a ramped speed.
#[derive(Debug, Clone)]
pub struct AutoDriver {
    pub enabled: bool,
    /// NDC units per second.
    pub speed: f32,
    pub resume_delay_ms: f64,
    pub ramp_duration_ms: f64,
    active: bool,
    current: [f32; 2],
    target: [f32; 2],
    activation_time: f64,
    last_tick: f64,
    rng: StdRng,
}

impl AutoDriver {
    pub fn new(config: &FluidConfig) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut driver = Self {
            enabled: config.auto_demo,
            speed: config.auto_speed,
            resume_delay_ms: config.auto_resume_delay as f64,
            ramp_duration_ms: config.auto_ramp_duration_ms(),
            active: false,
            current: [0.0, 0.0],
            target: [0.0, 0.0],
            activation_time: 0.0,
            last_tick: 0.0,
            rng,
        };
        driver.target = driver.pick_target();
        driver
    }

    /// Refresh tunables; position, target and RNG are kept.
    pub fn apply_config(&mut self, config: &FluidConfig) {
        self.enabled = config.auto_demo;
        self.speed = config.auto_speed;
        self.resume_delay_ms = config.auto_resume_delay as f64;
        self.ramp_duration_ms = config.auto_ramp_duration_ms();
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn position(&self) -> [f32; 2] {
        self.current
    }

    #[inline]
    pub fn target(&self) -> [f32; 2] {
        self.target
    }

    /// Begin driving from `from`; the speed ramp restarts.
    pub fn start(&mut self, from: [f32; 2], now: f64) {
        self.active = true;
        self.current = from;
        self.activation_time = now;
        self.last_tick = now;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    fn pick_target(&mut self) -> [f32; 2] {
        let extent = 1.0 - TARGET_MARGIN;
        [
            self.rng.gen_range(-extent..=extent),
            self.rng.gen_range(-extent..=extent),
        ]
    }

    /// Advance by the real time elapsed since the last tick and return the
    /// new position. A tick that reaches the target only picks a new one.
    pub fn tick(&mut self, now: f64) -> [f32; 2] {
        let mut dt_sec = (((now - self.last_tick) / 1000.0) as f32).max(0.0);
        self.last_tick = now;
        if dt_sec > MAX_TICK_SECONDS {
            dt_sec = STALL_TICK_SECONDS;
        }

        let dir = [
            self.target[0] - self.current[0],
            self.target[1] - self.current[1],
        ];
        let dist = (dir[0] * dir[0] + dir[1] * dir[1]).sqrt();
        if dist < ARRIVAL_RADIUS {
            self.target = self.pick_target();
            return self.current;
        }

        let ramp = if self.ramp_duration_ms > 0.0 {
            smoothstep(((now - self.activation_time) / self.ramp_duration_ms) as f32)
        } else {
            1.0
        };
        let step = (self.speed * dt_sec * ramp).min(dist);
        self.current[0] += dir[0] / dist * step;
        self.current[1] += dir[1] / dist * step;
        self.current
    }
}
