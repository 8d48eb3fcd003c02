//! Configuration types for the fluid simulation and its pointer driver.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compute::BoundaryMode;

/// Full parameter set. Every field has a default, so partial JSON is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FluidConfig {
    /// Force strength applied to the pointer delta.
    pub mouse_force: f32,
    /// Force footprint diameter in cells.
    pub cursor_size: f32,
    /// Enable the viscosity stage.
    pub is_viscous: bool,
    /// Kinematic viscosity.
    pub viscous: f32,
    pub iterations_viscous: usize,
    pub iterations_poisson: usize,
    /// Simulation time step. Not tied to wall-clock time.
    pub dt: f32,
    /// Error-compensated advection.
    #[serde(rename = "BFECC")]
    pub bfecc: bool,
    /// Grid cells per surface pixel.
    pub resolution: f32,
    /// Reflecting edges instead of a zero-velocity rim.
    pub is_bounce: bool,
    /// Allow the autopilot to take over while the user is idle.
    pub auto_demo: bool,
    /// Autopilot speed in NDC units per second.
    pub auto_speed: f32,
    /// Force multiplier while the autopilot drives.
    pub auto_intensity: f32,
    /// Autopilot-to-user hand-off duration in seconds.
    pub takeover_duration: f32,
    /// Idle time before the autopilot resumes, in milliseconds.
    pub auto_resume_delay: f32,
    /// Autopilot speed ramp-in duration in seconds.
    pub auto_ramp_duration: f32,
    /// Seed for autopilot targets. Entropy-seeded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            mouse_force: 20.0,
            cursor_size: 100.0,
            is_viscous: false,
            viscous: 30.0,
            iterations_viscous: 32,
            iterations_poisson: 32,
            dt: 0.014,
            bfecc: true,
            resolution: 0.5,
            is_bounce: false,
            auto_demo: true,
            auto_speed: 0.5,
            auto_intensity: 2.2,
            takeover_duration: 0.25,
            auto_resume_delay: 3000.0,
            auto_ramp_duration: 0.6,
            random_seed: None,
        }
    }
}

/// Partial parameter update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropsUpdate {
    pub mouse_force: Option<f32>,
    pub cursor_size: Option<f32>,
    pub is_viscous: Option<bool>,
    pub viscous: Option<f32>,
    pub iterations_viscous: Option<usize>,
    pub iterations_poisson: Option<usize>,
    pub dt: Option<f32>,
    #[serde(rename = "BFECC")]
    pub bfecc: Option<bool>,
    pub resolution: Option<f32>,
    pub is_bounce: Option<bool>,
    pub auto_demo: Option<bool>,
    pub auto_speed: Option<f32>,
    pub auto_intensity: Option<f32>,
    pub takeover_duration: Option<f32>,
    pub auto_resume_delay: Option<f32>,
    pub auto_ramp_duration: Option<f32>,
}

/// What a props update touched, so the caller can react.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigChange {
    /// Resolution changed: the grid must be recomputed.
    pub regrid: bool,
    /// A pointer or autopilot parameter changed.
    pub pointer: bool,
}

/// Copy every present field of the update; evaluates to whether any changed.
macro_rules! merge_fields {
    ($config:expr, $update:expr; $($field:ident),* $(,)?) => {{
        let mut changed = false;
        $(
            if let Some(value) = $update.$field {
                if $config.$field != value {
                    $config.$field = value;
                    changed = true;
                }
            }
        )*
        changed
    }};
}

impl FluidConfig {
    /// Merge a partial update.
    pub fn apply(&mut self, update: &PropsUpdate) -> ConfigChange {
        let regrid = merge_fields!(self, update; resolution);
        let pointer = merge_fields!(
            self, update;
            auto_demo,
            auto_speed,
            auto_intensity,
            takeover_duration,
            auto_resume_delay,
            auto_ramp_duration,
        );
        merge_fields!(
            self, update;
            mouse_force,
            cursor_size,
            is_viscous,
            viscous,
            iterations_viscous,
            iterations_poisson,
            dt,
            bfecc,
            is_bounce,
        );

        ConfigChange { regrid, pointer }
    }

    #[inline]
    pub fn boundary_mode(&self) -> BoundaryMode {
        if self.is_bounce {
            BoundaryMode::Bounce
        } else {
            BoundaryMode::Contained
        }
    }

    /// Hand-off duration in milliseconds.
    #[inline]
    pub fn takeover_duration_ms(&self) -> f64 {
        self.takeover_duration as f64 * 1000.0
    }

    /// Ramp duration in milliseconds.
    #[inline]
    pub fn auto_ramp_duration_ms(&self) -> f64 {
        self.auto_ramp_duration as f64 * 1000.0
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Reject values that make the simulation meaningless.
    ///
    /// The frame loop never calls this; hosts may send anything and the
    /// stages clamp what they must. Used by tooling that loads files.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidTimeStep(self.dt));
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(ConfigError::InvalidResolution(self.resolution));
        }
        if !(self.cursor_size.is_finite() && self.cursor_size >= 0.0) {
            return Err(ConfigError::InvalidCursorSize(self.cursor_size));
        }
        if self.is_viscous && !(self.viscous.is_finite() && self.viscous >= 0.0) {
            return Err(ConfigError::InvalidViscosity(self.viscous));
        }
        for (name, value) in [
            ("autoSpeed", self.auto_speed),
            ("takeoverDuration", self.takeover_duration),
            ("autoResumeDelay", self.auto_resume_delay),
            ("autoRampDuration", self.auto_ramp_duration),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NegativeParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Time step must be positive, got {0}")]
    InvalidTimeStep(f32),
    #[error("Resolution must be positive, got {0}")]
    InvalidResolution(f32),
    #[error("Cursor size must be non-negative, got {0}")]
    InvalidCursorSize(f32),
    #[error("Viscosity must be non-negative, got {0}")]
    InvalidViscosity(f32),
    #[error("{name} must be non-negative, got {value}")]
    NegativeParameter { name: &'static str, value: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = FluidConfig::default();
        assert_eq!(config.mouse_force, 20.0);
        assert_eq!(config.cursor_size, 100.0);
        assert_eq!(config.iterations_poisson, 32);
        assert!(config.bfecc);
        assert!(!config.is_bounce);
        assert_eq!(config.boundary_mode(), BoundaryMode::Contained);
        assert_eq!(config.takeover_duration_ms(), 250.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_uses_host_keys() {
        let json = r#"{"mouseForce": 12, "BFECC": false, "isBounce": true, "autoResumeDelay": 500}"#;
        let config: FluidConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.mouse_force, 12.0);
        assert!(!config.bfecc);
        assert_eq!(config.boundary_mode(), BoundaryMode::Bounce);
        assert_eq!(config.auto_resume_delay, 500.0);
        assert_eq!(config.cursor_size, 100.0, "missing keys take defaults");
    }

    #[test]
    fn test_apply_merges_only_present_fields() {
        let mut config = FluidConfig::default();
        let update: PropsUpdate =
            serde_json::from_str(r#"{"cursorSize": 40, "isViscous": true}"#).unwrap();
        let change = config.apply(&update);

        assert_eq!(config.cursor_size, 40.0);
        assert!(config.is_viscous);
        assert_eq!(config.mouse_force, 20.0);
        assert_eq!(change, ConfigChange::default());
    }

    #[test]
    fn test_apply_reports_regrid_and_pointer_changes() {
        let mut config = FluidConfig::default();
        let change = config.apply(&PropsUpdate {
            resolution: Some(0.25),
            auto_speed: Some(1.0),
            ..PropsUpdate::default()
        });
        assert!(change.regrid);
        assert!(change.pointer);

        let same = config.apply(&PropsUpdate {
            resolution: Some(0.25),
            ..PropsUpdate::default()
        });
        assert!(!same.regrid, "unchanged resolution keeps the grid");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = FluidConfig {
            dt: 0.0,
            ..FluidConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeStep(_))));

        let config = FluidConfig {
            takeover_duration: -1.0,
            ..FluidConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeParameter { name: "takeoverDuration", .. })
        ));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"resolution": 0.25, "randomSeed": 7}}"#).unwrap();
        let config = FluidConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.resolution, 0.25);
        assert_eq!(config.random_seed, Some(7));

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, "{{ not json").unwrap();
        assert!(matches!(
            FluidConfig::from_json_file(broken.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
