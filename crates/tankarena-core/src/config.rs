//! Engine configuration. Every value has a default from [`crate::constants`];
//! JSON documents may override any subset.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Fixed-step physics settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Sub-step length in seconds.
    pub fixed_dt: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    /// Sub-steps allowed per frame before accumulated time is discarded.
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_dt: PHYSICS_DT,
            velocity_iterations: VELOCITY_ITERATIONS,
            position_iterations: POSITION_ITERATIONS,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

/// Turret motor control tuning shared by every turret.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretTuning {
    /// Error (radians) below which the motor is stopped.
    pub angle_tolerance: f32,
    /// Motor speed floor while still outside tolerance (rad/s).
    pub min_motor_speed: f32,
}

impl Default for TurretTuning {
    fn default() -> Self {
        Self {
            angle_tolerance: TURRET_ANGLE_TOLERANCE,
            min_motor_speed: TURRET_MIN_MOTOR_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Camera speed below which velocity snaps to zero.
    pub velocity_epsilon: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            velocity_epsilon: CAMERA_VELOCITY_EPSILON,
        }
    }
}

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for arena layouts. Same seed = same layout.
    pub seed: u64,
    pub physics: PhysicsConfig,
    pub turret: TurretTuning,
    pub camera: CameraTuning,
    /// Samples kept per telemetry series.
    pub telemetry_samples: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            physics: PhysicsConfig::default(),
            turret: TurretTuning::default(),
            camera: CameraTuning::default(),
            telemetry_samples: TELEMETRY_SAMPLES,
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dt = self.physics.fixed_dt;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ConfigError::NonPositiveTimestep(dt));
        }
        if self.physics.max_substeps == 0 {
            return Err(ConfigError::InvalidTuning("max_substeps", 0.0));
        }
        check_tuning("angle_tolerance", self.turret.angle_tolerance)?;
        check_tuning("min_motor_speed", self.turret.min_motor_speed)?;
        check_tuning("velocity_epsilon", self.camera.velocity_epsilon)?;
        Ok(())
    }
}

fn check_tuning(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidTuning(name, value))
    }
}
