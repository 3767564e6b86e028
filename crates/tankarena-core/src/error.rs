//! Configuration errors raised at construction time.

use thiserror::Error;

/// Rejection of an invalid configuration. Raised by component constructors
/// and entity factories, never mid-tick.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("mass must be non-negative, got {0}")]
    NegativeMass(f32),
    #[error("inertia must be non-negative, got {0}")]
    NegativeInertia(f32),
    #[error("reload time must be positive, got {0}")]
    NonPositiveReloadTime(f32),
    #[error("phase count must be at least 1")]
    ZeroPhaseCount,
    #[error("phase {phase} outside 1..={phase_count}")]
    PhaseOutOfRange { phase: u32, phase_count: u32 },
    #[error("force must be non-negative, got {0}")]
    NegativeForce(f32),
    #[error("torque must be non-negative, got {0}")]
    NegativeTorque(f32),
    #[error("motor speed must be non-negative, got {0}")]
    NegativeMotorSpeed(f32),
    #[error("orbit radius must be non-negative, got {0}")]
    NegativeOrbitRadius(f32),
    #[error("angle limits inverted: lower {lower} > upper {upper}")]
    InvalidAngleLimits { lower: f32, upper: f32 },
    #[error("zoom range invalid: min {min}, max {max}")]
    InvalidZoomRange { min: f32, max: f32 },
    #[error("spring constants must be non-negative (stiffness {stiffness}, damping {damping})")]
    NegativeSpringConstant { stiffness: f32, damping: f32 },
    #[error("timestep must be positive, got {0}")]
    NonPositiveTimestep(f32),
    #[error("{0} must be non-negative and finite, got {1}")]
    InvalidTuning(&'static str, f32),
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
}
