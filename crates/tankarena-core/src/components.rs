//! Components stored in the entity store.
//!
//! Components are data records. The few methods here enforce construction-time
//! invariants or derive small quantities; per-tick logic lives in systems.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::entity::EntityId;
use crate::enums::{ActuatorState, CameraMode, Shape};
use crate::error::ConfigError;
use crate::types::{normalize_angle, BodyHandle, JointHandle, Vec2};

/// Slack allowed when comparing accumulated frame time against a reload.
const FIRE_TIME_EPSILON: f32 = 1e-4;

/// World-space pose. Rotation is kept in `[0, 2π)` on every write.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub position: Vec2,
    rotation: f32,
    pub scale: Vec2,
}

impl Transform {
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self {
            position,
            rotation: normalize_angle(rotation),
            scale: Vec2::ONE,
        }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = normalize_angle(radians);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }
}

/// Placement relative to another entity. The parent reference is weak: a
/// destroyed or transform-less parent is treated as absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub parent: Option<EntityId>,
    /// Offset in parent space.
    pub local_offset: Vec2,
    /// Rotation relative to the parent (radians).
    pub local_rotation: f32,
}

impl Parent {
    pub fn new(parent: EntityId, local_offset: Vec2, local_rotation: f32) -> Self {
        Self {
            parent: Some(parent),
            local_offset,
            local_rotation,
        }
    }
}

/// A rigid body owned by the physics collaborator. `handle` stays `None`
/// until the physics system creates the body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhysicsBody {
    mass: f32,
    inertia: f32,
    pub handle: Option<BodyHandle>,
}

impl PhysicsBody {
    pub fn new(mass: f32, inertia: f32) -> Result<Self, ConfigError> {
        if !(mass >= 0.0) {
            return Err(ConfigError::NegativeMass(mass));
        }
        if !(inertia >= 0.0) {
            return Err(ConfigError::NegativeInertia(inertia));
        }
        Ok(Self {
            mass,
            inertia,
            handle: None,
        })
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec2,
    /// Radians per second, counter-clockwise positive.
    pub angular: f32,
}

/// Drive limits for a self-propelled body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thruster {
    max_force: f32,
    pub max_speed: f32,
    /// Hull turn rate toward the drive direction (rad/s).
    pub turn_rate: f32,
    /// Fraction of speed retained per second with no drive input.
    pub brake: f32,
}

impl Thruster {
    pub fn new(max_force: f32, max_speed: f32, turn_rate: f32) -> Result<Self, ConfigError> {
        if !(max_force >= 0.0) {
            return Err(ConfigError::NegativeForce(max_force));
        }
        Ok(Self {
            max_force,
            max_speed: max_speed.max(0.0),
            turn_rate: turn_rate.max(0.0),
            brake: TANK_BRAKE,
        })
    }

    pub fn max_force(&self) -> f32 {
        self.max_force
    }
}

/// What a tank wants to do this tick, written by the input or AI system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveIntent {
    /// Desired travel direction. Zero means brake.
    pub direction: Vec2,
    /// World-space point the turrets should face.
    pub aim_point: Option<Vec2>,
    pub fire: bool,
}

/// Circle a target entity at a fixed radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Orbit {
    pub target: Option<EntityId>,
    radius: f32,
    /// Radians per second around the target.
    pub angular_speed: f32,
    /// Current position on the circle (radians).
    pub angle: f32,
}

impl Orbit {
    pub fn new(target: EntityId, radius: f32, angular_speed: f32) -> Result<Self, ConfigError> {
        if !(radius >= 0.0) {
            return Err(ConfigError::NegativeOrbitRadius(radius));
        }
        Ok(Self {
            target: Some(target),
            radius,
            angular_speed,
            angle: 0.0,
        })
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// Joint-space angle limits (radians).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleLimits {
    pub lower: f32,
    pub upper: f32,
}

/// Parameters for [`TurretJoint::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurretJointConfig {
    /// Anchor in the tank's local space.
    pub mount_point: Vec2,
    /// Turret rest angle relative to the tank (the joint's reference angle).
    pub mount_angle: f32,
    /// Motor speed magnitude (rad/s).
    pub motor_speed: f32,
    pub max_motor_torque: f32,
    /// `None` disables angle limiting.
    pub limits: Option<AngleLimits>,
    pub motor_enabled: bool,
}

impl Default for TurretJointConfig {
    fn default() -> Self {
        Self {
            mount_point: Vec2::ZERO,
            mount_angle: 0.0,
            motor_speed: TURRET_MOTOR_SPEED,
            max_motor_torque: TURRET_MAX_TORQUE,
            limits: None,
            motor_enabled: true,
        }
    }
}

/// Motorised revolute coupling between a turret and its tank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurretJoint {
    pub mount_point: Vec2,
    pub mount_angle: f32,
    motor_speed: f32,
    max_motor_torque: f32,
    limits: Option<AngleLimits>,
    /// Desired joint angle (radians, relative to the mount).
    pub target_angle: f32,
    pub motor_enabled: bool,
    /// World point to track. When set, `target_angle` is recomputed each tick.
    pub aim_point: Option<Vec2>,
    /// Motor speed last sent to the joint.
    pub commanded_speed: f32,
    joint: Option<JointHandle>,
    torque_dirty: bool,
}

impl TurretJoint {
    pub fn new(config: TurretJointConfig) -> Result<Self, ConfigError> {
        if !(config.motor_speed >= 0.0) {
            return Err(ConfigError::NegativeMotorSpeed(config.motor_speed));
        }
        if !(config.max_motor_torque >= 0.0) {
            return Err(ConfigError::NegativeTorque(config.max_motor_torque));
        }
        if let Some(limits) = config.limits {
            if !(limits.lower <= limits.upper) {
                return Err(ConfigError::InvalidAngleLimits {
                    lower: limits.lower,
                    upper: limits.upper,
                });
            }
        }
        Ok(Self {
            mount_point: config.mount_point,
            mount_angle: config.mount_angle,
            motor_speed: config.motor_speed,
            max_motor_torque: config.max_motor_torque,
            limits: config.limits,
            target_angle: 0.0,
            motor_enabled: config.motor_enabled,
            aim_point: None,
            commanded_speed: 0.0,
            joint: None,
            torque_dirty: false,
        })
    }

    pub fn state(&self) -> ActuatorState {
        if self.joint.is_some() {
            ActuatorState::Active
        } else {
            ActuatorState::Uninitialized
        }
    }

    pub fn joint(&self) -> Option<JointHandle> {
        self.joint
    }

    pub fn motor_speed(&self) -> f32 {
        self.motor_speed
    }

    pub fn max_motor_torque(&self) -> f32 {
        self.max_motor_torque
    }

    pub fn limits(&self) -> Option<AngleLimits> {
        self.limits
    }

    /// Reconfigure the torque limit. Pushed to the joint on the next actuation.
    pub fn set_max_motor_torque(&mut self, torque: f32) -> Result<(), ConfigError> {
        if !(torque >= 0.0) {
            return Err(ConfigError::NegativeTorque(torque));
        }
        self.max_motor_torque = torque;
        self.torque_dirty = self.joint.is_some();
        Ok(())
    }

    /// Torque value awaiting delivery to the joint, if any.
    pub fn take_pending_torque(&mut self) -> Option<f32> {
        if std::mem::take(&mut self.torque_dirty) {
            Some(self.max_motor_torque)
        } else {
            None
        }
    }

    /// Record a freshly created joint. Its definition already carried the torque.
    pub fn attach(&mut self, joint: JointHandle) {
        self.joint = Some(joint);
        self.torque_dirty = false;
    }

    /// Forget the joint, handing it back so the caller can destroy it.
    pub fn detach(&mut self) -> Option<JointHandle> {
        self.commanded_speed = 0.0;
        self.torque_dirty = false;
        self.joint.take()
    }
}

/// Reload cadence shared by the turrets of one tank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseConfig {
    phase_count: u32,
    reload_time: f32,
}

impl PhaseConfig {
    pub fn new(phase_count: u32, reload_time: f32) -> Result<Self, ConfigError> {
        if phase_count < 1 {
            return Err(ConfigError::ZeroPhaseCount);
        }
        if !(reload_time > 0.0) {
            return Err(ConfigError::NonPositiveReloadTime(reload_time));
        }
        Ok(Self {
            phase_count,
            reload_time,
        })
    }

    pub fn phase_count(&self) -> u32 {
        self.phase_count
    }

    pub fn reload_time(&self) -> f32 {
        self.reload_time
    }

    pub fn phase_interval(&self) -> f32 {
        self.reload_time / self.phase_count as f32
    }
}

/// A turret's slot within its tank's reload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurretPhase {
    config: PhaseConfig,
    phase: u32,
}

impl TurretPhase {
    /// `phase` is 1-based and must lie in `1..=phase_count`.
    pub fn new(config: PhaseConfig, phase: u32) -> Result<Self, ConfigError> {
        if phase < 1 || phase > config.phase_count {
            return Err(ConfigError::PhaseOutOfRange {
                phase,
                phase_count: config.phase_count,
            });
        }
        Ok(Self { config, phase })
    }

    pub fn config(&self) -> PhaseConfig {
        self.config
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Offset of this phase's first shot from the start of the cycle.
    pub fn fire_time(&self) -> f32 {
        (self.phase - 1) as f32 * self.config.phase_interval()
    }
}

/// Projectile launcher mounted on a turret.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weapon {
    pub phase: TurretPhase,
    /// Time of the last shot. Seeded so the first shot lands on the phase offset.
    pub last_shot: f32,
    /// Muzzle position in the turret's local space.
    pub muzzle_offset: Vec2,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    /// Fire intent for the current tick.
    pub trigger: bool,
    pub shots_fired: u32,
}

impl Weapon {
    /// Arm a weapon at `armed_at`. Its first shot becomes available at
    /// `armed_at + phase.fire_time()`.
    pub fn new(phase: TurretPhase, armed_at: f32, muzzle_offset: Vec2) -> Self {
        Self {
            phase,
            last_shot: armed_at + phase.fire_time() - phase.config().reload_time(),
            muzzle_offset,
            projectile_speed: PROJECTILE_SPEED,
            projectile_lifetime: PROJECTILE_LIFETIME,
            trigger: false,
            shots_fired: 0,
        }
    }

    pub fn reload_time(&self) -> f32 {
        self.phase.config().reload_time()
    }

    pub fn can_fire(&self, now: f32) -> bool {
        now - self.last_shot + FIRE_TIME_EPSILON >= self.reload_time()
    }

    pub fn record_shot(&mut self, now: f32) {
        self.last_shot = now;
        self.shots_fired += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Turret that fired it.
    pub owner: EntityId,
}

/// Seconds until the entity is despawned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lifetime {
    pub remaining: f32,
}

impl Lifetime {
    pub fn expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Parameters for [`Camera::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_speed: f32,
    pub free_roam_speed: f32,
    pub mode: CameraMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            stiffness: CAMERA_STIFFNESS,
            damping: CAMERA_DAMPING,
            zoom: 1.0,
            min_zoom: CAMERA_MIN_ZOOM,
            max_zoom: CAMERA_MAX_ZOOM,
            zoom_speed: CAMERA_ZOOM_SPEED,
            free_roam_speed: CAMERA_FREE_ROAM_SPEED,
            mode: CameraMode::Follow,
        }
    }
}

/// View state driven by the camera system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Spring constant `k`.
    pub stiffness: f32,
    /// Damping constant `c`.
    pub damping: f32,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    pub zoom_speed: f32,
    pub free_roam_speed: f32,
    pub mode: CameraMode,
    /// Entity tracked in follow/spectate mode.
    pub target: Option<EntityId>,
}

impl Camera {
    pub fn new(config: CameraConfig, position: Vec2) -> Result<Self, ConfigError> {
        if !(config.stiffness >= 0.0 && config.damping >= 0.0) {
            return Err(ConfigError::NegativeSpringConstant {
                stiffness: config.stiffness,
                damping: config.damping,
            });
        }
        if !(config.min_zoom > 0.0 && config.min_zoom <= config.max_zoom) {
            return Err(ConfigError::InvalidZoomRange {
                min: config.min_zoom,
                max: config.max_zoom,
            });
        }
        Ok(Self {
            position,
            velocity: Vec2::ZERO,
            stiffness: config.stiffness,
            damping: config.damping,
            zoom: config.zoom.clamp(config.min_zoom, config.max_zoom),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_speed: config.zoom_speed,
            free_roam_speed: config.free_roam_speed,
            mode: config.mode,
            target: None,
        })
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn zoom_range(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    /// Scale zoom by `1 + scroll * zoom_speed`, clamped to the zoom range.
    pub fn apply_scroll(&mut self, scroll_delta: f32) {
        let zoom = self.zoom * (1.0 + scroll_delta * self.zoom_speed);
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// True when the spring overshoots (`c^2 < 4k`).
    pub fn is_underdamped(&self) -> bool {
        self.damping * self.damping < 4.0 * self.stiffness
    }
}

/// How the renderer should draw an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Renderable {
    pub shape: Shape,
    /// Draw order key, lower first.
    pub layer: i32,
}

/// Marks the tank driven by the input collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerControlled;
