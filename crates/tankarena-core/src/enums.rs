//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

use crate::types::Vec2;

/// Every component pool the entity store maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Transform,
    Parent,
    PhysicsBody,
    Velocity,
    Thruster,
    DriveIntent,
    Orbit,
    TurretJoint,
    Weapon,
    Projectile,
    Lifetime,
    Camera,
    Renderable,
    PlayerControlled,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 14] = [
        ComponentKind::Transform,
        ComponentKind::Parent,
        ComponentKind::PhysicsBody,
        ComponentKind::Velocity,
        ComponentKind::Thruster,
        ComponentKind::DriveIntent,
        ComponentKind::Orbit,
        ComponentKind::TurretJoint,
        ComponentKind::Weapon,
        ComponentKind::Projectile,
        ComponentKind::Lifetime,
        ComponentKind::Camera,
        ComponentKind::Renderable,
        ComponentKind::PlayerControlled,
    ];
}

/// Camera behaviour. Set externally; never changed by the camera system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    /// Spring-damper toward the tracked entity.
    #[default]
    Follow,
    /// Direct translation from input, no momentum.
    FreeRoam,
    /// Currently identical to `Follow`.
    Spectate,
}

/// Turret actuator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuatorState {
    /// No joint yet; waiting for both physics bodies.
    Uninitialized,
    /// Joint exists and the motor is under control.
    Active,
}

/// Render outline of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    Circle { radius: f32 },
    Rectangle { width: f32, height: f32 },
    Polygon { points: Vec<Vec2> },
}
