//! Physics collaborator boundary.
//!
//! The simulation only talks to physics through [`PhysicsBridge`]. Bodies and
//! joints are owned by the implementation; components hold opaque handles and
//! are responsible for releasing them.

use thiserror::Error;

use tankarena_core::components::AngleLimits;
use tankarena_core::types::{BodyHandle, JointHandle, Vec2};

pub mod rapier;

pub use rapier::RapierWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhysicsError {
    #[error("unknown body {0:?}")]
    UnknownBody(BodyHandle),
    #[error("unknown joint {0:?}")]
    UnknownJoint(JointHandle),
}

/// Body creation parameters. Zero mass or inertia makes that axis immovable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDef {
    pub position: Vec2,
    pub rotation: f32,
    pub mass: f32,
    pub inertia: f32,
}

/// Motorised revolute joint between two bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevoluteJointDef {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Shared anchor in world space.
    pub anchor: Vec2,
    /// Body B's rest angle relative to body A.
    pub reference_angle: f32,
    pub motor_enabled: bool,
    pub max_motor_torque: f32,
    pub motor_speed: f32,
    /// `None` leaves the joint free to spin.
    pub limits: Option<AngleLimits>,
}

/// The narrow contract the simulation consumes from a physics engine.
pub trait PhysicsBridge {
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle;

    /// Destroys the body and every joint attached to it.
    fn destroy_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError>;

    fn body_position(&self, body: BodyHandle) -> Option<Vec2>;

    fn body_angle(&self, body: BodyHandle) -> Option<f32>;

    fn set_linear_velocity(
        &mut self,
        body: BodyHandle,
        velocity: Vec2,
    ) -> Result<(), PhysicsError>;

    fn set_angular_velocity(
        &mut self,
        body: BodyHandle,
        velocity: f32,
    ) -> Result<(), PhysicsError>;

    fn create_joint(&mut self, def: &RevoluteJointDef) -> Result<JointHandle, PhysicsError>;

    fn destroy_joint(&mut self, joint: JointHandle) -> Result<(), PhysicsError>;

    /// `angle_b - angle_a - reference_angle`, unwrapped across steps.
    fn joint_angle(&self, joint: JointHandle) -> Option<f32>;

    fn set_motor_speed(&mut self, joint: JointHandle, speed: f32) -> Result<(), PhysicsError>;

    fn set_max_motor_torque(
        &mut self,
        joint: JointHandle,
        torque: f32,
    ) -> Result<(), PhysicsError>;

    fn enable_motor(&mut self, joint: JointHandle, enabled: bool) -> Result<(), PhysicsError>;

    /// Advance the world by one fixed step.
    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32);

    /// Live bodies, for leak checks.
    fn body_count(&self) -> usize;

    /// Live joints, for leak checks.
    fn joint_count(&self) -> usize;
}
