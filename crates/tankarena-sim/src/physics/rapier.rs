//! [`PhysicsBridge`] backed by a zero-gravity rapier2d world.
//!
//! Bodies carry no colliders; their mass comes from [`BodyDef`]. A body with
//! neither mass nor inertia becomes a velocity-driven kinematic body. Turret
//! joints are rapier revolute joints whose first frame is rotated by the
//! reference angle, so rapier's limits and motor work on the same angle the
//! bridge reports.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use rapier2d::math::Rotation;
use rapier2d::prelude::*;

use tankarena_core::types::{rotate, shortest_angle_diff, BodyHandle, JointHandle, Vec2};

use super::{BodyDef, PhysicsBridge, PhysicsError, RevoluteJointDef};

/// Velocity-tracking factor handed to rapier's joint motor.
const MOTOR_DAMPING: f32 = 1_000.0;

#[derive(Debug, Clone, Copy)]
struct JointEntry {
    handle: ImpulseJointHandle,
    body_a: BodyHandle,
    body_b: BodyHandle,
    motor_enabled: bool,
    motor_speed: f32,
    max_motor_torque: f32,
    /// Accumulated across steps; rapier only reports the wrapped angle.
    angle: f32,
}

impl JointEntry {
    fn motor_force(&self) -> f32 {
        if self.motor_enabled {
            self.max_motor_torque
        } else {
            0.0
        }
    }
}

pub struct RapierWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    bodies: BTreeMap<u64, RigidBodyHandle>,
    joints: BTreeMap<u64, JointEntry>,
    next_body: u64,
    next_joint: u64,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn to_point(v: Vec2) -> Point<Real> {
    point![v.x, v.y]
}

impl RapierWorld {
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, 0.0],
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            bodies: BTreeMap::new(),
            joints: BTreeMap::new(),
            next_body: 0,
            next_joint: 0,
        }
    }

    /// Linear and angular velocity of a body.
    pub fn body_velocity(&self, body: BodyHandle) -> Option<(Vec2, f32)> {
        let rb = self.rigid_body(body)?;
        let linvel = rb.linvel();
        Some((Vec2::new(linvel.x, linvel.y), rb.angvel()))
    }

    fn rigid_body(&self, body: BodyHandle) -> Option<&RigidBody> {
        self.bodies
            .get(&body.0)
            .and_then(|&handle| self.rigid_bodies.get(handle))
    }

    fn rigid_body_mut(&mut self, body: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies
            .get(&body.0)
            .and_then(|&handle| self.rigid_bodies.get_mut(handle))
            .ok_or(PhysicsError::UnknownBody(body))
    }

    /// Wrapped joint angle as rapier sees it, in (-pi, pi].
    fn measured_angle(&self, handle: ImpulseJointHandle) -> Option<f32> {
        let joint = self.impulse_joints.get(handle)?;
        let a = self.rigid_bodies.get(joint.body1)?;
        let b = self.rigid_bodies.get(joint.body2)?;
        let frame_a = a.rotation() * joint.data.local_frame1.rotation;
        let frame_b = b.rotation() * joint.data.local_frame2.rotation;
        Some((frame_a.inverse() * frame_b).angle())
    }

    /// Apply `update` to the joint's motor state and push it into rapier.
    fn update_motor(
        &mut self,
        joint: JointHandle,
        update: impl FnOnce(&mut JointEntry),
    ) -> Result<(), PhysicsError> {
        let entry = self
            .joints
            .get_mut(&joint.0)
            .ok_or(PhysicsError::UnknownJoint(joint))?;
        update(entry);
        let revolute = self
            .impulse_joints
            .get_mut(entry.handle)
            .and_then(|j| j.data.as_revolute_mut())
            .ok_or(PhysicsError::UnknownJoint(joint))?;
        revolute
            .set_motor_velocity(entry.motor_speed, MOTOR_DAMPING)
            .set_motor_max_force(entry.motor_force());
        Ok(())
    }

    fn track_joint_angles(&mut self) {
        let measured: Vec<(u64, f32)> = self
            .joints
            .iter()
            .filter_map(|(&id, entry)| Some((id, self.measured_angle(entry.handle)?)))
            .collect();
        for (id, wrapped) in measured {
            if let Some(entry) = self.joints.get_mut(&id) {
                entry.angle += shortest_angle_diff(entry.angle, wrapped);
            }
        }
    }
}

impl PhysicsBridge for RapierWorld {
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let builder = if def.mass > 0.0 || def.inertia > 0.0 {
            RigidBodyBuilder::dynamic().additional_mass_properties(MassProperties::new(
                point![0.0, 0.0],
                def.mass.max(0.0),
                def.inertia.max(0.0),
            ))
        } else {
            RigidBodyBuilder::kinematic_velocity_based()
        };
        let rb = builder
            .translation(to_vector(def.position))
            .rotation(def.rotation)
            .can_sleep(false)
            .build();
        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        self.bodies.insert(handle.0, self.rigid_bodies.insert(rb));
        handle
    }

    fn destroy_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        let handle = self
            .bodies
            .remove(&body.0)
            .ok_or(PhysicsError::UnknownBody(body))?;
        // Rapier drops the attached joints along with the body.
        self.rigid_bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.joints
            .retain(|_, entry| entry.body_a != body && entry.body_b != body);
        Ok(())
    }

    fn body_position(&self, body: BodyHandle) -> Option<Vec2> {
        let translation = self.rigid_body(body)?.translation();
        Some(Vec2::new(translation.x, translation.y))
    }

    fn body_angle(&self, body: BodyHandle) -> Option<f32> {
        self.rigid_body(body).map(|rb| rb.rotation().angle())
    }

    fn set_linear_velocity(
        &mut self,
        body: BodyHandle,
        velocity: Vec2,
    ) -> Result<(), PhysicsError> {
        self.rigid_body_mut(body)?.set_linvel(to_vector(velocity), true);
        Ok(())
    }

    fn set_angular_velocity(
        &mut self,
        body: BodyHandle,
        velocity: f32,
    ) -> Result<(), PhysicsError> {
        self.rigid_body_mut(body)?.set_angvel(velocity, true);
        Ok(())
    }

    fn create_joint(&mut self, def: &RevoluteJointDef) -> Result<JointHandle, PhysicsError> {
        let handle_a = *self
            .bodies
            .get(&def.body_a.0)
            .ok_or(PhysicsError::UnknownBody(def.body_a))?;
        let handle_b = *self
            .bodies
            .get(&def.body_b.0)
            .ok_or(PhysicsError::UnknownBody(def.body_b))?;
        let (Some(a), Some(b)) = (
            self.rigid_bodies.get(handle_a),
            self.rigid_bodies.get(handle_b),
        ) else {
            return Err(PhysicsError::UnknownBody(def.body_a));
        };
        let local_a = rotate(
            def.anchor - Vec2::new(a.translation().x, a.translation().y),
            -a.rotation().angle(),
        );
        let local_b = rotate(
            def.anchor - Vec2::new(b.translation().x, b.translation().y),
            -b.rotation().angle(),
        );

        let max_motor_torque = def.max_motor_torque.max(0.0);
        let motor_force = if def.motor_enabled {
            max_motor_torque
        } else {
            0.0
        };
        let mut builder = RevoluteJointBuilder::new()
            .local_anchor1(to_point(local_a))
            .local_anchor2(to_point(local_b))
            .motor_velocity(def.motor_speed, MOTOR_DAMPING)
            .motor_max_force(motor_force);
        if let Some(limits) = def.limits {
            builder = builder.limits([limits.lower, limits.upper]);
        }
        let mut data: GenericJoint = builder.build().into();
        data.local_frame1.rotation = Rotation::new(def.reference_angle);

        let rapier_handle = self.impulse_joints.insert(handle_a, handle_b, data, true);
        let entry = JointEntry {
            handle: rapier_handle,
            body_a: def.body_a,
            body_b: def.body_b,
            motor_enabled: def.motor_enabled,
            motor_speed: def.motor_speed,
            max_motor_torque,
            angle: self.measured_angle(rapier_handle).unwrap_or(0.0),
        };

        let handle = JointHandle(self.next_joint);
        self.next_joint += 1;
        self.joints.insert(handle.0, entry);
        Ok(handle)
    }

    fn destroy_joint(&mut self, joint: JointHandle) -> Result<(), PhysicsError> {
        let entry = self
            .joints
            .remove(&joint.0)
            .ok_or(PhysicsError::UnknownJoint(joint))?;
        self.impulse_joints.remove(entry.handle, true);
        Ok(())
    }

    fn joint_angle(&self, joint: JointHandle) -> Option<f32> {
        self.joints.get(&joint.0).map(|entry| entry.angle)
    }

    fn set_motor_speed(&mut self, joint: JointHandle, speed: f32) -> Result<(), PhysicsError> {
        self.update_motor(joint, |entry| entry.motor_speed = speed)
    }

    fn set_max_motor_torque(
        &mut self,
        joint: JointHandle,
        torque: f32,
    ) -> Result<(), PhysicsError> {
        self.update_motor(joint, |entry| entry.max_motor_torque = torque.max(0.0))
    }

    fn enable_motor(&mut self, joint: JointHandle, enabled: bool) -> Result<(), PhysicsError> {
        self.update_motor(joint, |entry| entry.motor_enabled = enabled)
    }

    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) {
        if !(dt > 0.0) {
            return;
        }
        self.params.dt = dt;
        self.params.num_solver_iterations =
            NonZeroUsize::new(velocity_iterations as usize).unwrap_or(NonZeroUsize::MIN);
        self.params.num_internal_stabilization_iterations = position_iterations as usize;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.track_joint_angles();
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn joint_count(&self) -> usize {
        self.joints.len()
    }
}
