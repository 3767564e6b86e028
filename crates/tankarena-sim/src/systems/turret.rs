//! Turret actuation.
//!
//! A turret starts uninitialized and is coupled to its tank by a motorised
//! revolute joint on the first tick both bodies exist. While active, the
//! motor is driven by a proportional law: speed scales with the remaining
//! angular error, floored so the turret never stalls short of its target and
//! capped at the configured motor speed. Inside the tolerance band the motor
//! holds still.

use tankarena_core::components::{AngleLimits, Parent, PhysicsBody, Transform, TurretJoint};
use tankarena_core::config::TurretTuning;
use tankarena_core::enums::{ActuatorState, ComponentKind};
use tankarena_core::events::SimEvent;
use tankarena_core::types::{heading_of, rotate, shortest_angle_diff, BodyHandle, Vec2};
use tankarena_core::EntityId;

use crate::physics::{PhysicsBridge, RevoluteJointDef};
use crate::scheduler::{System, TickContext};
use crate::store::EntityStore;

/// Signed shortest error from `current` to `target`. With limits the error is
/// shortened so `current + error` stays inside them.
pub fn control_error(current: f32, target: f32, limits: Option<AngleLimits>) -> f32 {
    let diff = shortest_angle_diff(current, target);
    match limits {
        Some(limits) => (current + diff).clamp(limits.lower, limits.upper) - current,
        None => diff,
    }
}

/// Motor speed commanded for a joint-space error.
pub fn motor_speed_for(error: f32, base_speed: f32, tuning: &TurretTuning) -> f32 {
    if error.abs() < tuning.angle_tolerance {
        return 0.0;
    }
    let magnitude = (base_speed * error.abs().min(1.0))
        .max(tuning.min_motor_speed)
        .min(base_speed);
    error.signum() * magnitude
}

/// Joint angle in `(-π, π]` that points a turret at `turret_position` toward
/// `aim`. `None` when the aim point sits on the turret.
pub fn aim_angle(
    turret_position: Vec2,
    tank_rotation: f32,
    mount_angle: f32,
    aim: Vec2,
) -> Option<f32> {
    heading_of(aim - turret_position)
        .map(|heading| shortest_angle_diff(0.0, heading - tank_rotation - mount_angle))
}

fn body_handle(store: &EntityStore, id: EntityId) -> Option<BodyHandle> {
    store.get::<PhysicsBody>(id).and_then(|b| b.handle)
}

/// Create the joint for an uninitialized turret if both bodies exist.
/// Returns whether the turret is now active.
fn try_attach(
    store: &mut EntityStore,
    physics: &mut dyn PhysicsBridge,
    events: &mut Vec<SimEvent>,
    id: EntityId,
    tank: EntityId,
) -> bool {
    let Some(turret) = store.get::<TurretJoint>(id).copied() else {
        return false;
    };
    let (Some(tank_body), Some(turret_body)) = (body_handle(store, tank), body_handle(store, id))
    else {
        return false;
    };
    let (Some(tank_position), Some(tank_angle)) =
        (physics.body_position(tank_body), physics.body_angle(tank_body))
    else {
        return false;
    };

    let def = RevoluteJointDef {
        body_a: tank_body,
        body_b: turret_body,
        anchor: tank_position + rotate(turret.mount_point, tank_angle),
        reference_angle: turret.mount_angle,
        motor_enabled: turret.motor_enabled,
        max_motor_torque: turret.max_motor_torque(),
        motor_speed: turret.commanded_speed,
        limits: turret.limits(),
    };
    match physics.create_joint(&def) {
        Ok(handle) => {
            if let Some(turret) = store.get_mut::<TurretJoint>(id) {
                turret.attach(handle);
            }
            events.push(SimEvent::JointCreated { turret: id });
            log::debug!("{id}: joint {handle:?} created on {tank}");
            true
        }
        Err(err) => {
            log::warn!("{id}: joint creation failed: {err}");
            false
        }
    }
}

/// One control step for an active turret. The motor is switched on for
/// good once the turret is under control.
fn actuate(
    store: &mut EntityStore,
    physics: &mut dyn PhysicsBridge,
    events: &mut Vec<SimEvent>,
    tuning: &TurretTuning,
    id: EntityId,
    tank: EntityId,
) {
    let tank_rotation = store.get::<Transform>(tank).map(Transform::rotation);
    let turret_position = store.get::<Transform>(id).map(|t| t.position);
    let Some(turret) = store.get_mut::<TurretJoint>(id) else {
        return;
    };
    let Some(handle) = turret.joint() else {
        return;
    };
    let Some(current) = physics.joint_angle(handle) else {
        // The joint went away with one of its bodies.
        turret.detach();
        events.push(SimEvent::JointDestroyed { turret: id });
        log::warn!("{id}: joint {handle:?} lost");
        return;
    };

    if let (Some(aim), Some(tank_rotation), Some(position)) =
        (turret.aim_point, tank_rotation, turret_position)
    {
        if let Some(target) = aim_angle(position, tank_rotation, turret.mount_angle, aim) {
            turret.target_angle = target;
        }
    }

    let error = control_error(current, turret.target_angle, turret.limits());
    let speed = motor_speed_for(error, turret.motor_speed(), tuning);

    let mut result = Ok(());
    if let Some(torque) = turret.take_pending_torque() {
        result = physics.set_max_motor_torque(handle, torque);
    }
    let result = result
        .and_then(|()| physics.set_motor_speed(handle, speed))
        .and_then(|()| physics.enable_motor(handle, true));
    match result {
        Ok(()) => {
            turret.motor_enabled = true;
            turret.commanded_speed = speed;
        }
        Err(err) => log::warn!("{id}: motor update failed: {err}"),
    }
}

pub fn run(
    store: &mut EntityStore,
    physics: &mut dyn PhysicsBridge,
    events: &mut Vec<SimEvent>,
    tuning: &TurretTuning,
) {
    for id in store.query(&[ComponentKind::TurretJoint, ComponentKind::Parent]) {
        let Some(tank) = store.get::<Parent>(id).and_then(|p| p.parent) else {
            continue;
        };
        let state = store
            .get::<TurretJoint>(id)
            .map(TurretJoint::state)
            .unwrap_or(ActuatorState::Uninitialized);
        let active = match state {
            ActuatorState::Active => true,
            ActuatorState::Uninitialized => try_attach(store, physics, events, id, tank),
        };
        if active {
            actuate(store, physics, events, tuning, id, tank);
        }
    }
}

/// Destroy every live turret joint.
pub fn teardown(
    store: &mut EntityStore,
    physics: &mut dyn PhysicsBridge,
    events: &mut Vec<SimEvent>,
) {
    for id in store.query(&[ComponentKind::TurretJoint]) {
        let Some(handle) = store.get_mut::<TurretJoint>(id).and_then(TurretJoint::detach) else {
            continue;
        };
        if let Err(err) = physics.destroy_joint(handle) {
            log::debug!("{id}: joint already gone: {err}");
        }
        events.push(SimEvent::JointDestroyed { turret: id });
        log::debug!("{id}: joint {handle:?} destroyed");
    }
}

pub struct TurretSystem;

impl System for TurretSystem {
    fn name(&self) -> &'static str {
        "turret"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        run(ctx.store, ctx.physics, ctx.events, &ctx.config.turret);
    }

    fn shutdown(&mut self, ctx: &mut TickContext<'_>) {
        teardown(ctx.store, ctx.physics, ctx.events);
    }
}
