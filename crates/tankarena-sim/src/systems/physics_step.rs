//! Physics stepping.
//!
//! Frame time feeds an accumulator drained in fixed sub-steps, so integration
//! does not depend on the frame rate. After stepping, body poses flow back
//! into root transforms and joint angles into turret local rotations.

use tankarena_core::components::{Parent, PhysicsBody, Transform, TurretJoint};
use tankarena_core::config::PhysicsConfig;
use tankarena_core::enums::ComponentKind;

use crate::physics::{BodyDef, PhysicsBridge};
use crate::scheduler::{System, TickContext};
use crate::store::EntityStore;

/// Slack for float drift when comparing the accumulator to one step.
const ACCUMULATOR_EPSILON: f32 = 1e-6;

/// Give every `PhysicsBody` without a handle a body at its current pose.
pub fn create_missing_bodies(store: &mut EntityStore, physics: &mut dyn PhysicsBridge) {
    for id in store.query(&[ComponentKind::PhysicsBody, ComponentKind::Transform]) {
        let (Some(body), Some(transform)) = (
            store.get::<PhysicsBody>(id).copied(),
            store.get::<Transform>(id).copied(),
        ) else {
            continue;
        };
        if body.handle.is_some() {
            continue;
        }
        let handle = physics.create_body(&BodyDef {
            position: transform.position,
            rotation: transform.rotation(),
            mass: body.mass(),
            inertia: body.inertia(),
        });
        if let Some(body) = store.get_mut::<PhysicsBody>(id) {
            body.handle = Some(handle);
        }
    }
}

/// Add `frame_dt` to the accumulator and step until it is drained or the
/// sub-step cap is hit. Time beyond the cap is dropped. Returns steps taken.
pub fn step_fixed(
    physics: &mut dyn PhysicsBridge,
    accumulator: &mut f32,
    frame_dt: f32,
    config: &PhysicsConfig,
) -> u32 {
    let fixed_dt = config.fixed_dt;
    *accumulator += frame_dt.max(0.0);
    let mut steps = 0;
    while *accumulator + ACCUMULATOR_EPSILON >= fixed_dt && steps < config.max_substeps {
        physics.step(fixed_dt, config.velocity_iterations, config.position_iterations);
        *accumulator -= fixed_dt;
        steps += 1;
    }
    if *accumulator + ACCUMULATOR_EPSILON >= fixed_dt {
        log::warn!(
            "physics fell behind: dropping {:.3}s after {steps} sub-steps",
            *accumulator - accumulator.rem_euclid(fixed_dt)
        );
        *accumulator = accumulator.rem_euclid(fixed_dt);
    }
    steps
}

/// Copy physics results into the store.
pub fn sync_from_physics(store: &mut EntityStore, physics: &dyn PhysicsBridge) {
    for id in store.query(&[ComponentKind::PhysicsBody, ComponentKind::Transform]) {
        // Parented poses come from the hierarchy.
        if store.has(id, ComponentKind::Parent) {
            continue;
        }
        let Some(handle) = store.get::<PhysicsBody>(id).and_then(|b| b.handle) else {
            continue;
        };
        let (Some(position), Some(angle)) =
            (physics.body_position(handle), physics.body_angle(handle))
        else {
            continue;
        };
        if let Some(transform) = store.get_mut::<Transform>(id) {
            transform.position = position;
            transform.set_rotation(angle);
        }
    }

    for id in store.query(&[ComponentKind::TurretJoint, ComponentKind::Parent]) {
        let Some(turret) = store.get::<TurretJoint>(id).copied() else {
            continue;
        };
        let Some(angle) = turret.joint().and_then(|j| physics.joint_angle(j)) else {
            continue;
        };
        if let Some(parent) = store.get_mut::<Parent>(id) {
            parent.local_rotation = turret.mount_angle + angle;
        }
    }
}

#[derive(Debug, Default)]
pub struct PhysicsStepSystem {
    accumulator: f32,
}

impl System for PhysicsStepSystem {
    fn name(&self) -> &'static str {
        "physics"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        create_missing_bodies(ctx.store, ctx.physics);
        ctx.stats.physics_substeps = step_fixed(
            ctx.physics,
            &mut self.accumulator,
            ctx.time.dt,
            &ctx.config.physics,
        );
        sync_from_physics(ctx.store, ctx.physics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::RapierWorld;
    use tankarena_core::types::Vec2;

    #[test]
    fn accumulator_steps_at_fixed_rate() {
        let mut physics = RapierWorld::new();
        let config = PhysicsConfig::default();
        let mut acc = 0.0;

        assert_eq!(step_fixed(&mut physics, &mut acc, config.fixed_dt * 0.5, &config), 0);
        assert_eq!(step_fixed(&mut physics, &mut acc, config.fixed_dt * 0.5, &config), 1);
        assert_eq!(step_fixed(&mut physics, &mut acc, config.fixed_dt * 3.0, &config), 3);
        assert!(acc.abs() < 1e-4);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut physics = RapierWorld::new();
        let config = PhysicsConfig {
            max_substeps: 4,
            ..Default::default()
        };
        let mut acc = 0.0;
        assert_eq!(step_fixed(&mut physics, &mut acc, 1.0, &config), 4);
        assert!(acc <= config.fixed_dt);
    }

    #[test]
    fn bodies_are_created_once_and_synced_back() {
        let mut store = EntityStore::new();
        let mut physics = RapierWorld::new();
        let id = store.create_entity();
        store.insert(id, Transform::new(Vec2::new(1.0, 2.0), 0.5));
        store.insert(id, PhysicsBody::new(1.0, 1.0).unwrap());

        create_missing_bodies(&mut store, &mut physics);
        create_missing_bodies(&mut store, &mut physics);
        assert_eq!(physics.body_count(), 1);

        let handle = store.get::<PhysicsBody>(id).unwrap().handle.unwrap();
        physics.set_linear_velocity(handle, Vec2::new(60.0, 0.0)).unwrap();
        physics.step(1.0 / 60.0, 8, 3);
        sync_from_physics(&mut store, &physics);

        let transform = store.get::<Transform>(id).unwrap();
        assert!((transform.position.x - 2.0).abs() < 1e-3);
        assert!((transform.rotation() - 0.5).abs() < 1e-5);
    }
}
