//! Drive integration.
//!
//! Thrusters turn `DriveIntent` into velocity: acceleration `F/m` along the
//! intent, capped at `max_speed`, exponential braking with no input, and a
//! rate-limited hull turn toward the travel direction. Bodied entities hand
//! the velocity to physics; everything else integrates its transform here.

use tankarena_core::components::{DriveIntent, PhysicsBody, Thruster, Transform, Velocity};
use tankarena_core::enums::ComponentKind;
use tankarena_core::types::{heading_of, shortest_angle_diff, Vec2};

use crate::physics::PhysicsBridge;
use crate::scheduler::{System, TickContext};
use crate::store::EntityStore;

/// Angular velocity turning `current` toward `heading` without overshooting
/// within one frame.
pub fn turn_toward(current: f32, heading: f32, turn_rate: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    let diff = shortest_angle_diff(current, heading);
    diff.signum() * turn_rate.min(diff.abs() / dt)
}

/// Velocity after one frame of thrust or braking.
pub fn drive(
    velocity: Velocity,
    thruster: &Thruster,
    intent: &DriveIntent,
    mass: f32,
    rotation: f32,
    dt: f32,
) -> Velocity {
    let direction = intent.direction.clamp_length_max(1.0);
    let linear = if direction == Vec2::ZERO {
        velocity.linear * thruster.brake.powf(dt)
    } else {
        let accel = direction * (thruster.max_force() / mass);
        (velocity.linear + accel * dt).clamp_length_max(thruster.max_speed)
    };
    let angular = heading_of(direction)
        .map(|heading| turn_toward(rotation, heading, thruster.turn_rate, dt))
        .unwrap_or(0.0);
    Velocity { linear, angular }
}

pub fn run(store: &mut EntityStore, physics: &mut dyn PhysicsBridge, dt: f32) {
    for id in store.query(&[
        ComponentKind::Thruster,
        ComponentKind::Velocity,
        ComponentKind::Transform,
    ]) {
        let (Some(thruster), Some(velocity), Some(rotation)) = (
            store.get::<Thruster>(id).copied(),
            store.get::<Velocity>(id).copied(),
            store.get::<Transform>(id).map(Transform::rotation),
        ) else {
            continue;
        };
        let intent = store.get::<DriveIntent>(id).copied().unwrap_or_default();
        let body = store.get::<PhysicsBody>(id).copied();
        let mass = body.map(|b| b.mass()).filter(|&m| m > 0.0).unwrap_or(1.0);

        let next = drive(velocity, &thruster, &intent, mass, rotation, dt);
        store.insert(id, next);

        if let Some(handle) = body.and_then(|b| b.handle) {
            let pushed = physics
                .set_linear_velocity(handle, next.linear)
                .and_then(|()| physics.set_angular_velocity(handle, next.angular));
            if let Err(err) = pushed {
                log::warn!("{id}: velocity not applied: {err}");
            }
        }
    }

    // Bodies move under physics; the rest move here.
    for id in store.query(&[ComponentKind::Velocity, ComponentKind::Transform]) {
        if store.has(id, ComponentKind::PhysicsBody) {
            continue;
        }
        let Some(velocity) = store.get::<Velocity>(id).copied() else {
            continue;
        };
        if let Some(transform) = store.get_mut::<Transform>(id) {
            transform.position += velocity.linear * dt;
            let rotation = transform.rotation() + velocity.angular * dt;
            transform.set_rotation(rotation);
        }
    }
}

pub struct MovementSystem;

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        run(ctx.store, ctx.physics, ctx.time.dt);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;
    use crate::physics::RapierWorld;

    fn thruster() -> Thruster {
        Thruster::new(100.0, 50.0, 2.0).unwrap()
    }

    #[test]
    fn thrust_is_capped_at_max_speed() {
        let intent = DriveIntent {
            direction: Vec2::X,
            ..Default::default()
        };
        let mut velocity = Velocity::default();
        for _ in 0..100 {
            velocity = drive(velocity, &thruster(), &intent, 1.0, 0.0, 0.1);
        }
        assert!((velocity.linear.length() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn no_input_brakes() {
        let moving = Velocity {
            linear: Vec2::new(40.0, 0.0),
            angular: 1.0,
        };
        let next = drive(moving, &thruster(), &DriveIntent::default(), 1.0, 0.0, 0.5);
        assert!(next.linear.x < 40.0 && next.linear.x > 0.0);
        assert_eq!(next.angular, 0.0);
    }

    #[test]
    fn turn_does_not_overshoot_heading() {
        assert!((turn_toward(0.0, PI / 2.0, 2.0, 0.1) - 2.0).abs() < 1e-6);
        // 0.05 rad left to go at dt 0.1 caps the rate at 0.5 rad/s.
        assert!((turn_toward(0.0, 0.05, 2.0, 0.1) - 0.5).abs() < 1e-5);
        assert!(turn_toward(0.5, 0.0, 2.0, 0.1) < 0.0);
    }

    #[test]
    fn bodiless_entities_integrate_their_transform() {
        let mut store = EntityStore::new();
        let mut physics = RapierWorld::new();
        let id = store.create_entity();
        store.insert(id, Transform::default());
        store.insert(
            id,
            Velocity {
                linear: Vec2::new(10.0, 0.0),
                angular: 0.0,
            },
        );
        run(&mut store, &mut physics, 0.5);
        assert_eq!(store.get::<Transform>(id).unwrap().position, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn bodied_entities_push_velocity_to_physics() {
        let mut store = EntityStore::new();
        let mut physics = RapierWorld::new();
        let handle = physics.create_body(&crate::physics::BodyDef {
            position: Vec2::ZERO,
            rotation: 0.0,
            mass: 1.0,
            inertia: 1.0,
        });
        let id = store.create_entity();
        store.insert(id, Transform::default());
        store.insert(id, Velocity::default());
        store.insert(id, thruster());
        let mut body = PhysicsBody::new(1.0, 1.0).unwrap();
        body.handle = Some(handle);
        store.insert(id, body);
        store.insert(
            id,
            DriveIntent {
                direction: Vec2::X,
                ..Default::default()
            },
        );

        run(&mut store, &mut physics, 0.1);
        let (linear, _) = physics.body_velocity(handle).unwrap();
        assert!((linear.x - 10.0).abs() < 1e-4);
        // Physics owns the pose.
        assert_eq!(store.get::<Transform>(id).unwrap().position, Vec2::ZERO);
    }
}
