//! Camera controller.
//!
//! Follow and spectate track the target's resolved position through a
//! spring-damper with unit mass, integrated semi-implicitly. Free roam moves
//! the camera straight from input with no momentum. Mode is never changed
//! here.

use tankarena_core::components::{Camera, Transform};
use tankarena_core::enums::{CameraMode, ComponentKind};
use tankarena_core::input::InputState;
use tankarena_core::types::Vec2;

use crate::scheduler::{System, TickContext};
use crate::store::EntityStore;

/// One spring-damper step toward `target`. Without a target the camera stops.
pub fn follow_step(camera: &mut Camera, target: Option<Vec2>, dt: f32, velocity_epsilon: f32) {
    let Some(target) = target else {
        camera.velocity = Vec2::ZERO;
        return;
    };
    let force = -camera.stiffness * (camera.position - target) - camera.damping * camera.velocity;
    camera.velocity += force * dt;
    if camera.velocity.length() < velocity_epsilon {
        camera.velocity = Vec2::ZERO;
    }
    camera.position += camera.velocity * dt;
}

pub fn free_roam_step(camera: &mut Camera, direction: Vec2, dt: f32) {
    camera.position += direction.normalize_or_zero() * camera.free_roam_speed * dt;
    camera.velocity = Vec2::ZERO;
}

pub fn run(store: &mut EntityStore, input: &InputState, dt: f32, velocity_epsilon: f32) {
    for id in store.query(&[ComponentKind::Camera]) {
        let Some(mut camera) = store.get::<Camera>(id).copied() else {
            continue;
        };
        match camera.mode {
            CameraMode::Follow | CameraMode::Spectate => {
                let target = camera
                    .target
                    .and_then(|t| store.get::<Transform>(t))
                    .map(|t| t.position);
                follow_step(&mut camera, target, dt, velocity_epsilon);
            }
            CameraMode::FreeRoam => free_roam_step(&mut camera, input.move_direction, dt),
        }
        if input.scroll_delta != 0.0 {
            camera.apply_scroll(input.scroll_delta);
        }
        store.insert(id, camera);
    }
}

pub struct CameraSystem;

impl System for CameraSystem {
    fn name(&self) -> &'static str {
        "camera"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        run(ctx.store, ctx.input, ctx.time.dt, ctx.config.camera.velocity_epsilon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankarena_core::components::CameraConfig;

    const DT: f32 = 1.0 / 60.0;

    fn camera(mode: CameraMode) -> Camera {
        let config = CameraConfig {
            mode,
            ..Default::default()
        };
        Camera::new(config, Vec2::ZERO).unwrap()
    }

    #[test]
    fn follow_settles_on_target() {
        let mut cam = camera(CameraMode::Follow);
        cam.stiffness = 20.0;
        cam.damping = 8.0;
        let target = Vec2::new(100.0, 0.0);
        let mut peak = 0.0_f32;
        for _ in 0..600 {
            follow_step(&mut cam, Some(target), DT, 1e-3);
            peak = peak.max(cam.position.x);
        }
        assert!((cam.position - target).length() < 0.5, "ended at {}", cam.position);
        assert!(peak < 101.0, "overshoot to {peak}");
    }

    #[test]
    fn follow_without_target_stops() {
        let mut cam = camera(CameraMode::Follow);
        cam.velocity = Vec2::new(5.0, 5.0);
        follow_step(&mut cam, None, DT, 1e-3);
        assert_eq!(cam.velocity, Vec2::ZERO);
        assert_eq!(cam.position, Vec2::ZERO);
    }

    #[test]
    fn tiny_velocity_snaps_to_zero() {
        let mut cam = camera(CameraMode::Follow);
        follow_step(&mut cam, Some(Vec2::new(1e-5, 0.0)), DT, 1e-3);
        assert_eq!(cam.velocity, Vec2::ZERO);
    }

    #[test]
    fn free_roam_moves_without_momentum() {
        let mut store = EntityStore::new();
        let id = store.create_entity();
        let mut cam = camera(CameraMode::FreeRoam);
        cam.velocity = Vec2::new(50.0, 0.0);
        cam.free_roam_speed = 100.0;
        store.insert(id, cam);

        let input = InputState {
            move_direction: Vec2::new(0.0, 3.0),
            scroll_delta: 1.0,
            ..Default::default()
        };
        run(&mut store, &input, 0.5, 1e-3);
        let cam = store.get::<Camera>(id).unwrap();
        assert!((cam.position - Vec2::new(0.0, 50.0)).length() < 1e-4);
        assert_eq!(cam.velocity, Vec2::ZERO);
        assert!(cam.zoom() > 1.0);
        assert_eq!(cam.mode, CameraMode::FreeRoam);
    }

    #[test]
    fn spectate_uses_the_follow_law() {
        let mut store = EntityStore::new();
        let target = store.create_entity();
        store.insert(target, Transform::new(Vec2::new(10.0, 0.0), 0.0));
        let a = store.create_entity();
        let b = store.create_entity();
        for (id, mode) in [(a, CameraMode::Follow), (b, CameraMode::Spectate)] {
            let mut cam = camera(mode);
            cam.target = Some(target);
            store.insert(id, cam);
        }
        run(&mut store, &InputState::default(), DT, 1e-3);
        let follow = store.get::<Camera>(a).unwrap().position;
        let spectate = store.get::<Camera>(b).unwrap().position;
        assert!(follow.x > 0.0);
        assert_eq!(follow, spectate);
    }
}
