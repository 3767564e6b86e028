//! Input routing: the host's `InputState` becomes the player tank's intent.

use tankarena_core::components::{Camera, DriveIntent};
use tankarena_core::enums::{CameraMode, ComponentKind};
use tankarena_core::input::InputState;
use tankarena_core::types::Vec2;

use crate::scheduler::{System, TickContext};
use crate::store::EntityStore;

/// Write movement, aim and fire intent for every player-controlled entity.
/// A free-roaming camera claims the movement direction for itself.
pub fn run(store: &mut EntityStore, input: &InputState) {
    let camera_roaming = store
        .query(&[ComponentKind::Camera])
        .into_iter()
        .filter_map(|id| store.get::<Camera>(id))
        .any(|camera| camera.mode == CameraMode::FreeRoam);

    let direction = if camera_roaming {
        Vec2::ZERO
    } else {
        input.direction()
    };

    for id in store.query(&[ComponentKind::PlayerControlled]) {
        let intent = DriveIntent {
            direction,
            aim_point: Some(input.aim_world),
            fire: input.fire,
        };
        store.insert(id, intent);
    }
}

pub struct InputSystem;

impl System for InputSystem {
    fn name(&self) -> &'static str {
        "input"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        run(ctx.store, ctx.input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankarena_core::components::{CameraConfig, PlayerControlled};

    fn player(store: &mut EntityStore) -> tankarena_core::EntityId {
        let id = store.create_entity();
        store.insert(id, PlayerControlled);
        id
    }

    #[test]
    fn routes_direction_aim_and_fire() {
        let mut store = EntityStore::new();
        let id = player(&mut store);
        let input = InputState {
            move_direction: Vec2::new(0.0, 2.0),
            aim_world: Vec2::new(5.0, 5.0),
            fire: true,
            scroll_delta: 0.0,
        };
        run(&mut store, &input);
        let intent = store.get::<DriveIntent>(id).unwrap();
        assert_eq!(intent.direction, Vec2::new(0.0, 1.0));
        assert_eq!(intent.aim_point, Some(Vec2::new(5.0, 5.0)));
        assert!(intent.fire);
    }

    #[test]
    fn free_roam_camera_suppresses_tank_movement() {
        let mut store = EntityStore::new();
        let id = player(&mut store);
        let cam = store.create_entity();
        let config = CameraConfig {
            mode: CameraMode::FreeRoam,
            ..Default::default()
        };
        store.insert(cam, Camera::new(config, Vec2::ZERO).unwrap());

        let input = InputState {
            move_direction: Vec2::X,
            fire: true,
            ..Default::default()
        };
        run(&mut store, &input);
        let intent = store.get::<DriveIntent>(id).unwrap();
        assert_eq!(intent.direction, Vec2::ZERO);
        assert!(intent.fire);
    }
}
