//! Drone AI: circle a target, keep the guns on it.

use tankarena_core::components::{DriveIntent, Orbit, Transform};
use tankarena_core::enums::ComponentKind;
use tankarena_core::types::{normalize_angle, Vec2};

use crate::scheduler::{System, TickContext};
use crate::store::EntityStore;

/// Distance from the orbit waypoint inside which drive input tapers off.
const ARRIVE_RADIUS: f32 = 40.0;

/// Advance every orbit and write the resulting intent. A drone whose target
/// is gone idles: no drive, no aim, no fire.
pub fn run(store: &mut EntityStore, dt: f32) {
    for id in store.query(&[ComponentKind::Orbit, ComponentKind::Transform]) {
        let (Some(orbit), Some(position)) = (
            store.get::<Orbit>(id).copied(),
            store.get::<Transform>(id).map(|t| t.position),
        ) else {
            continue;
        };

        let target = orbit
            .target
            .and_then(|t| store.get::<Transform>(t))
            .map(|t| t.position);

        let intent = match target {
            Some(target) => {
                let angle = normalize_angle(orbit.angle + orbit.angular_speed * dt);
                if let Some(o) = store.get_mut::<Orbit>(id) {
                    o.angle = angle;
                }
                let waypoint = target + Vec2::new(angle.cos(), angle.sin()) * orbit.radius();
                DriveIntent {
                    direction: ((waypoint - position) / ARRIVE_RADIUS).clamp_length_max(1.0),
                    aim_point: Some(target),
                    fire: true,
                }
            }
            None => DriveIntent::default(),
        };
        store.insert(id, intent);
    }
}

pub struct AiSystem;

impl System for AiSystem {
    fn name(&self) -> &'static str {
        "ai"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        run(ctx.store, ctx.time.dt);
    }
}
