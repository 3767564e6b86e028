//! Weapon fire: reload gating and projectile launch.

use tankarena_core::components::{Transform, Weapon};
use tankarena_core::enums::ComponentKind;
use tankarena_core::events::SimEvent;
use tankarena_core::types::rotate;

use crate::scheduler::{System, TickContext};
use crate::store::EntityStore;
use crate::world_setup;

/// Fire every triggered weapon whose reload has elapsed at `now`.
pub fn run(store: &mut EntityStore, events: &mut Vec<SimEvent>, now: f32) {
    for id in store.query(&[ComponentKind::Weapon, ComponentKind::Transform]) {
        let (Some(weapon), Some(transform)) = (
            store.get::<Weapon>(id).copied(),
            store.get::<Transform>(id).copied(),
        ) else {
            continue;
        };
        if !weapon.trigger || !weapon.can_fire(now) {
            continue;
        }
        if let Some(weapon) = store.get_mut::<Weapon>(id) {
            weapon.record_shot(now);
        }

        let rotation = transform.rotation();
        let muzzle = transform.position + rotate(weapon.muzzle_offset, rotation);
        let projectile = world_setup::spawn_projectile(
            store,
            id,
            muzzle,
            rotation,
            weapon.projectile_speed,
            weapon.projectile_lifetime,
        );
        events.push(SimEvent::ShotFired {
            turret: id,
            projectile,
            position: muzzle,
            rotation,
            phase: weapon.phase.phase(),
        });
    }
}

pub struct FiringSystem;

impl System for FiringSystem {
    fn name(&self) -> &'static str {
        "firing"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        run(ctx.store, ctx.events, ctx.time.elapsed_secs);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use tankarena_core::components::{Lifetime, PhaseConfig, Projectile, TurretPhase, Velocity};
    use tankarena_core::types::Vec2;

    #[test]
    fn shot_spawns_projectile_at_muzzle() {
        let mut store = EntityStore::new();
        let turret = store.create_entity();
        store.insert(turret, Transform::new(Vec2::new(10.0, 0.0), FRAC_PI_2));
        let phase = TurretPhase::new(PhaseConfig::new(1, 1.0).unwrap(), 1).unwrap();
        let mut weapon = Weapon::new(phase, 0.0, Vec2::new(5.0, 0.0));
        weapon.trigger = true;
        store.insert(turret, weapon);

        let mut events = Vec::new();
        run(&mut store, &mut events, 0.0);
        assert_eq!(events.len(), 1);
        let SimEvent::ShotFired { projectile, position, .. } = events[0] else {
            panic!("expected a shot, got {:?}", events[0]);
        };
        assert!((position - Vec2::new(10.0, 5.0)).length() < 1e-5);
        assert_eq!(store.get::<Projectile>(projectile).unwrap().owner, turret);
        let velocity = store.get::<Velocity>(projectile).unwrap();
        assert!(velocity.linear.y > 0.0 && velocity.linear.x.abs() < 1e-3);
        assert!(store.get::<Lifetime>(projectile).is_some());

        // Reloading.
        run(&mut store, &mut events, 0.5);
        assert_eq!(events.len(), 1);
        run(&mut store, &mut events, 1.0);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn released_trigger_holds_fire() {
        let mut store = EntityStore::new();
        let turret = store.create_entity();
        store.insert(turret, Transform::default());
        let phase = TurretPhase::new(PhaseConfig::new(1, 1.0).unwrap(), 1).unwrap();
        store.insert(turret, Weapon::new(phase, 0.0, Vec2::ZERO));

        let mut events = Vec::new();
        run(&mut store, &mut events, 5.0);
        assert!(events.is_empty());
        assert_eq!(store.get::<Weapon>(turret).unwrap().shots_fired, 0);
    }
}
