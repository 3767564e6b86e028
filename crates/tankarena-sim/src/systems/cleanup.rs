//! Cleanup system: removes expired entities, releasing what physics holds
//! for them first.

use tankarena_core::components::{Lifetime, Parent, PhysicsBody, TurretJoint};
use tankarena_core::enums::ComponentKind;
use tankarena_core::events::SimEvent;
use tankarena_core::EntityId;

use crate::physics::PhysicsBridge;
use crate::scheduler::{System, TickContext};
use crate::store::EntityStore;

fn release_joint(
    store: &mut EntityStore,
    physics: &mut dyn PhysicsBridge,
    events: &mut Vec<SimEvent>,
    turret: EntityId,
) {
    let Some(handle) = store.get_mut::<TurretJoint>(turret).and_then(TurretJoint::detach) else {
        return;
    };
    if let Err(err) = physics.destroy_joint(handle) {
        log::debug!("{turret}: joint already gone: {err}");
    }
    events.push(SimEvent::JointDestroyed { turret });
    log::debug!("{turret}: joint {handle:?} destroyed");
}

/// Remove an entity and every physics resource tied to it: its own joint,
/// the joints of turrets mounted on it, then its body. Returns false for a
/// stale id.
pub fn despawn_entity(
    store: &mut EntityStore,
    physics: &mut dyn PhysicsBridge,
    events: &mut Vec<SimEvent>,
    id: EntityId,
) -> bool {
    if !store.is_alive(id) {
        return false;
    }

    release_joint(store, physics, events, id);
    let mounted: Vec<EntityId> = store
        .query(&[ComponentKind::TurretJoint, ComponentKind::Parent])
        .into_iter()
        .filter(|&turret| store.get::<Parent>(turret).and_then(|p| p.parent) == Some(id))
        .collect();
    for turret in mounted {
        release_joint(store, physics, events, turret);
    }

    if let Some(handle) = store.get_mut::<PhysicsBody>(id).and_then(|b| b.handle.take()) {
        if let Err(err) = physics.destroy_body(handle) {
            log::warn!("{id}: body release failed: {err}");
        }
    }

    store.destroy_entity(id);
    events.push(SimEvent::EntityDespawned { entity: id });
    log::debug!("{id}: despawned");
    true
}

/// Despawn every entity whose lifetime has run out.
pub fn run(store: &mut EntityStore, physics: &mut dyn PhysicsBridge, events: &mut Vec<SimEvent>) {
    let expired: Vec<EntityId> = store
        .query(&[ComponentKind::Lifetime])
        .into_iter()
        .filter(|&id| store.get::<Lifetime>(id).is_some_and(Lifetime::expired))
        .collect();
    for id in expired {
        despawn_entity(store, physics, events, id);
    }
}

pub struct CleanupSystem;

impl System for CleanupSystem {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        run(ctx.store, ctx.physics, ctx.events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::RapierWorld;

    #[test]
    fn expired_entities_are_removed() {
        let mut store = EntityStore::new();
        let mut physics = RapierWorld::new();
        let mut events = Vec::new();
        let done = store.create_entity();
        store.insert(done, Lifetime { remaining: 0.0 });
        let live = store.create_entity();
        store.insert(live, Lifetime { remaining: 0.1 });

        run(&mut store, &mut physics, &mut events);
        assert!(!store.is_alive(done));
        assert!(store.is_alive(live));
        assert_eq!(events, vec![SimEvent::EntityDespawned { entity: done }]);
    }

    #[test]
    fn stale_despawn_is_a_no_op() {
        let mut store = EntityStore::new();
        let mut physics = RapierWorld::new();
        let mut events = Vec::new();
        let id = store.create_entity();
        assert!(despawn_entity(&mut store, &mut physics, &mut events, id));
        assert!(!despawn_entity(&mut store, &mut physics, &mut events, id));
        assert_eq!(events.len(), 1);
    }
}
