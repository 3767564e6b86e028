//! Hands each tank's aim and trigger to the turrets mounted on it.

use tankarena_core::components::{DriveIntent, Parent, TurretJoint, Weapon};
use tankarena_core::enums::ComponentKind;

use crate::scheduler::{System, TickContext};
use crate::store::EntityStore;

pub fn run(store: &mut EntityStore) {
    for id in store.query(&[ComponentKind::TurretJoint, ComponentKind::Parent]) {
        let intent = store
            .get::<Parent>(id)
            .and_then(|p| p.parent)
            .and_then(|tank| store.get::<DriveIntent>(tank))
            .copied()
            .unwrap_or_default();

        if let Some(turret) = store.get_mut::<TurretJoint>(id) {
            turret.aim_point = intent.aim_point;
        }
        if let Some(weapon) = store.get_mut::<Weapon>(id) {
            weapon.trigger = intent.fire;
        }
    }
}

pub struct GunnerySystem;

impl System for GunnerySystem {
    fn name(&self) -> &'static str {
        "gunnery"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        run(ctx.store);
    }
}
