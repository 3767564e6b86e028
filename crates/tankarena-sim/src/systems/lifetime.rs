//! Lifetime countdown. Expired entities are removed by cleanup.

use tankarena_core::components::Lifetime;
use tankarena_core::enums::ComponentKind;

use crate::scheduler::{System, TickContext};
use crate::store::EntityStore;

pub fn run(store: &mut EntityStore, dt: f32) {
    for id in store.query(&[ComponentKind::Lifetime]) {
        if let Some(lifetime) = store.get_mut::<Lifetime>(id) {
            lifetime.remaining -= dt;
        }
    }
}

pub struct LifetimeSystem;

impl System for LifetimeSystem {
    fn name(&self) -> &'static str {
        "lifetime"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        run(ctx.store, ctx.time.dt);
    }
}
