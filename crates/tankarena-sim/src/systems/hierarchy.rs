//! Parent-relative placement.
//!
//! Single level: a child reads its parent's transform as already resolved
//! this tick. Deeper chains are not ordered.

use tankarena_core::components::{Parent, Transform};
use tankarena_core::enums::ComponentKind;
use tankarena_core::types::{rotate, Vec2};

use crate::scheduler::{System, TickContext};
use crate::store::EntityStore;

/// World transform of a child given its parent's world transform. With no
/// parent the local placement is used as-is.
pub fn resolve(parent_world: Option<&Transform>, link: &Parent, scale: Vec2) -> Transform {
    let world = match parent_world {
        Some(parent) => Transform::new(
            parent.position + rotate(link.local_offset, parent.rotation()),
            parent.rotation() + link.local_rotation,
        ),
        None => Transform::new(link.local_offset, link.local_rotation),
    };
    world.with_scale(scale)
}

pub fn run(store: &mut EntityStore) {
    for id in store.query(&[ComponentKind::Transform, ComponentKind::Parent]) {
        let (Some(link), Some(scale)) = (
            store.get::<Parent>(id).copied(),
            store.get::<Transform>(id).map(|t| t.scale),
        ) else {
            continue;
        };
        let parent_world = link.parent.and_then(|p| store.get::<Transform>(p)).copied();
        let world = resolve(parent_world.as_ref(), &link, scale);
        store.insert(id, world);
    }
}

pub struct HierarchySystem;

impl System for HierarchySystem {
    fn name(&self) -> &'static str {
        "hierarchy"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        run(ctx.store);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;

    #[test]
    fn child_offset_rotates_with_parent() {
        let parent = Transform::new(Vec2::new(10.0, 0.0), FRAC_PI_2);
        let link = Parent {
            parent: None,
            local_offset: Vec2::new(2.0, 0.0),
            local_rotation: PI,
        };
        let world = resolve(Some(&parent), &link, Vec2::ONE);
        assert!((world.position - Vec2::new(10.0, 2.0)).length() < 1e-5);
        assert!((world.rotation() - 1.5 * PI).abs() < 1e-5);
    }

    #[test]
    fn missing_parent_uses_local_placement() {
        let mut store = EntityStore::new();
        let parent = store.create_entity();
        let child = store.create_entity();
        store.insert(child, Transform::new(Vec2::new(99.0, 99.0), 0.0));
        store.insert(child, Parent::new(parent, Vec2::new(3.0, 4.0), 0.25));

        // Parent alive but without a transform.
        run(&mut store);
        let t = *store.get::<Transform>(child).unwrap();
        assert_eq!(t.position, Vec2::new(3.0, 4.0));
        assert!((t.rotation() - 0.25).abs() < 1e-6);

        store.insert(parent, Transform::new(Vec2::new(1.0, 1.0), 0.0));
        run(&mut store);
        assert_eq!(store.get::<Transform>(child).unwrap().position, Vec2::new(4.0, 5.0));

        store.destroy_entity(parent);
        run(&mut store);
        assert_eq!(store.get::<Transform>(child).unwrap().position, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn child_keeps_its_scale() {
        let mut store = EntityStore::new();
        let child = store.create_entity();
        store.insert(child, Transform::default().with_scale(Vec2::splat(2.0)));
        store.insert(
            child,
            Parent {
                parent: None,
                local_offset: Vec2::ZERO,
                local_rotation: 0.0,
            },
        );
        run(&mut store);
        assert_eq!(store.get::<Transform>(child).unwrap().scale, Vec2::splat(2.0));
    }
}
