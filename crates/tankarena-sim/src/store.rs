//! Entity store: generational ids plus one typed pool per component kind.
//!
//! Each pool is a `Vec<Option<T>>` indexed by entity index, so lookups are a
//! bounds check and a generation check. Queries scan every slot; with the
//! entity counts this arena runs at, no index is maintained.

use tankarena_core::components::*;
use tankarena_core::enums::ComponentKind;
use tankarena_core::{EntityAllocator, EntityId};

/// A type stored in one of the entity store's pools.
pub trait Component: Sized + 'static {
    const KIND: ComponentKind;

    #[doc(hidden)]
    fn pool(pools: &ComponentPools) -> &Vec<Option<Self>>;

    #[doc(hidden)]
    fn pool_mut(pools: &mut ComponentPools) -> &mut Vec<Option<Self>>;
}

macro_rules! component_pools {
    ($($field:ident: $ty:ty => $kind:ident),* $(,)?) => {
        /// Backing storage, one pool per [`ComponentKind`].
        #[derive(Debug, Default)]
        pub struct ComponentPools {
            $($field: Vec<Option<$ty>>,)*
        }

        impl ComponentPools {
            fn grow(&mut self, len: usize) {
                $(
                    if self.$field.len() < len {
                        self.$field.resize_with(len, || None);
                    }
                )*
            }

            fn clear_slot(&mut self, idx: usize) {
                $(
                    if let Some(slot) = self.$field.get_mut(idx) {
                        *slot = None;
                    }
                )*
            }

            fn has(&self, idx: usize, kind: ComponentKind) -> bool {
                match kind {
                    $(ComponentKind::$kind => matches!(self.$field.get(idx), Some(Some(_))),)*
                }
            }

            fn remove_kind(&mut self, idx: usize, kind: ComponentKind) -> bool {
                match kind {
                    $(ComponentKind::$kind => self
                        .$field
                        .get_mut(idx)
                        .and_then(Option::take)
                        .is_some(),)*
                }
            }
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;

                fn pool(pools: &ComponentPools) -> &Vec<Option<Self>> {
                    &pools.$field
                }

                fn pool_mut(pools: &mut ComponentPools) -> &mut Vec<Option<Self>> {
                    &mut pools.$field
                }
            }
        )*
    };
}

component_pools! {
    transforms: Transform => Transform,
    parents: Parent => Parent,
    bodies: PhysicsBody => PhysicsBody,
    velocities: Velocity => Velocity,
    thrusters: Thruster => Thruster,
    intents: DriveIntent => DriveIntent,
    orbits: Orbit => Orbit,
    turret_joints: TurretJoint => TurretJoint,
    weapons: Weapon => Weapon,
    projectiles: Projectile => Projectile,
    lifetimes: Lifetime => Lifetime,
    cameras: Camera => Camera,
    renderables: Renderable => Renderable,
    player_controlled: PlayerControlled => PlayerControlled,
}

/// Owns entity identities and every component instance.
#[derive(Debug, Default)]
pub struct EntityStore {
    allocator: EntityAllocator,
    alive: Vec<bool>,
    pools: ComponentPools,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_entity(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        let idx = id.index as usize;
        if self.alive.len() <= idx {
            self.alive.resize(idx + 1, false);
            self.pools.grow(idx + 1);
        }
        self.alive[idx] = true;
        id
    }

    /// Remove the entity and all of its components. External resources held
    /// by those components are not released here; see `cleanup::despawn_entity`.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.index as usize;
        self.alive[idx] = false;
        self.pools.clear_slot(idx);
        self.allocator.deallocate(id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
            && self.alive.get(id.index as usize).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.alive.iter().filter(|&&alive| alive).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach a component, replacing any existing one of the same kind.
    /// Returns the replaced component. Stale ids are ignored.
    pub fn insert<T: Component>(&mut self, id: EntityId, component: T) -> Option<T> {
        if !self.is_alive(id) {
            log::warn!("insert {:?} on dead entity {id}", T::KIND);
            return None;
        }
        T::pool_mut(&mut self.pools)[id.index as usize].replace(component)
    }

    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        if !self.is_alive(id) {
            return None;
        }
        T::pool(&self.pools).get(id.index as usize)?.as_ref()
    }

    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        if !self.is_alive(id) {
            return None;
        }
        T::pool_mut(&mut self.pools)
            .get_mut(id.index as usize)?
            .as_mut()
    }

    pub fn remove<T: Component>(&mut self, id: EntityId) -> Option<T> {
        if !self.is_alive(id) {
            return None;
        }
        T::pool_mut(&mut self.pools)
            .get_mut(id.index as usize)?
            .take()
    }

    /// Drop a component by kind. Returns whether one was present.
    pub fn remove_kind(&mut self, id: EntityId, kind: ComponentKind) -> bool {
        self.is_alive(id) && self.pools.remove_kind(id.index as usize, kind)
    }

    pub fn has(&self, id: EntityId, kind: ComponentKind) -> bool {
        self.is_alive(id) && self.pools.has(id.index as usize, kind)
    }

    /// Every live entity holding all of `kinds`, in ascending index order.
    /// An empty `kinds` matches every live entity.
    pub fn query(&self, kinds: &[ComponentKind]) -> Vec<EntityId> {
        self.alive
            .iter()
            .enumerate()
            .filter(|&(idx, &alive)| alive && kinds.iter().all(|&k| self.pools.has(idx, k)))
            .filter_map(|(idx, _)| self.allocator.current(idx as u32))
            .collect()
    }

    /// Every live entity.
    pub fn entities(&self) -> Vec<EntityId> {
        self.query(&[])
    }
}
