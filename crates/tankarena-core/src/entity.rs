use serde::{Deserialize, Serialize};

/// Handle to a simulated object. The generation tells a recycled slot apart
/// from the object that used to live there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

impl EntityId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}g{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    generation: u32,
    live: bool,
}

/// Hands out entity ids, recycling released slots under a new generation.
#[derive(Debug, Clone, Default)]
pub struct EntityAllocator {
    slots: Vec<Slot>,
    released: Vec<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> EntityId {
        let index = match self.released.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.live = true;
        EntityId::new(index, slot.generation)
    }

    /// Release `id`. A stale or unknown id is left alone and yields false.
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.released.push(id.index);
        true
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.current(id.index) == Some(id)
    }

    /// The live id occupying `index`, if any.
    pub fn current(&self, index: u32) -> Option<EntityId> {
        self.slots
            .get(index as usize)
            .filter(|slot| slot.live)
            .map(|slot| EntityId::new(index, slot.generation))
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.live && slot.generation == id.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_slot_comes_back_under_a_new_generation() {
        let mut ids = EntityAllocator::new();
        let tank = ids.allocate();
        let shell = ids.allocate();
        assert_eq!((tank.index, shell.index), (0, 1));

        assert!(ids.deallocate(tank));
        assert_eq!(ids.current(0), None);

        let turret = ids.allocate();
        assert_eq!(turret, EntityId::new(0, 1));
        assert!(ids.is_alive(turret));
        assert!(!ids.is_alive(tank));
        assert_eq!(ids.current(1), Some(shell));
    }

    #[test]
    fn stale_release_leaves_the_new_occupant_alone() {
        let mut ids = EntityAllocator::new();
        let first = ids.allocate();
        assert!(ids.deallocate(first));
        assert!(!ids.deallocate(first));

        let second = ids.allocate();
        assert!(!ids.deallocate(first));
        assert!(ids.is_alive(second));
        assert_ne!(ids.allocate().index, second.index);
    }

    #[test]
    fn unknown_index_is_not_alive() {
        let ids = EntityAllocator::new();
        assert!(!ids.is_alive(EntityId::new(7, 0)));
        assert_eq!(ids.current(7), None);
    }
}
