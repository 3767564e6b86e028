//! Events emitted by the simulation for audio, effects and UI feedback.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::types::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A turret was coupled to its tank.
    JointCreated { turret: EntityId },
    /// A turret joint was released.
    JointDestroyed { turret: EntityId },
    /// A turret fired.
    ShotFired {
        turret: EntityId,
        projectile: EntityId,
        position: Vec2,
        rotation: f32,
        phase: u32,
    },
    /// An entity was removed from the store.
    EntityDespawned { entity: EntityId },
}
