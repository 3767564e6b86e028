//! Systems that operate on the entity store each tick.
//!
//! Each module exposes a `run`-style function holding the logic and a unit
//! struct implementing [`crate::scheduler::System`] that the scheduler drives.
//! Systems keep no state of their own beyond what the components hold; the
//! physics accumulator is the one exception.

pub mod ai;
pub mod camera;
pub mod cleanup;
pub mod firing;
pub mod gunnery;
pub mod hierarchy;
pub mod input;
pub mod lifetime;
pub mod movement;
pub mod physics_step;
pub mod snapshot;
pub mod turret;
