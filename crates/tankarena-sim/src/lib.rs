//! Simulation engine for the tank arena.
//!
//! Owns the entity store, drives systems in a fixed order each frame, and
//! talks to physics only through [`physics::PhysicsBridge`].

pub mod engine;
pub mod physics;
pub mod scheduler;
pub mod store;
pub mod systems;
pub mod world_setup;

pub use engine::Simulation;
pub use store::EntityStore;
pub use tankarena_core as core;
