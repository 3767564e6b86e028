//! Core types and definitions for the tank arena simulation.
//!
//! This crate defines the vocabulary shared by the simulation: entity ids,
//! components, configuration, errors, input, events and render snapshots.
//! It has no dependency on any physics, windowing or rendering backend.

pub mod components;
pub mod config;
pub mod constants;
pub mod entity;
pub mod enums;
pub mod error;
pub mod events;
pub mod input;
pub mod state;
pub mod stats;
pub mod types;

pub use entity::{EntityAllocator, EntityId};
pub use error::ConfigError;
