//! Ordered system execution.
//!
//! Systems run strictly in registration order, once per tick. The standard
//! order is fixed in [`Scheduler::standard`] and nowhere else: input before
//! movement, movement before the hierarchy, the hierarchy before turrets,
//! firing and the camera.

use tankarena_core::config::SimConfig;
use tankarena_core::events::SimEvent;
use tankarena_core::input::InputState;
use tankarena_core::types::SimTime;

use crate::physics::PhysicsBridge;
use crate::store::EntityStore;
use crate::systems;

/// Per-frame counters systems report back to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Fixed physics steps taken this frame.
    pub physics_substeps: u32,
}

/// Everything a system may touch during one tick.
pub struct TickContext<'a> {
    pub store: &'a mut EntityStore,
    pub physics: &'a mut dyn PhysicsBridge,
    pub input: &'a InputState,
    /// Start-of-frame clock; `time.dt` is the frame length.
    pub time: SimTime,
    pub config: &'a SimConfig,
    pub events: &'a mut Vec<SimEvent>,
    pub stats: &'a mut FrameStats,
}

pub trait System {
    fn name(&self) -> &'static str;

    fn update(&mut self, ctx: &mut TickContext<'_>);

    /// Release anything the system owns outside the store. Called on removal.
    fn shutdown(&mut self, _ctx: &mut TickContext<'_>) {}
}

#[derive(Default)]
pub struct Scheduler {
    systems: Vec<Box<dyn System>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The arena's system order.
    pub fn standard() -> Self {
        let mut scheduler = Self::new();
        scheduler.add(Box::new(systems::input::InputSystem));
        scheduler.add(Box::new(systems::ai::AiSystem));
        scheduler.add(Box::new(systems::gunnery::GunnerySystem));
        scheduler.add(Box::new(systems::movement::MovementSystem));
        scheduler.add(Box::new(systems::physics_step::PhysicsStepSystem::default()));
        scheduler.add(Box::new(systems::hierarchy::HierarchySystem));
        scheduler.add(Box::new(systems::turret::TurretSystem));
        scheduler.add(Box::new(systems::firing::FiringSystem));
        scheduler.add(Box::new(systems::lifetime::LifetimeSystem));
        scheduler.add(Box::new(systems::camera::CameraSystem));
        scheduler.add(Box::new(systems::cleanup::CleanupSystem));
        log::info!("scheduler ready: {}", scheduler.names().join(" -> "));
        scheduler
    }

    /// Append a system after every registered one.
    pub fn add(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    /// Run every system once, in order.
    pub fn update(&mut self, ctx: &mut TickContext<'_>) {
        for system in &mut self.systems {
            system.update(ctx);
        }
    }

    /// Remove the first system called `name`, shutting it down first.
    pub fn remove(&mut self, name: &str, ctx: &mut TickContext<'_>) -> bool {
        let Some(pos) = self.systems.iter().position(|s| s.name() == name) else {
            return false;
        };
        let mut system = self.systems.remove(pos);
        system.shutdown(ctx);
        log::info!("removed system {name}");
        true
    }

    /// Shut down and drop every system, last registered first.
    pub fn shutdown(&mut self, ctx: &mut TickContext<'_>) {
        while let Some(mut system) = self.systems.pop() {
            system.shutdown(ctx);
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
