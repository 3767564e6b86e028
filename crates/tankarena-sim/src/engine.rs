//! Simulation engine.
//!
//! `Simulation` owns the entity store, the physics collaborator and the
//! scheduler, runs one frame per `tick`, and produces `RenderSnapshot`s.
//! Headless: the host supplies input and frame time.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use tankarena_core::components::{Camera, CameraConfig, Transform};
use tankarena_core::config::SimConfig;
use tankarena_core::enums::CameraMode;
use tankarena_core::error::ConfigError;
use tankarena_core::events::SimEvent;
use tankarena_core::input::InputState;
use tankarena_core::state::RenderSnapshot;
use tankarena_core::stats::SampleHistory;
use tankarena_core::types::{SimTime, Vec2};
use tankarena_core::EntityId;

use crate::physics::{PhysicsBridge, RapierWorld};
use crate::scheduler::{FrameStats, Scheduler, TickContext};
use crate::store::EntityStore;
use crate::systems;
use crate::world_setup::{self, TankIds, TankSpec};

/// Rolling per-frame series for debug graphs.
#[derive(Debug, Clone, Serialize)]
pub struct Telemetry {
    pub physics_substeps: SampleHistory,
    pub entity_count: SampleHistory,
}

impl Telemetry {
    fn new(samples: usize) -> Self {
        Self {
            physics_substeps: SampleHistory::new(samples),
            entity_count: SampleHistory::new(samples),
        }
    }
}

/// Entities created by [`Simulation::spawn_arena`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena {
    pub player: TankIds,
    pub drones: Vec<TankIds>,
    pub camera: EntityId,
}

pub struct Simulation {
    store: EntityStore,
    physics: Box<dyn PhysicsBridge>,
    scheduler: Scheduler,
    config: SimConfig,
    time: SimTime,
    rng: ChaCha8Rng,
    events: Vec<SimEvent>,
    telemetry: Telemetry,
}

impl Simulation {
    /// Simulation backed by a rapier2d [`RapierWorld`].
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        Self::with_physics(config, Box::new(RapierWorld::new()))
    }

    pub fn with_physics(
        config: SimConfig,
        physics: Box<dyn PhysicsBridge>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: EntityStore::new(),
            physics,
            scheduler: Scheduler::standard(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            telemetry: Telemetry::new(config.telemetry_samples),
            config,
            time: SimTime::default(),
            events: Vec::new(),
        })
    }

    /// Run one frame of `frame_dt` seconds and return the resulting snapshot.
    pub fn tick(&mut self, frame_dt: f32, input: &InputState) -> RenderSnapshot {
        self.time.dt = if frame_dt.is_finite() { frame_dt.max(0.0) } else { 0.0 };

        let mut stats = FrameStats::default();
        let mut ctx = TickContext {
            store: &mut self.store,
            physics: self.physics.as_mut(),
            input,
            time: self.time,
            config: &self.config,
            events: &mut self.events,
            stats: &mut stats,
        };
        self.scheduler.update(&mut ctx);
        self.time.advance();

        self.telemetry
            .physics_substeps
            .push(stats.physics_substeps as f32);
        self.telemetry.entity_count.push(self.store.len() as f32);

        systems::snapshot::build_snapshot(&self.store, &self.time)
    }

    /// Spawn a tank whose weapons arm now.
    pub fn spawn_tank(&mut self, spec: &TankSpec) -> Result<TankIds, ConfigError> {
        world_setup::spawn_tank(&mut self.store, spec, self.time.elapsed_secs)
    }

    pub fn spawn_player(&mut self, spec: &TankSpec) -> Result<TankIds, ConfigError> {
        world_setup::spawn_player(&mut self.store, spec, self.time.elapsed_secs)
    }

    pub fn spawn_drone(
        &mut self,
        spec: &TankSpec,
        target: EntityId,
        orbit_radius: f32,
        orbit_speed: f32,
    ) -> Result<TankIds, ConfigError> {
        world_setup::spawn_drone(
            &mut self.store,
            spec,
            target,
            orbit_radius,
            orbit_speed,
            self.time.elapsed_secs,
        )
    }

    /// Spawn a camera starting on its target, or at the origin without one.
    pub fn spawn_camera(
        &mut self,
        config: CameraConfig,
        target: Option<EntityId>,
    ) -> Result<EntityId, ConfigError> {
        let position = target
            .and_then(|t| self.store.get::<Transform>(t))
            .map(|t| t.position)
            .unwrap_or(Vec2::ZERO);
        world_setup::spawn_camera(&mut self.store, config, position, target)
    }

    /// A twin-turret player at the origin, `drone_count` seeded drones around
    /// it and a camera following it.
    pub fn spawn_arena(&mut self, drone_count: usize) -> Result<Arena, ConfigError> {
        let armed_at = self.time.elapsed_secs;
        let player_spec = TankSpec::twin_turret(Vec2::ZERO);
        let player = world_setup::spawn_player(&mut self.store, &player_spec, armed_at)?;
        let drones = world_setup::spawn_arena(
            &mut self.store,
            &mut self.rng,
            player.hull,
            drone_count,
            armed_at,
        )?;
        let camera = self.spawn_camera(CameraConfig::default(), Some(player.hull))?;
        log::info!("arena ready: {} drones, seed {}", drones.len(), self.config.seed);
        Ok(Arena {
            player,
            drones,
            camera,
        })
    }

    /// Remove an entity, releasing its physics body and joints first.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        systems::cleanup::despawn_entity(
            &mut self.store,
            self.physics.as_mut(),
            &mut self.events,
            id,
        )
    }

    pub fn set_camera_mode(&mut self, camera: EntityId, mode: CameraMode) -> bool {
        match self.store.get_mut::<Camera>(camera) {
            Some(camera) => {
                camera.mode = mode;
                true
            }
            None => false,
        }
    }

    pub fn set_camera_target(&mut self, camera: EntityId, target: Option<EntityId>) -> bool {
        match self.store.get_mut::<Camera>(camera) {
            Some(camera) => {
                camera.target = target;
                true
            }
            None => false,
        }
    }

    /// Remove a system by name, letting it release what it holds.
    pub fn remove_system(&mut self, name: &str) -> bool {
        let input = InputState::default();
        let mut stats = FrameStats::default();
        let mut ctx = TickContext {
            store: &mut self.store,
            physics: self.physics.as_mut(),
            input: &input,
            time: self.time,
            config: &self.config,
            events: &mut self.events,
            stats: &mut stats,
        };
        self.scheduler.remove(name, &mut ctx)
    }

    /// Shut down every system, last registered first. Joints are released;
    /// bodies stay with their entities. Later ticks run no systems.
    pub fn shutdown(&mut self) {
        let input = InputState::default();
        let mut stats = FrameStats::default();
        let mut ctx = TickContext {
            store: &mut self.store,
            physics: self.physics.as_mut(),
            input: &input,
            time: self.time,
            config: &self.config,
            events: &mut self.events,
            stats: &mut stats,
        };
        self.scheduler.shutdown(&mut ctx);
        log::info!("simulation shut down at tick {}", self.time.tick);
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.scheduler.names()
    }

    /// Events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn physics(&self) -> &dyn PhysicsBridge {
        self.physics.as_ref()
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }
}
