use std::cell::RefCell;
use std::rc::Rc;

use tankarena_core::components::TurretJoint;
use tankarena_core::config::SimConfig;
use tankarena_core::constants::{LAYER_HULL, LAYER_PROJECTILE, LAYER_TURRET};
use tankarena_core::input::InputState;
use tankarena_core::types::{BodyHandle, JointHandle, Vec2};
use tankarena_sim::physics::{
    BodyDef, PhysicsBridge, PhysicsError, RapierWorld, RevoluteJointDef,
};
use tankarena_sim::world_setup::TankSpec;
use tankarena_sim::Simulation;

const DT: f32 = 1.0 / 60.0;

/// Physics that forwards to `RapierWorld` and logs torque updates.
struct RecordingPhysics {
    inner: RapierWorld,
    torques: Rc<RefCell<Vec<f32>>>,
    steps: Rc<RefCell<u32>>,
}

impl PhysicsBridge for RecordingPhysics {
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        self.inner.create_body(def)
    }

    fn destroy_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        self.inner.destroy_body(body)
    }

    fn body_position(&self, body: BodyHandle) -> Option<Vec2> {
        self.inner.body_position(body)
    }

    fn body_angle(&self, body: BodyHandle) -> Option<f32> {
        self.inner.body_angle(body)
    }

    fn set_linear_velocity(
        &mut self,
        body: BodyHandle,
        velocity: Vec2,
    ) -> Result<(), PhysicsError> {
        self.inner.set_linear_velocity(body, velocity)
    }

    fn set_angular_velocity(
        &mut self,
        body: BodyHandle,
        velocity: f32,
    ) -> Result<(), PhysicsError> {
        self.inner.set_angular_velocity(body, velocity)
    }

    fn create_joint(&mut self, def: &RevoluteJointDef) -> Result<JointHandle, PhysicsError> {
        self.inner.create_joint(def)
    }

    fn destroy_joint(&mut self, joint: JointHandle) -> Result<(), PhysicsError> {
        self.inner.destroy_joint(joint)
    }

    fn joint_angle(&self, joint: JointHandle) -> Option<f32> {
        self.inner.joint_angle(joint)
    }

    fn set_motor_speed(&mut self, joint: JointHandle, speed: f32) -> Result<(), PhysicsError> {
        self.inner.set_motor_speed(joint, speed)
    }

    fn set_max_motor_torque(
        &mut self,
        joint: JointHandle,
        torque: f32,
    ) -> Result<(), PhysicsError> {
        self.torques.borrow_mut().push(torque);
        self.inner.set_max_motor_torque(joint, torque)
    }

    fn enable_motor(&mut self, joint: JointHandle, enabled: bool) -> Result<(), PhysicsError> {
        self.inner.enable_motor(joint, enabled)
    }

    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) {
        *self.steps.borrow_mut() += 1;
        self.inner.step(dt, velocity_iterations, position_iterations);
    }

    fn body_count(&self) -> usize {
        self.inner.body_count()
    }

    fn joint_count(&self) -> usize {
        self.inner.joint_count()
    }
}

#[test]
fn json_config_drives_the_physics_rate() {
    let config =
        SimConfig::from_json(r#"{ "seed": 3, "physics": { "fixed_dt": 0.008333334 } }"#)
            .unwrap();
    let steps = Rc::new(RefCell::new(0));
    let physics = RecordingPhysics {
        inner: RapierWorld::new(),
        torques: Rc::default(),
        steps: Rc::clone(&steps),
    };
    let mut sim = Simulation::with_physics(config, Box::new(physics)).unwrap();
    for _ in 0..60 {
        sim.tick(DT, &InputState::default());
    }
    // 120 Hz physics under 60 Hz frames.
    let taken = *steps.borrow();
    assert!((119..=121).contains(&taken), "{taken} steps");
}

#[test]
fn torque_reconfiguration_reaches_the_joint_once() {
    let torques = Rc::new(RefCell::new(Vec::new()));
    let physics = RecordingPhysics {
        inner: RapierWorld::new(),
        torques: Rc::clone(&torques),
        steps: Rc::default(),
    };
    let mut sim = Simulation::with_physics(SimConfig::default(), Box::new(physics)).unwrap();
    let ids = sim.spawn_tank(&TankSpec::new(Vec2::ZERO)).unwrap();
    let turret = ids.turrets[0];

    sim.tick(DT, &InputState::default());
    assert!(torques.borrow().is_empty());

    sim.store_mut()
        .get_mut::<TurretJoint>(turret)
        .unwrap()
        .set_max_motor_torque(50.0)
        .unwrap();
    for _ in 0..5 {
        sim.tick(DT, &InputState::default());
    }
    assert_eq!(*torques.borrow(), vec![50.0]);
}

#[test]
fn arena_snapshot_is_layered() {
    let mut sim = Simulation::new(SimConfig::default()).unwrap();
    let arena = sim.spawn_arena(3).unwrap();
    let input = InputState {
        aim_world: Vec2::new(100.0, 100.0),
        fire: true,
        ..Default::default()
    };
    let snapshot = sim.tick(DT, &input);

    assert_eq!(snapshot.time.tick, 1);
    let layers: Vec<i32> = snapshot.items.iter().map(|i| i.layer).collect();
    let mut sorted = layers.clone();
    sorted.sort();
    assert_eq!(layers, sorted);

    // Player twin hull + drones, their turrets, and the shots fired on tick one.
    let count = |layer| layers.iter().filter(|&&l| l == layer).count();
    assert_eq!(count(LAYER_HULL), 1 + arena.drones.len());
    assert_eq!(count(LAYER_TURRET), 2 + arena.drones.len());
    assert_eq!(count(LAYER_PROJECTILE), 1 + arena.drones.len());

    let camera = snapshot.camera.unwrap();
    assert_eq!(camera.entity, arena.camera);
    assert_eq!(camera.zoom, 1.0);
}

#[test]
fn snapshot_round_trips_through_json() {
    let mut sim = Simulation::new(SimConfig::default()).unwrap();
    sim.spawn_arena(2).unwrap();
    let snapshot = sim.tick(DT, &InputState::default());
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: tankarena_core::state::RenderSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back.items.len(), snapshot.items.len());
    assert_eq!(back.time.tick, snapshot.time.tick);
}

#[test]
fn scroll_zoom_is_clamped_through_the_engine() {
    let mut sim = Simulation::new(SimConfig::default()).unwrap();
    let arena = sim.spawn_arena(0).unwrap();
    let zoom_in = InputState {
        scroll_delta: 5.0,
        ..Default::default()
    };
    let mut snapshot = sim.tick(DT, &zoom_in);
    for _ in 0..20 {
        snapshot = sim.tick(DT, &zoom_in);
    }
    let view = snapshot.camera.unwrap();
    assert_eq!(view.entity, arena.camera);
    assert_eq!(view.zoom, tankarena_core::constants::CAMERA_MAX_ZOOM);
}
