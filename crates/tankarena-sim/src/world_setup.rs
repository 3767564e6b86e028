//! Entity spawn factories.
//!
//! Every factory validates its whole bundle before touching the store, so a
//! configuration error never leaves a half-built tank behind.

use std::f32::consts::{PI, TAU};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use tankarena_core::components::*;
use tankarena_core::constants::*;
use tankarena_core::enums::Shape;
use tankarena_core::error::ConfigError;
use tankarena_core::types::{rotate, Vec2};
use tankarena_core::EntityId;

use crate::store::EntityStore;

/// One turret on a tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurretSpec {
    pub joint: TurretJointConfig,
    /// Muzzle position in turret space.
    pub muzzle_offset: Vec2,
    pub shape: Shape,
}

impl TurretSpec {
    pub fn at(mount_point: Vec2) -> Self {
        Self {
            joint: TurretJointConfig {
                mount_point,
                ..Default::default()
            },
            muzzle_offset: Vec2::new(MUZZLE_LENGTH, 0.0),
            shape: Shape::Circle {
                radius: TURRET_RADIUS,
            },
        }
    }
}

/// Hull parameters plus its turrets. Turret `i` gets firing phase `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankSpec {
    pub position: Vec2,
    pub rotation: f32,
    pub mass: f32,
    pub inertia: f32,
    pub max_force: f32,
    pub max_speed: f32,
    pub turn_rate: f32,
    pub reload_time: f32,
    pub shape: Shape,
    pub turrets: Vec<TurretSpec>,
}

impl TankSpec {
    /// Standard tank with a single centred turret.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            mass: TANK_MASS,
            inertia: TANK_INERTIA,
            max_force: TANK_MAX_FORCE,
            max_speed: TANK_MAX_SPEED,
            turn_rate: TANK_TURN_RATE,
            reload_time: RELOAD_TIME,
            shape: Shape::Rectangle {
                width: HULL_LENGTH,
                height: HULL_WIDTH,
            },
            turrets: vec![TurretSpec::at(Vec2::ZERO)],
        }
    }

    /// Parse a spec; omitted fields take the standard tank's values. Only
    /// the hull is checked here, turrets are validated when spawned.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let spec: TankSpec = serde_json::from_str(json)?;
        PhysicsBody::new(spec.mass, spec.inertia)?;
        Thruster::new(spec.max_force, spec.max_speed, spec.turn_rate)?;
        Ok(spec)
    }

    /// Standard tank with two side-by-side turrets firing half a reload apart.
    pub fn twin_turret(position: Vec2) -> Self {
        Self {
            turrets: vec![
                TurretSpec::at(Vec2::new(0.0, TWIN_TURRET_SPACING)),
                TurretSpec::at(Vec2::new(0.0, -TWIN_TURRET_SPACING)),
            ],
            ..Self::new(position)
        }
    }
}

impl Default for TankSpec {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

/// Entities created for one tank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TankIds {
    pub hull: EntityId,
    pub turrets: Vec<EntityId>,
}

struct TurretBundle {
    joint: TurretJoint,
    body: PhysicsBody,
    weapon: Weapon,
    spec: TurretSpec,
}

/// Spawn a hull and its turrets. Weapons arm at `armed_at`, so turret `i`
/// can first fire at `armed_at + i * reload / turret_count`.
pub fn spawn_tank(
    store: &mut EntityStore,
    spec: &TankSpec,
    armed_at: f32,
) -> Result<TankIds, ConfigError> {
    let hull_body = PhysicsBody::new(spec.mass, spec.inertia)?;
    let thruster = Thruster::new(spec.max_force, spec.max_speed, spec.turn_rate)?;

    let mut bundles = Vec::with_capacity(spec.turrets.len());
    if !spec.turrets.is_empty() {
        let phases = PhaseConfig::new(spec.turrets.len() as u32, spec.reload_time)?;
        for (i, turret) in spec.turrets.iter().enumerate() {
            let phase = TurretPhase::new(phases, i as u32 + 1)?;
            bundles.push(TurretBundle {
                joint: TurretJoint::new(turret.joint)?,
                body: PhysicsBody::new(TURRET_MASS, TURRET_INERTIA)?,
                weapon: Weapon::new(phase, armed_at, turret.muzzle_offset),
                spec: turret.clone(),
            });
        }
    }

    let hull = store.create_entity();
    store.insert(hull, Transform::new(spec.position, spec.rotation));
    store.insert(hull, hull_body);
    store.insert(hull, Velocity::default());
    store.insert(hull, thruster);
    store.insert(hull, DriveIntent::default());
    store.insert(
        hull,
        Renderable {
            shape: spec.shape.clone(),
            layer: LAYER_HULL,
        },
    );

    let mut turrets = Vec::with_capacity(bundles.len());
    for bundle in bundles {
        let mount = bundle.spec.joint.mount_point;
        let mount_angle = bundle.spec.joint.mount_angle;
        let turret = store.create_entity();
        store.insert(
            turret,
            Transform::new(
                spec.position + rotate(mount, spec.rotation),
                spec.rotation + mount_angle,
            ),
        );
        store.insert(turret, Parent::new(hull, mount, mount_angle));
        store.insert(turret, bundle.body);
        store.insert(turret, bundle.joint);
        store.insert(turret, bundle.weapon);
        store.insert(
            turret,
            Renderable {
                shape: bundle.spec.shape,
                layer: LAYER_TURRET,
            },
        );
        turrets.push(turret);
    }

    Ok(TankIds { hull, turrets })
}

/// Spawn a tank driven by the host's input.
pub fn spawn_player(
    store: &mut EntityStore,
    spec: &TankSpec,
    armed_at: f32,
) -> Result<TankIds, ConfigError> {
    let ids = spawn_tank(store, spec, armed_at)?;
    store.insert(ids.hull, PlayerControlled);
    Ok(ids)
}

/// Spawn an AI tank circling `target`.
pub fn spawn_drone(
    store: &mut EntityStore,
    spec: &TankSpec,
    target: EntityId,
    orbit_radius: f32,
    orbit_speed: f32,
    armed_at: f32,
) -> Result<TankIds, ConfigError> {
    let orbit = Orbit::new(target, orbit_radius, orbit_speed)?;
    let ids = spawn_tank(store, spec, armed_at)?;
    store.insert(ids.hull, orbit);
    Ok(ids)
}

pub fn spawn_camera(
    store: &mut EntityStore,
    config: CameraConfig,
    position: Vec2,
    target: Option<EntityId>,
) -> Result<EntityId, ConfigError> {
    let mut camera = Camera::new(config, position)?;
    camera.target = target;
    let id = store.create_entity();
    store.insert(id, camera);
    Ok(id)
}

/// Spawn a projectile travelling along `rotation`.
pub fn spawn_projectile(
    store: &mut EntityStore,
    owner: EntityId,
    position: Vec2,
    rotation: f32,
    speed: f32,
    lifetime: f32,
) -> EntityId {
    let id = store.create_entity();
    store.insert(id, Transform::new(position, rotation));
    store.insert(
        id,
        Velocity {
            linear: Vec2::new(rotation.cos(), rotation.sin()) * speed,
            angular: 0.0,
        },
    );
    store.insert(id, Projectile { owner });
    store.insert(id, Lifetime { remaining: lifetime });
    store.insert(
        id,
        Renderable {
            shape: Shape::Circle {
                radius: PROJECTILE_RADIUS,
            },
            layer: LAYER_PROJECTILE,
        },
    );
    id
}

/// Ring `count` drones around `player` at seeded bearings and distances.
/// Same RNG state, same layout.
pub fn spawn_arena(
    store: &mut EntityStore,
    rng: &mut ChaCha8Rng,
    player: EntityId,
    count: usize,
    armed_at: f32,
) -> Result<Vec<TankIds>, ConfigError> {
    let centre = store
        .get::<Transform>(player)
        .map(|t| t.position)
        .unwrap_or(Vec2::ZERO);

    let mut drones = Vec::with_capacity(count);
    for _ in 0..count {
        let bearing = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(ARENA_SPAWN_MIN_DISTANCE..ARENA_SPAWN_MAX_DISTANCE);
        let radius = rng.gen_range(DRONE_ORBIT_MIN_RADIUS..DRONE_ORBIT_MAX_RADIUS);
        let mut speed = rng.gen_range(DRONE_ORBIT_MIN_SPEED..DRONE_ORBIT_MAX_SPEED);
        if rng.gen_bool(0.5) {
            speed = -speed;
        }

        let position = centre + Vec2::new(bearing.cos(), bearing.sin()) * distance;
        let mut spec = TankSpec::new(position);
        // Face the player.
        spec.rotation = bearing + PI;
        let ids = spawn_drone(store, &spec, player, radius, speed, armed_at)?;
        if let Some(orbit) = store.get_mut::<Orbit>(ids.hull) {
            orbit.angle = bearing;
        }
        drones.push(ids);
    }
    Ok(drones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tankarena_core::enums::ComponentKind;

    #[test]
    fn twin_tank_turrets_are_phased() {
        let mut store = EntityStore::new();
        let ids = spawn_tank(&mut store, &TankSpec::twin_turret(Vec2::ZERO), 0.0).unwrap();
        assert_eq!(ids.turrets.len(), 2);
        let phases: Vec<u32> = ids
            .turrets
            .iter()
            .map(|&t| store.get::<Weapon>(t).unwrap().phase.phase())
            .collect();
        assert_eq!(phases, vec![1, 2]);
        for &turret in &ids.turrets {
            assert_eq!(store.get::<Parent>(turret).unwrap().parent, Some(ids.hull));
        }
    }

    #[test]
    fn turret_starts_at_its_mount() {
        let mut store = EntityStore::new();
        let mut spec = TankSpec::twin_turret(Vec2::new(100.0, 0.0));
        spec.rotation = std::f32::consts::FRAC_PI_2;
        let ids = spawn_tank(&mut store, &spec, 0.0).unwrap();
        let first = store.get::<Transform>(ids.turrets[0]).unwrap();
        assert!((first.position - Vec2::new(100.0 - TWIN_TURRET_SPACING, 0.0)).length() < 1e-4);
    }

    #[test]
    fn bad_turret_leaves_store_untouched() {
        let mut store = EntityStore::new();
        let mut spec = TankSpec::twin_turret(Vec2::ZERO);
        spec.turrets[1].joint.limits = Some(AngleLimits {
            lower: 1.0,
            upper: 0.0,
        });
        assert!(matches!(
            spawn_tank(&mut store, &spec, 0.0),
            Err(ConfigError::InvalidAngleLimits { .. })
        ));
        assert!(store.is_empty());

        spec = TankSpec::new(Vec2::ZERO);
        spec.reload_time = 0.0;
        assert!(spawn_tank(&mut store, &spec, 0.0).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn tank_spec_from_partial_json() {
        let spec = TankSpec::from_json(
            r#"{ "position": [5.0, 6.0], "reload_time": 0.8,
                 "turrets": [
                   { "joint": { "mount_point": [0.0, 10.0], "mount_angle": 0.0,
                                "motor_speed": 2.0, "max_motor_torque": 100.0,
                                "limits": { "lower": -1.0, "upper": 1.0 },
                                "motor_enabled": true },
                     "muzzle_offset": [20.0, 0.0],
                     "shape": { "type": "Circle", "radius": 6.0 } }
                 ] }"#,
        )
        .unwrap();
        assert_eq!(spec.position, Vec2::new(5.0, 6.0));
        assert_eq!(spec.mass, TANK_MASS);
        assert_eq!(spec.turrets.len(), 1);
        assert_eq!(spec.turrets[0].joint.limits.map(|l| l.upper), Some(1.0));

        assert!(matches!(
            TankSpec::from_json(r#"{ "mass": -1.0 }"#),
            Err(ConfigError::NegativeMass(_))
        ));
        assert!(matches!(
            TankSpec::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn arena_layout_is_seeded() {
        let layout = |seed: u64| {
            let mut store = EntityStore::new();
            let player = spawn_player(&mut store, &TankSpec::new(Vec2::ZERO), 0.0).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let drones = spawn_arena(&mut store, &mut rng, player.hull, 3, 0.0).unwrap();
            drones
                .iter()
                .map(|d| store.get::<Transform>(d.hull).unwrap().position)
                .collect::<Vec<_>>()
        };
        assert_eq!(layout(9), layout(9));
        assert_ne!(layout(9), layout(10));
        for position in layout(9) {
            let d = position.length();
            assert!(d > ARENA_SPAWN_MIN_DISTANCE - 0.01 && d < ARENA_SPAWN_MAX_DISTANCE + 0.01);
        }
    }

    #[test]
    fn drones_orbit_the_player() {
        let mut store = EntityStore::new();
        let player = spawn_player(&mut store, &TankSpec::new(Vec2::ZERO), 0.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        spawn_arena(&mut store, &mut rng, player.hull, 2, 0.0).unwrap();
        let drones = store.query(&[ComponentKind::Orbit]);
        assert_eq!(drones.len(), 2);
        for drone in drones {
            assert_eq!(store.get::<Orbit>(drone).unwrap().target, Some(player.hull));
        }
        assert_eq!(store.query(&[ComponentKind::PlayerControlled]), vec![player.hull]);
    }
}
