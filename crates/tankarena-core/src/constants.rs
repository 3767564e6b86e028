//! Simulation constants and tuning defaults.

// --- Physics ---

/// Fixed physics sub-step (seconds).
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// Velocity solver iterations per sub-step.
pub const VELOCITY_ITERATIONS: u32 = 8;

/// Position solver iterations per sub-step.
pub const POSITION_ITERATIONS: u32 = 3;

/// Upper bound on sub-steps per frame. Excess accumulated time is dropped.
pub const MAX_SUBSTEPS: u32 = 8;

// --- Turret actuation ---

/// Angular error below which the turret motor stops (radians).
pub const TURRET_ANGLE_TOLERANCE: f32 = 0.01;

/// Smallest non-zero motor speed, keeps the motor from stalling near target (rad/s).
pub const TURRET_MIN_MOTOR_SPEED: f32 = 0.05;

/// Default turret motor speed magnitude (rad/s).
pub const TURRET_MOTOR_SPEED: f32 = 3.0;

/// Default turret motor torque limit.
pub const TURRET_MAX_TORQUE: f32 = 400.0;

// --- Weapons ---

/// Default reload time per turret (seconds).
pub const RELOAD_TIME: f32 = 1.2;

/// Default projectile muzzle speed (units/s).
pub const PROJECTILE_SPEED: f32 = 600.0;

/// Default projectile lifetime (seconds).
pub const PROJECTILE_LIFETIME: f32 = 2.0;

/// Projectile render radius.
pub const PROJECTILE_RADIUS: f32 = 3.0;

// --- Camera ---

/// Default spring stiffness. With the default damping this is underdamped
/// (c^2 = 64 < 4k = 80), so follow mode overshoots slightly.
pub const CAMERA_STIFFNESS: f32 = 20.0;

/// Default spring damping.
pub const CAMERA_DAMPING: f32 = 8.0;

/// Camera speed below which velocity snaps to zero.
pub const CAMERA_VELOCITY_EPSILON: f32 = 1e-3;

pub const CAMERA_MIN_ZOOM: f32 = 0.25;
pub const CAMERA_MAX_ZOOM: f32 = 4.0;
pub const CAMERA_ZOOM_SPEED: f32 = 0.1;

/// Free-roam translation speed (units/s).
pub const CAMERA_FREE_ROAM_SPEED: f32 = 400.0;

// --- Tanks ---

pub const TANK_MASS: f32 = 50.0;
pub const TANK_INERTIA: f32 = 200.0;
pub const TANK_MAX_FORCE: f32 = 12_000.0;
pub const TANK_MAX_SPEED: f32 = 180.0;

/// Hull turn rate toward the drive direction (rad/s).
pub const TANK_TURN_RATE: f32 = 2.5;

/// Fraction of speed retained per second with no drive input.
pub const TANK_BRAKE: f32 = 0.05;

pub const TURRET_MASS: f32 = 5.0;
pub const TURRET_INERTIA: f32 = 4.0;

/// Lateral distance of each twin turret mount from the hull centreline.
pub const TWIN_TURRET_SPACING: f32 = 12.0;

/// Muzzle distance ahead of the turret pivot.
pub const MUZZLE_LENGTH: f32 = 24.0;

pub const HULL_LENGTH: f32 = 48.0;
pub const HULL_WIDTH: f32 = 32.0;
pub const TURRET_RADIUS: f32 = 9.0;

// --- Arena ---

/// Drones spawn in a ring around the player between these distances.
pub const ARENA_SPAWN_MIN_DISTANCE: f32 = 400.0;
pub const ARENA_SPAWN_MAX_DISTANCE: f32 = 900.0;

pub const DRONE_ORBIT_MIN_RADIUS: f32 = 150.0;
pub const DRONE_ORBIT_MAX_RADIUS: f32 = 320.0;

/// Orbit angular speed range (rad/s); direction is picked at random.
pub const DRONE_ORBIT_MIN_SPEED: f32 = 0.2;
pub const DRONE_ORBIT_MAX_SPEED: f32 = 0.6;

// --- Render layers ---

pub const LAYER_HULL: i32 = 10;
pub const LAYER_TURRET: i32 = 20;
pub const LAYER_PROJECTILE: i32 = 30;

// --- Telemetry ---

/// Samples kept per telemetry series.
pub const TELEMETRY_SAMPLES: usize = 120;

/// Half-width of the band substituted for a degenerate (min == max) range.
pub const RANGE_EPSILON: f32 = 1e-3;
