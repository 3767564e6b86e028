//! Fundamental geometric and simulation types.

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Wrap an angle into `[0, 2π)`.
pub fn normalize_angle(radians: f32) -> f32 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Signed shortest rotation taking `from` onto `to`, in `(-π, π]`.
pub fn shortest_angle_diff(from: f32, to: f32) -> f32 {
    let diff = (to - from).rem_euclid(TAU);
    if diff > PI {
        diff - TAU
    } else {
        diff
    }
}

/// Rotate a vector counter-clockwise by `radians`.
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Heading of a vector in radians, or `None` for the zero vector.
pub fn heading_of(v: Vec2) -> Option<f32> {
    if v.length_squared() <= f32::EPSILON {
        None
    } else {
        Some(v.y.atan2(v.x))
    }
}

/// Opaque handle to a body owned by the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// Opaque handle to a joint owned by the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JointHandle(pub u64);

/// Simulation time tracking. Ticks run at the variable frame rate; physics
/// sub-steps separately at a fixed rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Frames processed so far.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f32,
    /// Length of the current frame in seconds.
    pub dt: f32,
}

impl SimTime {
    /// Close the current frame. Systems observe start-of-frame time, so this
    /// runs after they have seen `dt`.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt;
    }
}
