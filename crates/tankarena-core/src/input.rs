//! Per-frame input record supplied by the host. The core does no device polling.

use serde::{Deserialize, Serialize};

use crate::types::Vec2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputState {
    /// Movement direction; need not be normalized.
    pub move_direction: Vec2,
    /// Mouse/aim position in world space.
    pub aim_world: Vec2,
    pub fire: bool,
    /// Scroll wheel delta for zoom, positive zooms in.
    pub scroll_delta: f32,
}

impl InputState {
    /// Normalized movement direction, or zero when there is none.
    pub fn direction(&self) -> Vec2 {
        self.move_direction.normalize_or_zero()
    }
}
