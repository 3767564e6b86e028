//! Render snapshot: the resolved visible state handed to the renderer each tick.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::enums::{CameraMode, Shape};
use crate::types::{SimTime, Vec2};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub time: SimTime,
    /// Sorted by layer, then entity index.
    pub items: Vec<RenderItem>,
    pub camera: Option<CameraView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    pub entity: EntityId,
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
    pub layer: i32,
    pub shape: Shape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub entity: EntityId,
    pub position: Vec2,
    pub zoom: f32,
    pub mode: CameraMode,
}
