//! Snapshot system: reads the store and builds the `RenderSnapshot`.
//!
//! Read-only; never modifies the store.

use tankarena_core::components::{Camera, Renderable, Transform};
use tankarena_core::enums::ComponentKind;
use tankarena_core::state::{CameraView, RenderItem, RenderSnapshot};
use tankarena_core::types::SimTime;

use crate::store::EntityStore;

pub fn build_snapshot(store: &EntityStore, time: &SimTime) -> RenderSnapshot {
    RenderSnapshot {
        time: *time,
        items: build_items(store),
        camera: build_camera(store),
    }
}

/// Every drawable entity, lowest layer first, ties by entity index.
fn build_items(store: &EntityStore) -> Vec<RenderItem> {
    let mut items: Vec<RenderItem> = store
        .query(&[ComponentKind::Renderable, ComponentKind::Transform])
        .into_iter()
        .filter_map(|id| {
            let transform = store.get::<Transform>(id)?;
            let renderable = store.get::<Renderable>(id)?;
            Some(RenderItem {
                entity: id,
                position: transform.position,
                rotation: transform.rotation(),
                scale: transform.scale,
                layer: renderable.layer,
                shape: renderable.shape.clone(),
            })
        })
        .collect();
    items.sort_by_key(|item| (item.layer, item.entity.index));
    items
}

/// The first camera in the store, if any.
fn build_camera(store: &EntityStore) -> Option<CameraView> {
    store
        .query(&[ComponentKind::Camera])
        .into_iter()
        .find_map(|id| {
            store.get::<Camera>(id).map(|camera| CameraView {
                entity: id,
                position: camera.position,
                zoom: camera.zoom(),
                mode: camera.mode,
            })
        })
}
