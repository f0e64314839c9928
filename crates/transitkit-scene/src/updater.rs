//! Model-side helper that rebuilds snapshots and swaps them into the scene.

use std::sync::Arc;

use transitkit_core::NetworkError;
use transitkit_network::{NetworkUnitOfWork, World};

use crate::camera::CameraModelSnapshot;
use crate::scene::{ResourceKey, SceneManager, SceneResource};
use crate::snapshot::{
    NetworkSnapshot, SegmentsSnapshot, SelectionSnapshot, DEFAULT_FLATTEN_TOLERANCE,
};

/// Rebuilds scene resources on the model thread.
#[derive(Debug)]
pub struct SceneUpdater {
    scene: Arc<SceneManager>,
    camera: Option<CameraModelSnapshot>,
    tolerance: f64,
}

impl SceneUpdater {
    pub fn new(scene: Arc<SceneManager>) -> Self {
        Self {
            scene,
            camera: None,
            tolerance: DEFAULT_FLATTEN_TOLERANCE,
        }
    }

    /// Flattening tolerance for curved tracks, in metres.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn scene(&self) -> &Arc<SceneManager> {
        &self.scene
    }

    pub fn camera(&self) -> Option<&CameraModelSnapshot> {
        self.camera.as_ref()
    }

    /// Adopts a camera snapshot unless a newer one is already known.
    pub fn set_camera(&mut self, camera: CameraModelSnapshot) {
        if self
            .camera
            .is_some_and(|current| current.revision() > camera.revision())
        {
            return;
        }
        self.camera = Some(camera);
        self.scene
            .batch_update_resource(ResourceKey::Camera, SceneResource::Camera(camera));
    }

    /// Swaps the segment grid and network snapshots of `world`, together
    /// with the latest camera, in one batch.
    pub fn update_world(&self, world: &World) {
        let segments = Arc::new(SegmentsSnapshot::from_world(world));
        let network = Arc::new(NetworkSnapshot::from_world(world, self.tolerance));
        tracing::debug!(
            tracks = network.tracks.len(),
            vertices = network.vertices.len(),
            "Scene network rebuilt"
        );
        self.scene.batch(|scene| {
            scene.batch_update_resource(ResourceKey::Segments, SceneResource::Segments(segments));
            scene.batch_update_resource(ResourceKey::Network, SceneResource::Network(network));
            if let Some(camera) = self.camera {
                scene.batch_update_resource(ResourceKey::Camera, SceneResource::Camera(camera));
            }
        });
    }

    /// Shows what `uow` would add or change.
    pub fn set_editable(&self, world: &World, uow: &NetworkUnitOfWork) -> Result<(), NetworkError> {
        let preview = NetworkSnapshot::preview(world, uow, self.tolerance)?;
        self.scene.batch_update_resource(
            ResourceKey::EditableNetwork,
            SceneResource::Network(Arc::new(preview)),
        );
        Ok(())
    }

    pub fn clear_editable(&self) {
        self.scene.batch_remove_resource(ResourceKey::EditableNetwork);
    }

    pub fn set_selection(&self, selection: SelectionSnapshot) {
        if selection.is_empty() {
            self.scene.batch_remove_resource(ResourceKey::Selection);
        } else {
            self.scene.batch_update_resource(
                ResourceKey::Selection,
                SceneResource::Selection(Arc::new(selection)),
            );
        }
    }
}
