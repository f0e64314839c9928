//! The scene manager: a guarded, double-buffered table of render resources.
//!
//! The model thread stages resources between [`SceneManager::guard`] and
//! [`SceneManager::unguard`]; the render thread only ever sees complete
//! committed tables through [`SceneManager::snapshot`].

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::camera::CameraModelSnapshot;
use crate::error::{SceneError, SceneResult};
use crate::snapshot::{NetworkSnapshot, SegmentsSnapshot, SelectionSnapshot};

/// Keys of the resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKey {
    Camera,
    Segments,
    Network,
    EditableNetwork,
    Selection,
}

/// A value stored in the resource table.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneResource {
    Camera(CameraModelSnapshot),
    Segments(Arc<SegmentsSnapshot>),
    Network(Arc<NetworkSnapshot>),
    Selection(Arc<SelectionSnapshot>),
}

/// A committed resource table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneResources {
    revision: u64,
    resources: BTreeMap<ResourceKey, SceneResource>,
}

impl SceneResources {
    /// Number of batches committed before this table.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, key: ResourceKey) -> Option<&SceneResource> {
        self.resources.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.resources.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn camera(&self) -> Option<&CameraModelSnapshot> {
        match self.get(ResourceKey::Camera) {
            Some(SceneResource::Camera(camera)) => Some(camera),
            _ => None,
        }
    }

    pub fn segments(&self) -> Option<&SegmentsSnapshot> {
        match self.get(ResourceKey::Segments) {
            Some(SceneResource::Segments(segments)) => Some(segments),
            _ => None,
        }
    }

    pub fn network(&self) -> Option<&NetworkSnapshot> {
        self.network_at(ResourceKey::Network)
    }

    pub fn editable_network(&self) -> Option<&NetworkSnapshot> {
        self.network_at(ResourceKey::EditableNetwork)
    }

    fn network_at(&self, key: ResourceKey) -> Option<&NetworkSnapshot> {
        match self.get(key) {
            Some(SceneResource::Network(network)) => Some(network),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<&SelectionSnapshot> {
        match self.get(ResourceKey::Selection) {
            Some(SceneResource::Selection(selection)) => Some(selection),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Pending {
    depth: usize,
    // `None` removes the key on commit.
    staged: BTreeMap<ResourceKey, Option<SceneResource>>,
}

/// Guarded resource table shared between the model and render threads.
///
/// Nested guards commit at the outermost `unguard`. Updates made while no
/// guard is held are committed immediately as single-key batches. Batches
/// are staged by a single writer, the model thread; any number of readers
/// may take snapshots concurrently.
#[derive(Debug, Default)]
pub struct SceneManager {
    committed: RwLock<Arc<SceneResources>>,
    pending: Mutex<Pending>,
}

impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or nests) a batch.
    pub fn guard(&self) {
        let mut pending = self.pending.lock();
        pending.depth += 1;
        tracing::trace!(depth = pending.depth, "Scene guarded");
    }

    /// Closes a batch; the outermost call commits every staged resource at
    /// once.
    pub fn unguard(&self) -> SceneResult<()> {
        let mut pending = self.pending.lock();
        if pending.depth == 0 {
            return Err(SceneError::NotGuarded);
        }
        pending.depth -= 1;
        if pending.depth == 0 && !pending.staged.is_empty() {
            let staged = std::mem::take(&mut pending.staged);
            self.commit(staged);
        }
        Ok(())
    }

    pub fn is_guarded(&self) -> bool {
        self.pending.lock().depth > 0
    }

    pub fn batch_update_resource(&self, key: ResourceKey, resource: SceneResource) {
        self.stage(key, Some(resource));
    }

    pub fn batch_remove_resource(&self, key: ResourceKey) {
        self.stage(key, None);
    }

    /// Runs `f` inside a guard.
    pub fn batch<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        self.guard();
        let result = f(self);
        let closed = self.unguard();
        debug_assert!(closed.is_ok(), "batch guard already closed");
        result
    }

    /// The latest committed table.
    pub fn snapshot(&self) -> Arc<SceneResources> {
        Arc::clone(&*self.committed.read())
    }

    fn stage(&self, key: ResourceKey, resource: Option<SceneResource>) {
        let mut pending = self.pending.lock();
        if pending.depth > 0 {
            pending.staged.insert(key, resource);
        } else {
            self.commit(BTreeMap::from([(key, resource)]));
        }
    }

    // Callers hold the pending lock, which serialises commits.
    fn commit(&self, staged: BTreeMap<ResourceKey, Option<SceneResource>>) {
        let current = self.snapshot();
        let mut resources = current.resources.clone();
        for (key, resource) in staged {
            match resource {
                Some(resource) => {
                    resources.insert(key, resource);
                }
                None => {
                    resources.remove(&key);
                }
            }
        }
        let next = Arc::new(SceneResources {
            revision: current.revision + 1,
            resources,
        });
        tracing::trace!(revision = next.revision, keys = next.len(), "Scene committed");
        *self.committed.write() = next;
    }
}
