//! The project: entity managers plus the track network world.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use transitkit_core::{AppEvent, EventBus, ValidationError, WorldEvent};
use transitkit_network::World;

use crate::entities::{Entity, EntityId, EntityKind, Reference};
use crate::managers::{
    CrudManager, LineManager, ManagerMemento, MeanOfTransportManager, RouteManager, StopManager,
    VehicleManager, VehicleTypeManager,
};

/// Selects one manager inside a [`Project`].
pub trait ProjectManager: ManagerMemento + Clone + Send + 'static {
    fn select(project: &Project) -> &Self;

    fn select_mut(project: &mut Project) -> &mut Self;
}

macro_rules! project_manager {
    ($manager:ty, $field:ident) => {
        impl ProjectManager for $manager {
            fn select(project: &Project) -> &Self {
                &project.$field
            }

            fn select_mut(project: &mut Project) -> &mut Self {
                &mut project.$field
            }
        }
    };
}

project_manager!(StopManager, stops);
project_manager!(MeanOfTransportManager, means_of_transport);
project_manager!(VehicleTypeManager, vehicle_types);
project_manager!(VehicleManager, vehicles);
project_manager!(LineManager, lines);
project_manager!(RouteManager, routes);

/// A transport network project.
///
/// Only the model thread mutates a project. Cross-manager references are
/// validated here; each manager validates its own collection.
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    path: Option<PathBuf>,
    stops: StopManager,
    means_of_transport: MeanOfTransportManager,
    vehicle_types: VehicleTypeManager,
    vehicles: VehicleManager,
    lines: LineManager,
    routes: RouteManager,
    world: World,
    event_bus: Option<Arc<EventBus>>,
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.path == other.path
            && self.stops == other.stops
            && self.means_of_transport == other.means_of_transport
            && self.vehicle_types == other.vehicle_types
            && self.vehicles == other.vehicles
            && self.lines == other.lines
            && self.routes == other.routes
            && self.world == other.world
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Project {
    /// Creates an empty project with a 1 x 1 world.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_world(name, World::default())
    }

    pub fn with_world(name: impl Into<String>, world: World) -> Self {
        Self {
            name: name.into(),
            path: None,
            stops: StopManager::new(),
            means_of_transport: MeanOfTransportManager::new(),
            vehicle_types: VehicleTypeManager::new(),
            vehicles: VehicleManager::new(),
            lines: LineManager::new(),
            routes: RouteManager::new(),
            world,
            event_bus: None,
        }
    }

    /// Publishes world events on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn stops(&self) -> &StopManager {
        &self.stops
    }

    pub fn means_of_transport(&self) -> &MeanOfTransportManager {
        &self.means_of_transport
    }

    pub fn vehicle_types(&self) -> &VehicleTypeManager {
        &self.vehicle_types
    }

    pub fn vehicles(&self) -> &VehicleManager {
        &self.vehicles
    }

    pub fn lines(&self) -> &LineManager {
        &self.lines
    }

    pub fn routes(&self) -> &RouteManager {
        &self.routes
    }

    pub fn manager<M: ProjectManager>(&self) -> &M {
        M::select(self)
    }

    pub fn manager_mut<M: ProjectManager>(&mut self) -> &mut M {
        M::select_mut(self)
    }

    pub fn find<M: ProjectManager>(&self, id: EntityId) -> Option<&M::Item> {
        M::select(self).find_by_id(id)
    }

    /// Whether an entity of `kind` with `id` exists.
    pub fn exists(&self, kind: EntityKind, id: EntityId) -> bool {
        match kind {
            EntityKind::Stop => self.stops.find_by_id(id).is_some(),
            EntityKind::MeanOfTransport => self.means_of_transport.find_by_id(id).is_some(),
            EntityKind::VehicleType => self.vehicle_types.find_by_id(id).is_some(),
            EntityKind::Vehicle => self.vehicles.find_by_id(id).is_some(),
            EntityKind::Line => self.lines.find_by_id(id).is_some(),
            EntityKind::Route => self.routes.find_by_id(id).is_some(),
            EntityKind::Platform => self
                .world
                .tracks()
                .any(|t| t.platforms().iter().any(|p| p.id as u64 == id)),
        }
    }

    /// Fails when `item` refers to an entity that does not exist.
    pub fn check_references<T: Entity>(&self, item: &T) -> Result<(), ValidationError> {
        match item
            .references()
            .into_iter()
            .find(|r| !self.exists(r.kind, r.id))
        {
            Some(missing) => Err(ValidationError::MissingReference {
                entity: T::KIND.as_str(),
                target: missing.kind.as_str(),
                id: missing.id,
            }),
            None => Ok(()),
        }
    }

    /// First entity referring to `kind`/`id`.
    pub fn find_referrer(&self, kind: EntityKind, id: EntityId) -> Option<(EntityKind, EntityId)> {
        let target = Reference::new(kind, id);
        fn scan<M: CrudManager>(manager: &M, target: Reference) -> Option<(EntityKind, EntityId)> {
            manager
                .items()
                .into_iter()
                .find(|item| item.references().contains(&target))
                .map(|item| (<M::Item as Entity>::KIND, item.id()))
        }
        scan(&self.means_of_transport, target)
            .or_else(|| scan(&self.vehicle_types, target))
            .or_else(|| scan(&self.vehicles, target))
            .or_else(|| scan(&self.lines, target))
            .or_else(|| scan(&self.routes, target))
            .or_else(|| scan(&self.stops, target))
            .or_else(|| {
                (kind == EntityKind::Stop)
                    .then(|| {
                        self.world.tracks().find_map(|t| {
                            t.platforms()
                                .iter()
                                .find(|p| p.payload.stop == Some(id))
                                .map(|p| (EntityKind::Platform, p.id as u64))
                        })
                    })
                    .flatten()
            })
    }

    /// Adds an entity after checking its references.
    pub fn add<M: ProjectManager>(&mut self, item: M::Item) -> Result<EntityId, ValidationError> {
        self.check_references(&item)?;
        M::select_mut(self).add_item(item)
    }

    /// Updates an entity after checking its references.
    pub fn update<M: ProjectManager>(&mut self, item: M::Item) -> Result<(), ValidationError> {
        self.check_references(&item)?;
        M::select_mut(self).update_item(item)
    }

    /// Removes an entity nothing refers to.
    pub fn remove<M: ProjectManager>(&mut self, id: EntityId) -> Result<M::Item, ValidationError> {
        let kind = <M::Item as Entity>::KIND;
        if let Some((referrer, referrer_id)) = self.find_referrer(kind, id) {
            return Err(ValidationError::StillReferenced {
                entity: kind.as_str(),
                id,
                referrer: referrer.as_str(),
                referrer_id,
            });
        }
        M::select_mut(self).remove_item(id)
    }

    /// Publishes an event if the project has an event bus.
    pub fn publish(&self, event: AppEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    /// Announces the current segment usage of the world.
    pub fn notify_world_changed(&self) {
        self.publish(AppEvent::World(WorldEvent::SegmentUsageChanged {
            columns: self.world.columns(),
            rows: self.world.rows(),
            in_use: self.world.segment_usage(),
        }));
    }
}
