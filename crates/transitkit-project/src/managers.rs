//! CRUD managers with memento support.
//!
//! Every entity kind is kept in an [`EntityManager`]. Managers enforce
//! invariants local to their own collection (id assignment, unique names);
//! references between managers are checked by [`crate::Project`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use transitkit_core::ValidationError;

use crate::entities::{
    Entity, EntityId, Line, MeanOfTransport, Route, Stop, Vehicle, VehicleType,
};

/// Create, read, update and delete for one entity kind.
pub trait CrudManager {
    type Item: Entity;

    /// Inserts `item` under a newly assigned id and returns it.
    fn add_item(&mut self, item: Self::Item) -> Result<EntityId, ValidationError>;

    /// Replaces the stored entity with the same id.
    fn update_item(&mut self, item: Self::Item) -> Result<(), ValidationError>;

    fn remove_item(&mut self, id: EntityId) -> Result<Self::Item, ValidationError>;

    fn find_by_id(&self, id: EntityId) -> Option<&Self::Item>;

    /// All entities in id order.
    fn items(&self) -> Vec<&Self::Item>;
}

/// Value snapshot of one entity, restorable under its original id.
#[derive(Debug, Clone, PartialEq)]
pub struct Memento<T>(T);

impl<T: Entity> Memento<T> {
    pub fn id(&self) -> EntityId {
        self.0.id()
    }
}

/// Snapshot and restore of single entities.
pub trait ManagerMemento: CrudManager {
    fn memento(&self, id: EntityId) -> Option<Memento<Self::Item>>;

    /// Re-inserts or overwrites the entity captured in `memento`.
    fn restore_memento(&mut self, memento: Memento<Self::Item>);
}

/// Generic manager for an entity kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityManager<T> {
    items: BTreeMap<EntityId, T>,
    next_id: EntityId,
}

// Ids handed out are never reused, so the counter is left out of equality.
impl<T: PartialEq> PartialEq for EntityManager<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T> Default for EntityManager<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Entity> EntityManager<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&T> {
        self.items.values().find(|item| item.name() == name)
    }

    fn check_name(&self, item: &T) -> Result<(), ValidationError> {
        if item.name().trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if T::UNIQUE_NAME
            && self
                .items
                .values()
                .any(|other| other.id() != item.id() && other.name() == item.name())
        {
            return Err(ValidationError::DuplicateName {
                entity: T::KIND.as_str(),
                name: item.name().to_string(),
            });
        }
        Ok(())
    }
}

impl<T: Entity> CrudManager for EntityManager<T> {
    type Item = T;

    fn add_item(&mut self, mut item: T) -> Result<EntityId, ValidationError> {
        item.set_id(0);
        self.check_name(&item)?;
        let id = self.next_id;
        self.next_id += 1;
        item.set_id(id);
        self.items.insert(id, item);
        tracing::debug!(entity = %T::KIND, id, "Entity added");
        Ok(id)
    }

    fn update_item(&mut self, item: T) -> Result<(), ValidationError> {
        if !self.items.contains_key(&item.id()) {
            return Err(ValidationError::NotFound {
                entity: T::KIND.as_str(),
                id: item.id(),
            });
        }
        self.check_name(&item)?;
        tracing::debug!(entity = %T::KIND, id = item.id(), "Entity updated");
        self.items.insert(item.id(), item);
        Ok(())
    }

    fn remove_item(&mut self, id: EntityId) -> Result<T, ValidationError> {
        let item = self.items.remove(&id).ok_or(ValidationError::NotFound {
            entity: T::KIND.as_str(),
            id,
        })?;
        tracing::debug!(entity = %T::KIND, id, "Entity removed");
        Ok(item)
    }

    fn find_by_id(&self, id: EntityId) -> Option<&T> {
        self.items.get(&id)
    }

    fn items(&self) -> Vec<&T> {
        self.items.values().collect()
    }
}

impl<T: Entity> ManagerMemento for EntityManager<T> {
    fn memento(&self, id: EntityId) -> Option<Memento<T>> {
        self.items.get(&id).cloned().map(Memento)
    }

    fn restore_memento(&mut self, memento: Memento<T>) {
        let item = memento.0;
        let id = item.id();
        self.next_id = self.next_id.max(id + 1);
        self.items.insert(id, item);
        tracing::debug!(entity = %T::KIND, id, "Entity restored from memento");
    }
}

pub type StopManager = EntityManager<Stop>;
pub type MeanOfTransportManager = EntityManager<MeanOfTransport>;
pub type VehicleTypeManager = EntityManager<VehicleType>;
pub type VehicleManager = EntityManager<Vehicle>;
pub type LineManager = EntityManager<Line>;
pub type RouteManager = EntityManager<Route>;

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(name: &str) -> Stop {
        Stop {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_assigns_ids() {
        let mut manager = StopManager::new();
        assert_eq!(manager.add_item(stop("Central")).unwrap(), 1);
        assert_eq!(manager.add_item(stop("Harbour")).unwrap(), 2);
        assert_eq!(manager.find_by_id(2).unwrap().name, "Harbour");
        assert_eq!(manager.find_by_name("Central").unwrap().id, 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut manager = StopManager::new();
        manager.add_item(stop("Central")).unwrap();
        assert_eq!(
            manager.add_item(stop("Central")),
            Err(ValidationError::DuplicateName {
                entity: "stop",
                name: "Central".to_string()
            })
        );
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_update_keeps_own_name() {
        let mut manager = StopManager::new();
        let id = manager.add_item(stop("Central")).unwrap();
        let mut item = manager.find_by_id(id).unwrap().clone();
        item.abbreviation = Some("CEN".into());
        manager.update_item(item).unwrap();
        assert_eq!(
            manager.find_by_id(id).unwrap().abbreviation.as_deref(),
            Some("CEN")
        );
    }

    #[test]
    fn test_memento_restores_original_id() {
        let mut manager = StopManager::new();
        let id = manager.add_item(stop("Central")).unwrap();
        let memento = manager.memento(id).unwrap();
        manager.remove_item(id).unwrap();
        assert!(manager.find_by_id(id).is_none());
        manager.restore_memento(memento);
        assert_eq!(manager.find_by_id(id).unwrap().name, "Central");
        assert_eq!(manager.add_item(stop("Harbour")).unwrap(), id + 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut manager = StopManager::new();
        assert!(matches!(
            manager.add_item(stop("  ")),
            Err(ValidationError::InvalidField { field: "name", .. })
        ));
    }
}
