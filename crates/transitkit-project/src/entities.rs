//! Managed entities of a project.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a managed entity. Zero means "not yet assigned".
pub type EntityId = u64;

/// The kinds of managed entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Stop,
    MeanOfTransport,
    VehicleType,
    Vehicle,
    Line,
    Route,
    Platform,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Stop => "stop",
            EntityKind::MeanOfTransport => "mean of transport",
            EntityKind::VehicleType => "vehicle type",
            EntityKind::Vehicle => "vehicle",
            EntityKind::Line => "line",
            EntityKind::Route => "route",
            EntityKind::Platform => "platform",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference from one entity to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl Reference {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

/// Common behaviour of managed entities.
pub trait Entity: Clone + PartialEq + fmt::Debug + Send + 'static {
    const KIND: EntityKind;

    /// Whether two entities of this kind may share a name.
    const UNIQUE_NAME: bool = true;

    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);

    fn name(&self) -> &str;

    /// Entities this one refers to.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

macro_rules! entity_basics {
    () => {
        fn id(&self) -> EntityId {
            self.id
        }

        fn set_id(&mut self, id: EntityId) {
            self.id = id;
        }

        fn name(&self) -> &str {
            &self.name
        }
    };
}

/// A named stop served by lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stop {
    pub id: EntityId,
    pub name: String,
    pub abbreviation: Option<String>,
}

impl Entity for Stop {
    const KIND: EntityKind = EntityKind::Stop;
    entity_basics!();
}

/// A transport mode such as tram or bus.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeanOfTransport {
    pub id: EntityId,
    pub name: String,
    /// Maximum speed in metres per second.
    pub max_speed: f64,
}

impl Entity for MeanOfTransport {
    const KIND: EntityKind = EntityKind::MeanOfTransport;
    entity_basics!();
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleType {
    pub id: EntityId,
    pub name: String,
    pub mean_of_transport: EntityId,
    pub capacity: u32,
    /// Length in metres.
    pub length: f64,
}

impl Entity for VehicleType {
    const KIND: EntityKind = EntityKind::VehicleType;
    entity_basics!();

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(EntityKind::MeanOfTransport, self.mean_of_transport)]
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: EntityId,
    pub name: String,
    pub vehicle_type: EntityId,
}

impl Entity for Vehicle {
    const KIND: EntityKind = EntityKind::Vehicle;
    entity_basics!();

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(EntityKind::VehicleType, self.vehicle_type)]
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    pub id: EntityId,
    pub name: String,
    pub mean_of_transport: EntityId,
    /// Display colour as `#rrggbb`.
    pub color: String,
}

impl Entity for Line {
    const KIND: EntityKind = EntityKind::Line;
    entity_basics!();

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(EntityKind::MeanOfTransport, self.mean_of_transport)]
    }
}

/// An ordered list of stops served by a line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    pub id: EntityId,
    pub name: String,
    pub line: EntityId,
    pub stops: Vec<EntityId>,
}

impl Entity for Route {
    const KIND: EntityKind = EntityKind::Route;
    const UNIQUE_NAME: bool = false;
    entity_basics!();

    fn references(&self) -> Vec<Reference> {
        std::iter::once(Reference::new(EntityKind::Line, self.line))
            .chain(
                self.stops
                    .iter()
                    .map(|stop| Reference::new(EntityKind::Stop, *stop)),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_references() {
        let route = Route {
            id: 1,
            name: "1 North".into(),
            line: 4,
            stops: vec![7, 8],
        };
        assert_eq!(
            route.references(),
            vec![
                Reference::new(EntityKind::Line, 4),
                Reference::new(EntityKind::Stop, 7),
                Reference::new(EntityKind::Stop, 8),
            ]
        );
        assert!(!Route::UNIQUE_NAME);
        assert!(Stop::UNIQUE_NAME);
    }

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::MeanOfTransport.to_string(), "mean of transport");
    }
}
