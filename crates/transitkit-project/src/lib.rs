//! # TransitKit Project
//!
//! The project model: managed entities, the world they live in, the
//! undoable commands that edit both, and the bounded history replaying
//! those commands.

pub mod command;
pub mod commands;
pub mod entities;
pub mod history;
pub mod managers;
pub mod project;

pub use command::{Command, CommandState};
pub use entities::{
    Entity, EntityId, EntityKind, Line, MeanOfTransport, Reference, Route, Stop, Vehicle,
    VehicleType,
};
pub use history::History;
pub use managers::{
    CrudManager, EntityManager, LineManager, ManagerMemento, MeanOfTransportManager, Memento,
    RouteManager, StopManager, VehicleManager, VehicleTypeManager,
};
pub use project::{Project, ProjectManager};
