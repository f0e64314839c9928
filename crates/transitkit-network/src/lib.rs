//! # TransitKit Network
//!
//! The track network of a TransitKit project.
//!
//! - [`geometry`]: lines, arcs and Bézier curves
//! - [`Vertex`], [`Track`], [`TrackObject`]: the graph, stored in id-keyed
//!   arenas inside a [`World`] made of [`Segment`]s
//! - [`NetworkUnitOfWork`]: staged edits committed all-or-nothing
//! - [`conditions`] and [`rules`]: validation of tool edits before staging

pub mod conditions;
pub mod geometry;
pub mod rules;
pub mod segment;
pub mod track;
pub mod track_object;
pub mod unit_of_work;
pub mod vertex;
pub mod world;

pub use conditions::{Condition, TransformInput};
pub use geometry::{Point2, Vec2};
pub use rules::{modes, Rule, RuleSet, Transform};
pub use segment::{Direction, Segment};
pub use track::{guess_convex, Track, TrackGeometry, TrackKind, TrackShape};
pub use track_object::{
    Orientation, Platform, TrackObject, TrackObjectId, TrackObjectPayload, VehiclePlacement,
};
pub use unit_of_work::{CommitReport, NetworkUnitOfWork, TrackRecord, VertexRecord};
pub use vertex::{TrackId, Vertex, VertexId};
pub use world::World;
