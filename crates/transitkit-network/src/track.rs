//! Tracks and their geometry.
//!
//! A track joins exactly two vertices. Its shape is one of a closed set of
//! variants; every variant follows the same two-phase protocol when one of
//! its vertices moves:
//!
//! 1. [`Track::plan_vertex_change`] is the vote. It is pure and returns the
//!    recomputed geometry when the track accepts the new position.
//! 2. [`Track::vertices_updated`] commits a planned geometry, or
//!    [`Track::vertices_not_updated`] tells the track the move was abandoned.

use std::fmt;

use serde::{Deserialize, Serialize};
use transitkit_core::constants::EPSILON;
use transitkit_core::NetworkError;

use crate::geometry::{
    angle_of, coincident, cross, direction, unit, Arc, CubicBezier, Line, Point2, Vec2,
};
use crate::track_object::{Platform, TrackObject, VehiclePlacement};
use crate::vertex::{TrackId, VertexId};
use crate::world::World;

/// Relative tolerance for an explicit arc center being equidistant from both ends.
const CENTER_TOLERANCE: f64 = 1e-6;

/// The variant of a track without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Straight,
    Curved,
    DoublyCurved,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackKind::Straight => "straight",
            TrackKind::Curved => "curved",
            TrackKind::DoublyCurved => "doubly-curved",
        };
        f.write_str(name)
    }
}

/// Requested shape of a new or converted track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackShape {
    Straight,
    /// A circular arc. Without an explicit center the arc continues the
    /// tangent of a neighbouring track.
    Curved {
        center: Option<Point2>,
        convex: Option<bool>,
    },
    DoublyCurved,
}

impl TrackShape {
    pub fn kind(&self) -> TrackKind {
        match self {
            TrackShape::Straight => TrackKind::Straight,
            TrackShape::Curved { .. } => TrackKind::Curved,
            TrackShape::DoublyCurved => TrackKind::DoublyCurved,
        }
    }
}

/// Derived geometry of a track, including the cached endpoint positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrackGeometry {
    Straight {
        ends: [Point2; 2],
        /// Direction from vertex 0 to vertex 1 in radians.
        angle: f64,
        length: f64,
    },
    Curved {
        ends: [Point2; 2],
        center: Point2,
        radius: f64,
        /// Counter-clockwise from vertex 0 to vertex 1.
        convex: bool,
    },
    DoublyCurved {
        ends: [Point2; 2],
        /// Unit directions leaving each endpoint into the track.
        tangents: [Vec2; 2],
    },
}

impl TrackGeometry {
    pub fn kind(&self) -> TrackKind {
        match self {
            TrackGeometry::Straight { .. } => TrackKind::Straight,
            TrackGeometry::Curved { .. } => TrackKind::Curved,
            TrackGeometry::DoublyCurved { .. } => TrackKind::DoublyCurved,
        }
    }

    pub fn ends(&self) -> [Point2; 2] {
        match self {
            TrackGeometry::Straight { ends, .. }
            | TrackGeometry::Curved { ends, .. }
            | TrackGeometry::DoublyCurved { ends, .. } => *ends,
        }
    }

    fn straight(a: Point2, b: Point2) -> Option<Self> {
        if coincident(&a, &b) {
            return None;
        }
        let chord = b - a;
        Some(TrackGeometry::Straight {
            ends: [a, b],
            angle: angle_of(&chord),
            length: chord.norm(),
        })
    }

    fn curved_around(a: Point2, b: Point2, center: Point2, convex: bool) -> Self {
        TrackGeometry::Curved {
            ends: [a, b],
            center,
            radius: (a - center).norm(),
            convex,
        }
    }

    /// Arc leaving `ends[fixed]` along `tangent` and ending at the other end.
    ///
    /// The center is where the normal of the tangent at the fixed end meets
    /// the perpendicular bisector of the chord.
    fn curved_from_tangent(ends: [Point2; 2], fixed: usize, tangent: Vec2) -> Option<Self> {
        let (from, to) = (ends[fixed], ends[1 - fixed]);
        if coincident(&from, &to) {
            return None;
        }
        let normal = Line::orthogonal_at(from, tangent);
        let bisector = Line::perpendicular_bisector(from, to);
        let center = normal.intersect(&bisector)?;
        let turns_left = cross(&tangent, &(center - from)) > 0.0;
        let convex = if fixed == 0 { turns_left } else { !turns_left };
        Some(Self::curved_around(ends[0], ends[1], center, convex))
    }

    fn doubly_curved(ends: [Point2; 2], tangents: [Option<Vec2>; 2]) -> Option<Self> {
        let [a, b] = ends;
        if coincident(&a, &b) {
            return None;
        }
        let chord = unit(&(b - a))?;
        let start = tangents[0].and_then(|t| unit(&t)).unwrap_or(chord);
        let end = tangents[1].and_then(|t| unit(&t)).unwrap_or(-chord);
        Some(TrackGeometry::DoublyCurved {
            ends,
            tangents: [start, end],
        })
    }

    fn arc(&self) -> Option<Arc> {
        match self {
            TrackGeometry::Curved {
                ends,
                center,
                convex,
                ..
            } => Some(Arc::from_endpoints(*center, ends[0], ends[1], *convex)),
            _ => None,
        }
    }

    fn bezier(&self) -> Option<CubicBezier> {
        match self {
            TrackGeometry::DoublyCurved { ends, tangents } => Some(CubicBezier::from_tangents(
                ends[0],
                tangents[0],
                ends[1],
                tangents[1],
            )),
            _ => None,
        }
    }
}

/// A track between two vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    id: TrackId,
    vertices: [VertexId; 2],
    geometry: TrackGeometry,
    pub(crate) platforms: Vec<TrackObject<Platform>>,
    pub(crate) vehicles: Vec<TrackObject<VehiclePlacement>>,
}

impl Track {
    pub(crate) fn new(id: TrackId, vertices: [VertexId; 2], geometry: TrackGeometry) -> Self {
        Self {
            id,
            vertices,
            geometry,
            platforms: Vec::new(),
            vehicles: Vec::new(),
        }
    }

    /// Builds the geometry of a track between `vertices` with the requested
    /// shape. Tangents are inherited from the tracks already bound to the
    /// endpoints, ignoring `track` itself.
    pub fn construct_geometry(
        world: &World,
        track: TrackId,
        vertices: [VertexId; 2],
        shape: &TrackShape,
    ) -> Result<TrackGeometry, NetworkError> {
        let ends = [
            world.vertex_position(vertices[0])?,
            world.vertex_position(vertices[1])?,
        ];
        let invalid = |reason: &str| NetworkError::InvalidGeometry {
            track,
            reason: reason.to_string(),
        };
        if coincident(&ends[0], &ends[1]) {
            return Err(invalid("endpoints coincide"));
        }
        match shape {
            TrackShape::Straight => {
                TrackGeometry::straight(ends[0], ends[1]).ok_or_else(|| invalid("endpoints coincide"))
            }
            TrackShape::Curved {
                center: Some(center),
                convex,
            } => {
                let center = *center;
                let r0 = (ends[0] - center).norm();
                let r1 = (ends[1] - center).norm();
                if (r0 - r1).abs() > CENTER_TOLERANCE * r0.max(1.0) {
                    return Err(invalid("center is not equidistant from both ends"));
                }
                Ok(TrackGeometry::curved_around(
                    ends[0],
                    ends[1],
                    center,
                    convex.unwrap_or(true),
                ))
            }
            TrackShape::Curved {
                center: None,
                convex,
            } => {
                let from_tangent = (0..2).find_map(|fixed| {
                    continuation_tangent(world, vertices[fixed], track).and_then(|tangent| {
                        TrackGeometry::curved_from_tangent(ends, fixed, tangent)
                    })
                });
                if let Some(geometry) = from_tangent {
                    return Ok(geometry);
                }
                let convex = match convex {
                    Some(convex) => *convex,
                    None => guess_convex_at_ends(world, vertices, track)?,
                };
                let center = nalgebra::center(&ends[0], &ends[1]);
                Ok(TrackGeometry::curved_around(ends[0], ends[1], center, convex))
            }
            TrackShape::DoublyCurved => {
                let tangents = [
                    continuation_tangent(world, vertices[0], track),
                    continuation_tangent(world, vertices[1], track),
                ];
                TrackGeometry::doubly_curved(ends, tangents)
                    .ok_or_else(|| invalid("endpoints coincide"))
            }
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn vertices(&self) -> [VertexId; 2] {
        self.vertices
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    pub fn kind(&self) -> TrackKind {
        self.geometry.kind()
    }

    /// Arc center of a curved track.
    pub fn center(&self) -> Option<Point2> {
        match self.geometry {
            TrackGeometry::Curved { center, .. } => Some(center),
            _ => None,
        }
    }

    /// Arc orientation of a curved track.
    pub fn convex(&self) -> Option<bool> {
        match self.geometry {
            TrackGeometry::Curved { convex, .. } => Some(convex),
            _ => None,
        }
    }

    /// Index (0 or 1) of `vertex` among the endpoints.
    pub fn index_of(&self, vertex: VertexId) -> Option<usize> {
        self.vertices.iter().position(|v| *v == vertex)
    }

    /// The endpoint opposite to `vertex`.
    pub fn other_vertex(&self, vertex: VertexId) -> Option<VertexId> {
        self.index_of(vertex).map(|i| self.vertices[1 - i])
    }

    pub fn platforms(&self) -> &[TrackObject<Platform>] {
        &self.platforms
    }

    pub fn vehicles(&self) -> &[TrackObject<VehiclePlacement>] {
        &self.vehicles
    }

    /// Number of attached objects of every payload type.
    pub fn object_count(&self) -> usize {
        self.platforms.len() + self.vehicles.len()
    }

    pub fn length(&self) -> f64 {
        match &self.geometry {
            TrackGeometry::Straight { length, .. } => *length,
            TrackGeometry::Curved { .. } => self.geometry.arc().map_or(0.0, |a| a.length()),
            TrackGeometry::DoublyCurved { .. } => {
                self.geometry.bezier().map_or(0.0, |b| b.length())
            }
        }
    }

    /// Point at parameter `t` in `[0, 1]` from vertex 0 to vertex 1.
    pub fn point_at(&self, t: f64) -> Point2 {
        match &self.geometry {
            TrackGeometry::Straight { ends, .. } => ends[0] + (ends[1] - ends[0]) * t,
            TrackGeometry::Curved { ends, .. } => {
                self.geometry.arc().map_or(ends[0], |a| a.point_at(t))
            }
            TrackGeometry::DoublyCurved { ends, .. } => {
                self.geometry.bezier().map_or(ends[0], |b| b.point_at(t))
            }
        }
    }

    /// Unit direction leaving endpoint `index` along the track.
    pub fn tangent_at_index(&self, index: usize) -> Vec2 {
        match &self.geometry {
            TrackGeometry::Straight { angle, .. } => {
                let forward = direction(*angle);
                if index == 0 {
                    forward
                } else {
                    -forward
                }
            }
            TrackGeometry::Curved { .. } => match self.geometry.arc() {
                Some(arc) if index == 0 => arc.tangent_at(0.0),
                Some(arc) => -arc.tangent_at(1.0),
                None => Vec2::zeros(),
            },
            TrackGeometry::DoublyCurved { tangents, .. } => tangents[index.min(1)],
        }
    }

    /// Unit direction leaving `vertex` along the track.
    pub fn tangent_at(&self, vertex: VertexId) -> Option<Vec2> {
        self.index_of(vertex).map(|i| self.tangent_at_index(i))
    }

    /// Polyline approximation for rendering and hit testing.
    pub fn flatten(&self, tolerance: f64) -> Vec<Point2> {
        match &self.geometry {
            TrackGeometry::Straight { ends, .. } => ends.to_vec(),
            TrackGeometry::Curved { ends, .. } => self
                .geometry
                .arc()
                .map_or_else(|| ends.to_vec(), |a| a.flatten(tolerance)),
            TrackGeometry::DoublyCurved { ends, .. } => self
                .geometry
                .bezier()
                .map_or_else(|| ends.to_vec(), |b| b.flatten(tolerance)),
        }
    }

    /// Pure predicate: would this track accept `vertex` moving to `(x, y)`?
    pub fn is_vertex_change_allowed(&self, world: &World, vertex: VertexId, x: f64, y: f64) -> bool {
        self.plan_vertex_change(world, vertex, Point2::new(x, y))
            .is_some()
    }

    /// Votes on moving `vertex` to `position`.
    ///
    /// Returns the geometry the track would have after the move, or `None`
    /// when the track refuses. Never mutates anything.
    pub fn plan_vertex_change(
        &self,
        world: &World,
        vertex: VertexId,
        position: Point2,
    ) -> Option<TrackGeometry> {
        let moving = self.index_of(vertex)?;
        let fixed = 1 - moving;
        let mut ends = self.geometry.ends();
        ends[moving] = position;
        match &self.geometry {
            TrackGeometry::Straight { .. } => TrackGeometry::straight(ends[0], ends[1]),
            TrackGeometry::Curved { .. } => {
                let fixed_vertex = self.vertices[fixed];
                let fixed_shared = other_track_count(world, fixed_vertex, self.id) > 0;
                let moving_shared = other_track_count(world, vertex, self.id) > 0;
                if fixed_shared && moving_shared {
                    return None;
                }
                let tangent = continuation_tangent(world, fixed_vertex, self.id)
                    .unwrap_or_else(|| self.tangent_at_index(fixed));
                TrackGeometry::curved_from_tangent(ends, fixed, tangent)
            }
            TrackGeometry::DoublyCurved { tangents, .. } => {
                let mut planned = [Some(tangents[0]), Some(tangents[1])];
                if let Some(inherited) = continuation_tangent(world, self.vertices[fixed], self.id)
                {
                    planned[fixed] = Some(inherited);
                }
                TrackGeometry::doubly_curved(ends, planned)
            }
        }
    }

    /// Commits a geometry returned by [`Track::plan_vertex_change`].
    pub fn vertices_updated(&mut self, geometry: TrackGeometry) {
        tracing::trace!(track = self.id, kind = %geometry.kind(), "Track geometry updated");
        self.geometry = geometry;
    }

    /// The planned move was abandoned; the track keeps its geometry.
    pub fn vertices_not_updated(&self) {
        tracing::trace!(track = self.id, "Vertex move abandoned");
    }

    pub(crate) fn set_geometry(&mut self, geometry: TrackGeometry) {
        self.geometry = geometry;
    }
}

/// Number of tracks bound to `vertex` other than `track`.
fn other_track_count(world: &World, vertex: VertexId, track: TrackId) -> usize {
    world
        .vertex(vertex)
        .map_or(0, |v| v.tracks().filter(|t| *t != track).count())
}

/// Direction in which a track leaving `vertex` continues its first
/// neighbouring track (other than `track`) smoothly.
pub(crate) fn continuation_tangent(world: &World, vertex: VertexId, track: TrackId) -> Option<Vec2> {
    let v = world.vertex(vertex)?;
    v.tracks()
        .filter(|t| *t != track)
        .find_map(|t| world.track(t).and_then(|n| n.tangent_at(vertex)))
        .map(|tangent| -tangent)
}

/// Default `convex` flag for a curved track attached to the straight track
/// `straight` at `shared`.
///
/// Uses the sign of the x delta from the shared vertex to the straight
/// track's far vertex, falling back to the y delta when the x delta is
/// within [`EPSILON`].
pub fn guess_convex(world: &World, straight: TrackId, shared: VertexId) -> Result<bool, NetworkError> {
    let track = world
        .track(straight)
        .ok_or(NetworkError::UnknownTrack(straight))?;
    let far = track
        .other_vertex(shared)
        .ok_or(NetworkError::UnknownVertex(shared))?;
    let shared_pos = world.vertex_position(shared)?;
    let far_pos = world.vertex_position(far)?;
    let dx = far_pos.x - shared_pos.x;
    if dx.abs() > EPSILON {
        Ok(dx > 0.0)
    } else {
        Ok(far_pos.y - shared_pos.y > 0.0)
    }
}

/// `guess_convex` against the first straight neighbour at either end.
fn guess_convex_at_ends(
    world: &World,
    vertices: [VertexId; 2],
    track: TrackId,
) -> Result<bool, NetworkError> {
    for vertex in vertices {
        let v = world.vertex(vertex).ok_or(NetworkError::UnknownVertex(vertex))?;
        let straight = v.tracks().filter(|t| *t != track).find(|t| {
            world
                .track(*t)
                .is_some_and(|n| n.kind() == TrackKind::Straight)
        });
        if let Some(straight) = straight {
            return guess_convex(world, straight, vertex);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn world_with_straight() -> (World, VertexId, VertexId, TrackId) {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(100.0, 100.0).unwrap();
        let b = world.add_vertex(200.0, 100.0).unwrap();
        let t = world.add_track([a, b], TrackShape::Straight).unwrap();
        (world, a, b, t)
    }

    #[test]
    fn test_straight_derived_values() {
        let (world, a, _, t) = world_with_straight();
        let track = world.track(t).unwrap();
        assert_eq!(track.kind(), TrackKind::Straight);
        assert!((track.length() - 100.0).abs() < 1e-12);
        assert!((track.tangent_at(a).unwrap() - Vec2::new(1.0, 0.0)).norm() < 1e-12);
        assert_eq!(track.point_at(0.5), Point2::new(150.0, 100.0));
    }

    #[test]
    fn test_straight_vote_refuses_coincident_endpoints() {
        let (world, a, _, t) = world_with_straight();
        let track = world.track(t).unwrap();
        assert!(!track.is_vertex_change_allowed(&world, a, 200.0, 100.0));
        assert!(track.is_vertex_change_allowed(&world, a, 150.0, 150.0));
    }

    #[test]
    fn test_curved_continues_straight_tangent() {
        let (mut world, _, b, _) = world_with_straight();
        let c = world.add_vertex(300.0, 200.0).unwrap();
        let t = world
            .add_track(
                [b, c],
                TrackShape::Curved {
                    center: None,
                    convex: None,
                },
            )
            .unwrap();
        let track = world.track(t).unwrap();
        let center = track.center().unwrap();
        assert!((center - Point2::new(200.0, 200.0)).norm() < 1e-9);
        assert_eq!(track.convex(), Some(true));
        assert!((track.tangent_at(b).unwrap() - Vec2::new(1.0, 0.0)).norm() < 1e-9);
        assert!((track.length() - 50.0 * PI).abs() < 1e-6);
    }

    #[test]
    fn test_curved_fallback_uses_guess_convex() {
        let (mut world, _, b, _) = world_with_straight();
        // Collinear with the straight track: tangent construction is degenerate.
        let c = world.add_vertex(300.0, 100.0).unwrap();
        let t = world
            .add_track(
                [b, c],
                TrackShape::Curved {
                    center: None,
                    convex: None,
                },
            )
            .unwrap();
        let track = world.track(t).unwrap();
        assert!((track.center().unwrap() - Point2::new(250.0, 100.0)).norm() < 1e-9);
        // Far vertex of the straight track lies west of the shared vertex.
        assert_eq!(track.convex(), Some(false));
    }

    #[test]
    fn test_guess_convex_tie_uses_y() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(100.0, 100.0).unwrap();
        let b = world.add_vertex(100.0, 200.0).unwrap();
        let t = world.add_track([a, b], TrackShape::Straight).unwrap();
        assert!(guess_convex(&world, t, a).unwrap());
        assert!(!guess_convex(&world, t, b).unwrap());
    }

    #[test]
    fn test_explicit_center_must_be_equidistant() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(100.0, 100.0).unwrap();
        let b = world.add_vertex(200.0, 100.0).unwrap();
        let result = world.add_track(
            [a, b],
            TrackShape::Curved {
                center: Some(Point2::new(100.0, 150.0)),
                convex: Some(true),
            },
        );
        assert!(matches!(result, Err(NetworkError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_curved_vote_refuses_ambiguous_move() {
        let (mut world, _, b, _) = world_with_straight();
        let c = world.add_vertex(300.0, 200.0).unwrap();
        let curve = world
            .add_track(
                [b, c],
                TrackShape::Curved {
                    center: None,
                    convex: None,
                },
            )
            .unwrap();
        let d = world.add_vertex(300.0, 300.0).unwrap();
        world.add_track([c, d], TrackShape::Straight).unwrap();
        let track = world.track(curve).unwrap();
        assert!(!track.is_vertex_change_allowed(&world, c, 310.0, 220.0));
        assert!(world.track(curve).unwrap().center().is_some());
    }

    #[test]
    fn test_doubly_curved_inherits_tangents() {
        let (mut world, _, b, _) = world_with_straight();
        let c = world.add_vertex(400.0, 150.0).unwrap();
        let t = world.add_track([b, c], TrackShape::DoublyCurved).unwrap();
        let track = world.track(t).unwrap();
        assert!((track.tangent_at(b).unwrap() - Vec2::new(1.0, 0.0)).norm() < 1e-12);
        assert!(track.length() > 200.0);
        let points = track.flatten(0.1);
        assert_eq!(points.first().copied(), Some(Point2::new(200.0, 100.0)));
        assert!((points.last().unwrap() - Point2::new(400.0, 150.0)).norm() < 1e-9);
    }
}
