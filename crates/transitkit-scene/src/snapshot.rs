//! Immutable render snapshots built from the world on the model thread.

use serde::{Deserialize, Serialize};
use transitkit_core::NetworkError;
use transitkit_network::{
    NetworkUnitOfWork, Orientation, Point2, Track, TrackId, TrackKind, TrackObject,
    TrackObjectId, TrackObjectPayload, Vec2, VertexId, World,
};

use crate::camera::WorldRect;

/// Default flattening tolerance in metres.
pub const DEFAULT_FLATTEN_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexSnapshot {
    pub id: VertexId,
    pub position: Point2,
    pub degree: usize,
    pub track_count: usize,
}

impl VertexSnapshot {
    pub fn is_free_end(&self) -> bool {
        self.track_count == 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub id: TrackId,
    pub kind: TrackKind,
    pub vertices: [VertexId; 2],
    /// Flattened centre line.
    pub polyline: Vec<Point2>,
    pub bounds: WorldRect,
    pub length: f64,
}

/// A track object resolved to a world position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: TrackObjectId,
    pub track: TrackId,
    pub position: Point2,
    /// Unit direction the object faces.
    pub heading: Vec2,
    pub label: String,
    /// Extent along the track in metres.
    pub length: f64,
}

/// Everything the track, object and label streams draw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub vertices: Vec<VertexSnapshot>,
    pub tracks: Vec<TrackSnapshot>,
    pub platforms: Vec<ObjectSnapshot>,
    pub vehicles: Vec<ObjectSnapshot>,
}

impl NetworkSnapshot {
    /// Snapshot of every vertex, track and track object of `world`.
    pub fn from_world(world: &World, tolerance: f64) -> Self {
        Self::collect(world, tolerance, |_| true, |_| true)
    }

    /// Snapshot of the records staged in `uow`, as they would look once
    /// committed. `world` is left untouched.
    pub fn preview(
        world: &World,
        uow: &NetworkUnitOfWork,
        tolerance: f64,
    ) -> Result<Self, NetworkError> {
        let mut scratch = world.clone();
        let report = uow.commit(&mut scratch)?;
        let live_vertex = |id: VertexId| report.vertices.get(&id).copied().unwrap_or(id);
        let live_track = |id: TrackId| report.tracks.get(&id).copied().unwrap_or(id);
        let vertices: Vec<VertexId> = uow.vertices().iter().map(|v| live_vertex(v.id)).collect();
        let tracks: Vec<TrackId> = uow.tracks().iter().map(|t| live_track(t.id)).collect();
        Ok(Self::collect(
            &scratch,
            tolerance,
            |id| vertices.contains(&id),
            |id| tracks.contains(&id),
        ))
    }

    fn collect(
        world: &World,
        tolerance: f64,
        keep_vertex: impl Fn(VertexId) -> bool,
        keep_track: impl Fn(TrackId) -> bool,
    ) -> Self {
        let vertices = world
            .vertices()
            .filter(|v| keep_vertex(v.id()))
            .map(|v| VertexSnapshot {
                id: v.id(),
                position: v.position(),
                degree: v.degree(),
                track_count: v.track_count(),
            })
            .collect();

        let mut snapshot = Self {
            vertices,
            ..Self::default()
        };
        for track in world.tracks().filter(|t| keep_track(t.id())) {
            let polyline = track.flatten(tolerance);
            let bounds = WorldRect::enclosing(&polyline)
                .unwrap_or_else(|| WorldRect::new(Point2::origin(), Point2::origin()));
            snapshot.tracks.push(TrackSnapshot {
                id: track.id(),
                kind: track.kind(),
                vertices: track.vertices(),
                bounds,
                length: track.length(),
                polyline,
            });
            snapshot
                .platforms
                .extend(objects(track, track.platforms(), |p| p.name.clone(), |p| p.length));
            snapshot.vehicles.extend(objects(
                track,
                track.vehicles(),
                |v| format!("#{}", v.vehicle),
                |_| 0.0,
            ));
        }
        snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.tracks.is_empty()
    }

    pub fn track(&self, id: TrackId) -> Option<&TrackSnapshot> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&VertexSnapshot> {
        self.vertices.iter().find(|v| v.id == id)
    }
}

fn objects<'a, P: TrackObjectPayload>(
    track: &'a Track,
    objects: &'a [TrackObject<P>],
    label: impl Fn(&P) -> String + 'a,
    length: impl Fn(&P) -> f64 + 'a,
) -> impl Iterator<Item = ObjectSnapshot> + 'a {
    objects.iter().map(move |object| {
        let t = object.position();
        let position = track.point_at(t);
        let ahead = track.point_at((t + 1e-3).min(1.0));
        let behind = track.point_at((t - 1e-3).max(0.0));
        let forward = (ahead - behind)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(|| track.tangent_at_index(0));
        let heading = match object.orientation {
            Orientation::Forward => forward,
            Orientation::Backward => -forward,
        };
        ObjectSnapshot {
            id: object.id,
            track: track.id(),
            position,
            heading,
            label: label(&object.payload),
            length: length(&object.payload),
        }
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSnapshot {
    /// Absolute grid column.
    pub column: i64,
    /// Absolute grid row.
    pub row: i64,
    pub background: Option<String>,
    pub in_use: bool,
}

impl SegmentSnapshot {
    pub fn bounds(&self, segment_size: f64) -> WorldRect {
        let min = Point2::new(
            self.column as f64 * segment_size,
            self.row as f64 * segment_size,
        );
        WorldRect::new(min, Point2::new(min.x + segment_size, min.y + segment_size))
    }
}

/// The segment grid as drawn by the grid and bitmap streams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentsSnapshot {
    pub origin: (i64, i64),
    pub columns: usize,
    pub rows: usize,
    pub segments: Vec<SegmentSnapshot>,
}

impl SegmentsSnapshot {
    pub fn from_world(world: &World) -> Self {
        Self {
            origin: world.origin(),
            columns: world.columns(),
            rows: world.rows(),
            segments: world
                .segments()
                .map(|s| SegmentSnapshot {
                    column: s.column(),
                    row: s.row(),
                    background: s.background().map(str::to_string),
                    in_use: s.is_in_use(),
                })
                .collect(),
        }
    }
}

/// Current selection of the edit tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub vertices: Vec<VertexId>,
    pub tracks: Vec<TrackId>,
    pub objects: Vec<TrackObjectId>,
    /// Rubber band rectangle while dragging.
    pub rect: Option<WorldRect>,
}

impl SelectionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
            && self.tracks.is_empty()
            && self.objects.is_empty()
            && self.rect.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transitkit_network::{Platform, TrackShape};

    fn world() -> World {
        let mut world = World::new(2, 1);
        let a = world.add_vertex(100.0, 100.0).unwrap();
        let b = world.add_vertex(300.0, 100.0).unwrap();
        let c = world.add_vertex(1300.0, 400.0).unwrap();
        let t = world.add_track([a, b], TrackShape::Straight).unwrap();
        world
            .add_track(
                [b, c],
                TrackShape::Curved {
                    center: None,
                    convex: None,
                },
            )
            .unwrap();
        world
            .attach(
                t,
                0.25,
                Orientation::Backward,
                Platform {
                    name: "North".into(),
                    stop: None,
                    length: 50.0,
                },
            )
            .unwrap();
        world
    }

    #[test]
    fn test_network_snapshot_from_world() {
        let snapshot = NetworkSnapshot::from_world(&world(), DEFAULT_FLATTEN_TOLERANCE);
        assert_eq!(snapshot.vertices.len(), 3);
        assert_eq!(snapshot.tracks.len(), 2);
        let straight = &snapshot.tracks[0];
        assert_eq!(straight.polyline.len(), 2);
        assert!((straight.length - 200.0).abs() < 1e-9);
        assert!(snapshot.tracks[1].polyline.len() > 2);

        let platform = &snapshot.platforms[0];
        assert_eq!(platform.label, "North");
        assert!((platform.position - Point2::new(150.0, 100.0)).norm() < 1e-9);
        assert!((platform.heading - Vec2::new(-1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_preview_leaves_world_untouched() {
        let world = world();
        let before = world.clone();
        let mut uow = NetworkUnitOfWork::new();
        let a = uow.new_vertex(500.0, 500.0);
        let b = uow.new_vertex(700.0, 600.0);
        uow.new_track([a, b], TrackKind::Straight);
        let preview = NetworkSnapshot::preview(&world, &uow, DEFAULT_FLATTEN_TOLERANCE).unwrap();
        assert_eq!(world, before);
        assert_eq!(preview.vertices.len(), 2);
        assert_eq!(preview.tracks.len(), 1);
        assert!(preview.tracks[0].id > 0);
    }

    #[test]
    fn test_segments_snapshot() {
        let mut world = world();
        world
            .set_segment_background(1, 0, Some("map.png".into()))
            .unwrap();
        let snapshot = SegmentsSnapshot::from_world(&world);
        assert_eq!((snapshot.columns, snapshot.rows), (2, 1));
        assert!(snapshot.segments.iter().all(|s| s.in_use));
        assert_eq!(snapshot.segments[1].background.as_deref(), Some("map.png"));
    }
}
