//! Staging area for network edits.
//!
//! Edit tools stage [`VertexRecord`]s and [`TrackRecord`]s in a
//! [`NetworkUnitOfWork`]. New records get temporary negative ids; staged
//! copies of live entities keep their positive ids. Nothing touches the
//! world until [`NetworkUnitOfWork::commit`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use transitkit_core::constants::DEFAULT_VERTEX_DEGREE;
use transitkit_core::NetworkError;

use crate::geometry::Point2;
use crate::track::{TrackKind, TrackShape};
use crate::vertex::{TrackId, VertexId};
use crate::world::World;

/// Staged state of a vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub id: VertexId,
    pub x: f64,
    pub y: f64,
    /// Bound track ids; may hold temporary ids of staged tracks.
    pub slots: Vec<Option<TrackId>>,
}

impl VertexRecord {
    pub fn is_new(&self) -> bool {
        self.id < 0
    }

    pub fn degree(&self) -> usize {
        self.slots.len()
    }

    pub fn track_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_open(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    fn bind(&mut self, track: TrackId) {
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => *slot = Some(track),
            None => self.slots.push(Some(track)),
        }
    }
}

/// Staged state of a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: TrackId,
    pub vertices: [VertexId; 2],
    pub kind: TrackKind,
    /// Arc orientation for curved tracks; guessed when absent.
    pub convex: Option<bool>,
    /// Explicit arc center for curved tracks; derived from neighbouring
    /// tangents when absent.
    pub center: Option<[f64; 2]>,
}

impl TrackRecord {
    pub fn is_new(&self) -> bool {
        self.id < 0
    }

    /// Shape request for building the live geometry.
    pub fn shape(&self) -> TrackShape {
        match self.kind {
            TrackKind::Straight => TrackShape::Straight,
            TrackKind::Curved => TrackShape::Curved {
                center: self.center.map(|[x, y]| Point2::new(x, y)),
                convex: self.convex,
            },
            TrackKind::DoublyCurved => TrackShape::DoublyCurved,
        }
    }
}

/// Ids assigned to the staged records created by a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Temporary vertex id to live id.
    pub vertices: BTreeMap<VertexId, VertexId>,
    /// Temporary track id to live id.
    pub tracks: BTreeMap<TrackId, TrackId>,
}

/// Pending vertex and track edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkUnitOfWork {
    vertices: Vec<VertexRecord>,
    tracks: Vec<TrackRecord>,
    next_vertex_id: VertexId,
    next_track_id: TrackId,
}

impl NetworkUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a new vertex and returns its temporary id.
    pub fn new_vertex(&mut self, x: f64, y: f64) -> VertexId {
        self.next_vertex_id -= 1;
        let id = self.next_vertex_id;
        self.vertices.push(VertexRecord {
            id,
            x,
            y,
            slots: vec![None; DEFAULT_VERTEX_DEGREE],
        });
        id
    }

    /// Stages a new track between two staged or live vertices.
    ///
    /// Staged endpoint records get the track bound, growing their degree
    /// when they are full.
    pub fn new_track(&mut self, vertices: [VertexId; 2], kind: TrackKind) -> TrackId {
        self.next_track_id -= 1;
        let id = self.next_track_id;
        for vertex in vertices {
            if let Some(record) = self.vertex_mut(vertex) {
                record.bind(id);
            }
        }
        self.tracks.push(TrackRecord {
            id,
            vertices,
            kind,
            convex: None,
            center: None,
        });
        id
    }

    /// Stages a copy of a live vertex.
    pub fn stage_vertex(&mut self, world: &World, id: VertexId) -> Result<&mut VertexRecord, NetworkError> {
        let vertex = world.vertex(id).ok_or(NetworkError::UnknownVertex(id))?;
        if let Some(index) = self.vertices.iter().position(|v| v.id == id) {
            return Ok(&mut self.vertices[index]);
        }
        self.vertices.push(VertexRecord {
            id,
            x: vertex.x(),
            y: vertex.y(),
            slots: vertex.slots().to_vec(),
        });
        let last = self.vertices.len() - 1;
        Ok(&mut self.vertices[last])
    }

    /// Stages a copy of a live track.
    pub fn stage_track(&mut self, world: &World, id: TrackId) -> Result<&mut TrackRecord, NetworkError> {
        let track = world.track(id).ok_or(NetworkError::UnknownTrack(id))?;
        if let Some(index) = self.tracks.iter().position(|t| t.id == id) {
            return Ok(&mut self.tracks[index]);
        }
        self.tracks.push(TrackRecord {
            id,
            vertices: track.vertices(),
            kind: track.kind(),
            convex: track.convex(),
            center: track.center().map(|c| [c.x, c.y]),
        });
        let last = self.tracks.len() - 1;
        Ok(&mut self.tracks[last])
    }

    pub fn vertex(&self, id: VertexId) -> Option<&VertexRecord> {
        self.vertices.iter().find(|v| v.id == id)
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut VertexRecord> {
        self.vertices.iter_mut().find(|v| v.id == id)
    }

    pub fn track(&self, id: TrackId) -> Option<&TrackRecord> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut TrackRecord> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Staged tracks in staging order.
    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    /// Staged vertices in staging order.
    pub fn vertices(&self) -> &[VertexRecord] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Applies the staged records to `world`.
    ///
    /// Tracks are processed first, creating the new vertices they reference
    /// on demand, then the remaining vertex records. A staged copy of a live
    /// vertex is moved (subject to the incident tracks' vote) and expanded
    /// to its staged degree; a staged copy of a live track is reshaped.
    /// On any failure the world is restored to its state before the call.
    pub fn commit(&self, world: &mut World) -> Result<CommitReport, NetworkError> {
        self.commit_with_previous(world).map(|(report, _)| report)
    }

    /// Like [`commit`](Self::commit), also handing back the world as it was
    /// before the call.
    pub fn commit_with_previous(
        &self,
        world: &mut World,
    ) -> Result<(CommitReport, World), NetworkError> {
        let snapshot = world.clone();
        match self.apply(world) {
            Ok(report) => {
                tracing::debug!(
                    vertices = report.vertices.len(),
                    tracks = report.tracks.len(),
                    "Unit of work committed"
                );
                Ok((report, snapshot))
            }
            Err(err) => {
                *world = snapshot;
                tracing::warn!(error = %err, "Unit of work rejected");
                Err(err)
            }
        }
    }

    fn apply(&self, world: &mut World) -> Result<CommitReport, NetworkError> {
        let mut report = CommitReport::default();

        for record in &self.tracks {
            let mut ends = [0; 2];
            for (i, vertex) in record.vertices.into_iter().enumerate() {
                ends[i] = self.resolve_vertex(world, &mut report, record.id, vertex)?;
            }
            if record.is_new() {
                for live in ends {
                    self.ensure_free_slot(world, live)?;
                }
                let id = world.add_track(ends, record.shape())?;
                report.tracks.insert(record.id, id);
            } else {
                let current = world
                    .track(record.id)
                    .ok_or(NetworkError::UnknownTrack(record.id))?
                    .vertices();
                if current != ends {
                    return Err(NetworkError::Unsupported(format!(
                        "re-binding the endpoints of track {}",
                        record.id
                    )));
                }
                world.reshape_track(record.id, record.shape())?;
            }
        }

        for record in &self.vertices {
            if record.is_new() {
                if !report.vertices.contains_key(&record.id) {
                    let id = world.add_vertex_with_degree(record.x, record.y, record.degree())?;
                    report.vertices.insert(record.id, id);
                }
                continue;
            }
            let vertex = world
                .vertex(record.id)
                .ok_or(NetworkError::UnknownVertex(record.id))?;
            let (degree, position) = (vertex.degree(), vertex.position());
            if record.degree() > degree {
                world.expand_vertex(record.id, record.degree() - degree)?;
            }
            if position != record.position() {
                world.move_vertex(record.id, record.x, record.y)?;
            }
        }

        Ok(report)
    }

    fn resolve_vertex(
        &self,
        world: &mut World,
        report: &mut CommitReport,
        track: TrackId,
        vertex: VertexId,
    ) -> Result<VertexId, NetworkError> {
        if vertex >= 0 {
            return world
                .vertex(vertex)
                .map(|v| v.id())
                .ok_or(NetworkError::UnknownVertex(vertex));
        }
        if let Some(live) = report.vertices.get(&vertex) {
            return Ok(*live);
        }
        let record = self
            .vertex(vertex)
            .ok_or(NetworkError::UnresolvedVertex { track, vertex })?;
        let id = world.add_vertex_with_degree(record.x, record.y, record.degree())?;
        report.vertices.insert(vertex, id);
        Ok(id)
    }

    /// Expands a live vertex to its staged degree when it has no free slot.
    fn ensure_free_slot(&self, world: &mut World, vertex: VertexId) -> Result<(), NetworkError> {
        let live = world.vertex(vertex).ok_or(NetworkError::UnknownVertex(vertex))?;
        if live.is_open() {
            return Ok(());
        }
        let degree = live.degree();
        match self.vertex(vertex) {
            Some(record) if record.degree() > degree => {
                world.expand_vertex(vertex, record.degree() - degree)
            }
            _ => Err(NetworkError::NoFreeSlot(vertex)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_ids_are_negative() {
        let mut uow = NetworkUnitOfWork::new();
        let a = uow.new_vertex(0.0, 0.0);
        let b = uow.new_vertex(10.0, 0.0);
        let t = uow.new_track([a, b], TrackKind::Straight);
        assert_eq!((a, b, t), (-1, -2, -1));
        assert_eq!(uow.vertex(a).unwrap().track_count(), 1);
        assert!(uow.vertex(a).unwrap().is_open());
    }

    #[test]
    fn test_commit_creates_network() {
        let mut world = World::new(1, 1);
        let mut uow = NetworkUnitOfWork::new();
        let a = uow.new_vertex(0.0, 0.0);
        let b = uow.new_vertex(10.0, 0.0);
        let c = uow.new_vertex(20.0, 10.0);
        uow.new_track([a, b], TrackKind::Straight);
        uow.new_track([b, c], TrackKind::Curved);
        let report = uow.commit(&mut world).unwrap();
        assert_eq!(report.vertices.len(), 3);
        assert_eq!(report.tracks.len(), 2);
        assert_eq!(world.track_count(), 2);
        let curve = world.track(report.tracks[&-2]).unwrap();
        assert_eq!(curve.kind(), TrackKind::Curved);
        assert!(world.check_consistency().is_ok());
    }

    #[test]
    fn test_commit_hands_back_previous_world() {
        let mut world = World::new(1, 1);
        world.add_vertex(500.0, 500.0).unwrap();
        let before = world.clone();
        let mut uow = NetworkUnitOfWork::new();
        let a = uow.new_vertex(0.0, 0.0);
        let b = uow.new_vertex(10.0, 0.0);
        uow.new_track([a, b], TrackKind::Straight);
        let (report, previous) = uow.commit_with_previous(&mut world).unwrap();
        assert_eq!(previous, before);
        assert_eq!(report.tracks.len(), 1);
        assert_eq!(world.track_count(), 1);
    }

    #[test]
    fn test_commit_is_all_or_nothing() {
        let mut world = World::new(1, 1);
        let existing = world.add_vertex(500.0, 500.0).unwrap();
        let before = world.clone();
        let mut uow = NetworkUnitOfWork::new();
        let a = uow.new_vertex(0.0, 0.0);
        uow.new_track([a, existing], TrackKind::Straight);
        // The second track references a vertex that exists nowhere.
        uow.new_track([a, -42], TrackKind::Straight);
        let err = uow.commit(&mut world).unwrap_err();
        assert_eq!(
            err,
            NetworkError::UnresolvedVertex {
                track: -2,
                vertex: -42
            }
        );
        assert_eq!(world, before);
    }

    #[test]
    fn test_staged_vertex_is_moved_and_expanded() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(0.0, 0.0).unwrap();
        let b = world.add_vertex(10.0, 0.0).unwrap();
        world.add_track([a, b], TrackShape::Straight).unwrap();
        let mut uow = NetworkUnitOfWork::new();
        let record = uow.stage_vertex(&world, b).unwrap();
        record.x = 30.0;
        record.slots.push(None);
        uow.commit(&mut world).unwrap();
        let vertex = world.vertex(b).unwrap();
        assert_eq!(vertex.position(), Point2::new(30.0, 0.0));
        assert_eq!(vertex.degree(), 3);
        assert!(world.check_consistency().is_ok());
    }

    #[test]
    fn test_staged_track_is_reshaped() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(0.0, 0.0).unwrap();
        let b = world.add_vertex(10.0, 0.0).unwrap();
        let t = world.add_track([a, b], TrackShape::Straight).unwrap();
        let mut uow = NetworkUnitOfWork::new();
        let record = uow.stage_track(&world, t).unwrap();
        record.kind = TrackKind::Curved;
        record.convex = Some(false);
        uow.commit(&mut world).unwrap();
        let track = world.track(t).unwrap();
        assert_eq!(track.kind(), TrackKind::Curved);
        assert_eq!(track.convex(), Some(false));
        assert_eq!(track.center(), Some(Point2::new(5.0, 0.0)));
    }

    #[test]
    fn test_clear() {
        let mut uow = NetworkUnitOfWork::new();
        uow.new_vertex(1.0, 1.0);
        assert!(!uow.is_empty());
        uow.clear();
        assert!(uow.is_empty());
        assert_eq!(uow.new_vertex(1.0, 1.0), -1);
    }
}
