//! The world: a resizable grid of segments plus the vertex and track arenas.
//!
//! Vertices and tracks reference each other by id only. Positions are
//! absolute world coordinates; a vertex belongs to the segment containing
//! its position and a track to the segments of both its endpoints.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use transitkit_core::constants::{DEFAULT_VERTEX_DEGREE, SEGMENT_SIZE};
use transitkit_core::{NetworkError, WorldError};

use crate::geometry::Point2;
use crate::segment::{Direction, Segment};
use crate::track::{Track, TrackShape};
use crate::track_object::{Orientation, TrackObject, TrackObjectId, TrackObjectPayload};
use crate::vertex::{TrackId, Vertex, VertexId};

/// Grid of segments and the network located in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Absolute column and row of the top-left segment.
    origin: (i64, i64),
    columns: usize,
    rows: usize,
    /// Row-major.
    segments: Vec<Segment>,
    vertices: BTreeMap<VertexId, Vertex>,
    tracks: BTreeMap<TrackId, Track>,
    next_vertex_id: VertexId,
    next_track_id: TrackId,
    next_object_id: TrackObjectId,
}

impl PartialEq for World {
    // Id counters are bookkeeping and do not take part in equality.
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
            && self.columns == other.columns
            && self.rows == other.rows
            && self.segments == other.segments
            && self.vertices == other.vertices
            && self.tracks == other.tracks
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl World {
    /// Creates an empty world of `columns` x `rows` segments (at least 1 x 1).
    pub fn new(columns: usize, rows: usize) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let segments = (0..rows as i64)
            .flat_map(|row| (0..columns as i64).map(move |column| Segment::new(column, row)))
            .collect();
        Self {
            origin: (0, 0),
            columns,
            rows,
            segments,
            vertices: BTreeMap::new(),
            tracks: BTreeMap::new(),
            next_vertex_id: 1,
            next_track_id: 1,
            next_object_id: 1,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Absolute grid coordinates of the top-left segment.
    pub fn origin(&self) -> (i64, i64) {
        self.origin
    }

    pub fn width(&self) -> f64 {
        self.columns as f64 * SEGMENT_SIZE
    }

    pub fn height(&self) -> f64 {
        self.rows as f64 * SEGMENT_SIZE
    }

    /// Top-left and bottom-right corners of the world in metres.
    pub fn bounds(&self) -> (Point2, Point2) {
        let min = Point2::new(
            self.origin.0 as f64 * SEGMENT_SIZE,
            self.origin.1 as f64 * SEGMENT_SIZE,
        );
        (min, Point2::new(min.x + self.width(), min.y + self.height()))
    }

    pub fn contains(&self, p: &Point2) -> bool {
        let (min, max) = self.bounds();
        p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y
    }

    /// Grid index (column, row) of the segment containing `p`.
    pub fn segment_index_at(&self, p: &Point2) -> Option<(usize, usize)> {
        if !self.contains(p) {
            return None;
        }
        let column = (p.x / SEGMENT_SIZE).floor() as i64 - self.origin.0;
        let row = (p.y / SEGMENT_SIZE).floor() as i64 - self.origin.1;
        Some((column as usize, row as usize))
    }

    fn slot(&self, column: usize, row: usize) -> Option<usize> {
        (column < self.columns && row < self.rows).then(|| row * self.columns + column)
    }

    /// Segment by grid index.
    pub fn segment(&self, column: usize, row: usize) -> Option<&Segment> {
        self.slot(column, row).map(|i| &self.segments[i])
    }

    /// Segments in row-major order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn segment_at(&self, p: &Point2) -> Option<&Segment> {
        self.segment_index_at(p)
            .and_then(|(column, row)| self.segment(column, row))
    }

    /// Sets the background of a segment and returns the previous one.
    pub fn set_segment_background(
        &mut self,
        column: usize,
        row: usize,
        background: Option<String>,
    ) -> Result<Option<String>, WorldError> {
        let index = self
            .slot(column, row)
            .ok_or(WorldError::UnknownSegment { column, row })?;
        Ok(self.segments[index].set_background(background))
    }

    /// Grid indices of every segment containing vertices or tracks.
    pub fn segment_usage(&self) -> Vec<(usize, usize)> {
        (0..self.rows)
            .flat_map(|row| (0..self.columns).map(move |column| (column, row)))
            .filter(|(column, row)| {
                self.segment(*column, *row)
                    .is_some_and(Segment::is_in_use)
            })
            .collect()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex_position(&self, id: VertexId) -> Result<Point2, NetworkError> {
        self.vertex(id)
            .map(Vertex::position)
            .ok_or(NetworkError::UnknownVertex(id))
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.tracks.is_empty()
    }

    fn segment_mut_at(&mut self, p: &Point2) -> Option<&mut Segment> {
        let (column, row) = self.segment_index_at(p)?;
        let index = self.slot(column, row)?;
        self.segments.get_mut(index)
    }

    fn index_vertex(&mut self, id: VertexId, p: &Point2) {
        if let Some(segment) = self.segment_mut_at(p) {
            segment.vertices.insert(id);
        }
    }

    fn unindex_vertex(&mut self, id: VertexId, p: &Point2) {
        if let Some(segment) = self.segment_mut_at(p) {
            segment.vertices.remove(&id);
        }
    }

    fn track_ends(&self, id: TrackId) -> Option<[Point2; 2]> {
        self.tracks.get(&id).map(|t| t.geometry().ends())
    }

    fn index_track(&mut self, id: TrackId) {
        if let Some(ends) = self.track_ends(id) {
            for p in ends {
                if let Some(segment) = self.segment_mut_at(&p) {
                    segment.tracks.insert(id);
                }
            }
        }
    }

    fn unindex_track(&mut self, id: TrackId) {
        if let Some(ends) = self.track_ends(id) {
            for p in ends {
                if let Some(segment) = self.segment_mut_at(&p) {
                    segment.tracks.remove(&id);
                }
            }
        }
    }

    /// Adds a vertex with the default degree.
    pub fn add_vertex(&mut self, x: f64, y: f64) -> Result<VertexId, NetworkError> {
        self.add_vertex_with_degree(x, y, DEFAULT_VERTEX_DEGREE)
    }

    pub fn add_vertex_with_degree(
        &mut self,
        x: f64,
        y: f64,
        degree: usize,
    ) -> Result<VertexId, NetworkError> {
        let position = Point2::new(x, y);
        if !self.contains(&position) {
            return Err(NetworkError::OutOfBounds { x, y });
        }
        let id = self.next_vertex_id;
        self.next_vertex_id += 1;
        self.vertices
            .insert(id, Vertex::with_degree(id, x, y, degree));
        self.index_vertex(id, &position);
        tracing::debug!(vertex = id, x, y, degree, "Vertex added");
        Ok(id)
    }

    /// Removes a vertex that has no bound tracks.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<Vertex, NetworkError> {
        let vertex = self.vertices.get(&id).ok_or(NetworkError::UnknownVertex(id))?;
        if vertex.track_count() > 0 {
            return Err(NetworkError::VertexInUse(id));
        }
        let position = vertex.position();
        self.unindex_vertex(id, &position);
        tracing::debug!(vertex = id, "Vertex removed");
        self.vertices
            .remove(&id)
            .ok_or(NetworkError::UnknownVertex(id))
    }

    /// Adds `additional` empty track slots to a vertex.
    pub fn expand_vertex(&mut self, id: VertexId, additional: usize) -> Result<(), NetworkError> {
        let vertex = self
            .vertices
            .get_mut(&id)
            .ok_or(NetworkError::UnknownVertex(id))?;
        vertex.expand(additional);
        tracing::debug!(vertex = id, degree = vertex.degree(), "Vertex expanded");
        Ok(())
    }

    /// Adds a track between two distinct vertices with free slots.
    pub fn add_track(
        &mut self,
        vertices: [VertexId; 2],
        shape: TrackShape,
    ) -> Result<TrackId, NetworkError> {
        if vertices[0] == vertices[1] {
            return Err(NetworkError::DegenerateTrack(vertices[0]));
        }
        for id in vertices {
            let vertex = self.vertex(id).ok_or(NetworkError::UnknownVertex(id))?;
            if vertex.is_closed() {
                return Err(NetworkError::NoFreeSlot(id));
            }
        }
        let id = self.next_track_id;
        let geometry = Track::construct_geometry(self, id, vertices, &shape)?;
        self.next_track_id += 1;
        for vertex in vertices {
            self.vertices
                .get_mut(&vertex)
                .ok_or(NetworkError::UnknownVertex(vertex))?
                .bind(id)?;
        }
        self.tracks.insert(id, Track::new(id, vertices, geometry));
        self.index_track(id);
        tracing::debug!(
            track = id,
            from = vertices[0],
            to = vertices[1],
            kind = %shape.kind(),
            "Track added"
        );
        Ok(id)
    }

    /// Replaces the variant of an existing track, keeping its endpoints and
    /// attached objects.
    pub fn reshape_track(&mut self, id: TrackId, shape: TrackShape) -> Result<(), NetworkError> {
        let vertices = self
            .track(id)
            .ok_or(NetworkError::UnknownTrack(id))?
            .vertices();
        let geometry = Track::construct_geometry(self, id, vertices, &shape)?;
        if let Some(track) = self.tracks.get_mut(&id) {
            track.set_geometry(geometry);
        }
        tracing::debug!(track = id, kind = %shape.kind(), "Track reshaped");
        Ok(())
    }

    /// Removes a track that carries no objects.
    pub fn remove_track(&mut self, id: TrackId) -> Result<Track, NetworkError> {
        let track = self.tracks.get(&id).ok_or(NetworkError::UnknownTrack(id))?;
        let count = track.object_count();
        if count > 0 {
            return Err(NetworkError::TrackHasObjects { track: id, count });
        }
        let vertices = track.vertices();
        self.unindex_track(id);
        for vertex in vertices {
            if let Some(v) = self.vertices.get_mut(&vertex) {
                v.unbind(id);
            }
        }
        tracing::debug!(track = id, "Track removed");
        self.tracks.remove(&id).ok_or(NetworkError::UnknownTrack(id))
    }

    /// Moves a vertex if every incident track accepts the new position.
    ///
    /// Either all incident tracks commit their new geometry together with
    /// the vertex position, or nothing changes.
    pub fn move_vertex(&mut self, id: VertexId, x: f64, y: f64) -> Result<(), NetworkError> {
        let vertex = self.vertex(id).ok_or(NetworkError::UnknownVertex(id))?;
        let target = Point2::new(x, y);
        if !self.contains(&target) {
            return Err(NetworkError::OutOfBounds { x, y });
        }
        let old_position = vertex.position();
        let incident: Vec<TrackId> = vertex.tracks().collect();

        let mut plans = Vec::with_capacity(incident.len());
        for &track_id in &incident {
            let track = self
                .track(track_id)
                .ok_or(NetworkError::UnknownTrack(track_id))?;
            match track.plan_vertex_change(self, id, target) {
                Some(geometry) => plans.push((track_id, geometry)),
                None => {
                    for t in incident.iter().filter_map(|t| self.track(*t)) {
                        t.vertices_not_updated();
                    }
                    tracing::warn!(vertex = id, track = track_id, x, y, "Vertex move rejected");
                    return Err(NetworkError::VertexMoveRejected {
                        vertex: id,
                        track: track_id,
                    });
                }
            }
        }

        for &track_id in &incident {
            self.unindex_track(track_id);
        }
        self.unindex_vertex(id, &old_position);
        if let Some(v) = self.vertices.get_mut(&id) {
            v.set_position(target);
        }
        self.index_vertex(id, &target);
        for (track_id, geometry) in plans {
            if let Some(track) = self.tracks.get_mut(&track_id) {
                track.vertices_updated(geometry);
            }
            self.index_track(track_id);
        }
        tracing::debug!(vertex = id, x, y, tracks = incident.len(), "Vertex moved");
        Ok(())
    }

    /// Attaches an object to a track and returns its new id.
    pub fn attach<P: TrackObjectPayload>(
        &mut self,
        track: TrackId,
        position: f64,
        orientation: Orientation,
        payload: P,
    ) -> Result<TrackObjectId, NetworkError> {
        let id = self.next_object_id;
        let object = TrackObject::new(id, track, position, orientation, payload)?;
        let target = self
            .tracks
            .get_mut(&track)
            .ok_or(NetworkError::UnknownTrack(track))?;
        P::objects_mut(target).push(object);
        self.next_object_id += 1;
        tracing::debug!(track, object = id, kind = P::KIND, position, "Track object attached");
        Ok(id)
    }

    /// Re-inserts a previously detached object under its original id.
    pub fn restore_object<P: TrackObjectPayload>(
        &mut self,
        object: TrackObject<P>,
    ) -> Result<(), NetworkError> {
        let target = self
            .tracks
            .get_mut(&object.track)
            .ok_or(NetworkError::UnknownTrack(object.track))?;
        let objects = P::objects_mut(target);
        let index = objects.partition_point(|o| o.id < object.id);
        self.next_object_id = self.next_object_id.max(object.id + 1);
        objects.insert(index, object);
        Ok(())
    }

    /// Detaches an object from a track.
    pub fn detach<P: TrackObjectPayload>(
        &mut self,
        track: TrackId,
        object: TrackObjectId,
    ) -> Result<TrackObject<P>, NetworkError> {
        let target = self
            .tracks
            .get_mut(&track)
            .ok_or(NetworkError::UnknownTrack(track))?;
        let objects = P::objects_mut(target);
        let index = objects
            .iter()
            .position(|o| o.id == object)
            .ok_or(NetworkError::UnknownTrackObject { track, object })?;
        tracing::debug!(track, object, kind = P::KIND, "Track object detached");
        Ok(objects.remove(index))
    }

    pub fn object<P: TrackObjectPayload>(
        &self,
        track: TrackId,
        object: TrackObjectId,
    ) -> Option<&TrackObject<P>> {
        self.track(track)
            .and_then(|t| P::objects(t).iter().find(|o| o.id == object))
    }

    pub fn object_mut<P: TrackObjectPayload>(
        &mut self,
        track: TrackId,
        object: TrackObjectId,
    ) -> Option<&mut TrackObject<P>> {
        self.tracks
            .get_mut(&track)
            .and_then(|t| P::objects_mut(t).iter_mut().find(|o| o.id == object))
    }

    /// Finds an object by id on any track.
    pub fn find_object<P: TrackObjectPayload>(
        &self,
        object: TrackObjectId,
    ) -> Option<&TrackObject<P>> {
        self.tracks
            .values()
            .find_map(|t| P::objects(t).iter().find(|o| o.id == object))
    }

    /// Appends a row or column of empty segments on `direction`.
    pub fn extend(&mut self, direction: Direction) {
        let (mut origin, mut columns, mut rows) = (self.origin, self.columns, self.rows);
        match direction {
            Direction::North => {
                origin.1 -= 1;
                rows += 1;
            }
            Direction::South => rows += 1,
            Direction::West => {
                origin.0 -= 1;
                columns += 1;
            }
            Direction::East => columns += 1,
        }
        self.regrid(origin, columns, rows);
        tracing::debug!(%direction, columns, rows, "World extended");
    }

    /// Removes the row or column on `direction` and returns its segments.
    ///
    /// Fails when a segment on that border is in use or when the world
    /// would lose its last row or column.
    pub fn shrink(&mut self, direction: Direction) -> Result<Vec<Segment>, WorldError> {
        let border = self.border_indices(direction);
        let size = match direction {
            Direction::North | Direction::South => self.rows,
            Direction::East | Direction::West => self.columns,
        };
        if size <= 1 {
            return Err(WorldError::MinimumSize {
                border: direction.to_string(),
            });
        }
        if let Some((column, row)) = border
            .iter()
            .copied()
            .find(|(c, r)| self.segment(*c, *r).is_some_and(Segment::is_in_use))
        {
            return Err(WorldError::BorderInUse {
                border: direction.to_string(),
                column,
                row,
            });
        }
        let (mut origin, mut columns, mut rows) = (self.origin, self.columns, self.rows);
        match direction {
            Direction::North => {
                origin.1 += 1;
                rows -= 1;
            }
            Direction::South => rows -= 1,
            Direction::West => {
                origin.0 += 1;
                columns -= 1;
            }
            Direction::East => columns -= 1,
        }
        let removed = self.regrid(origin, columns, rows);
        tracing::debug!(%direction, columns, rows, "World shrunk");
        Ok(removed)
    }

    /// Re-adds a border removed by [`World::shrink`], restoring its segments.
    pub fn restore_border(&mut self, direction: Direction, segments: Vec<Segment>) {
        self.extend(direction);
        for segment in segments {
            let column = segment.column() - self.origin.0;
            let row = segment.row() - self.origin.1;
            if column < 0 || row < 0 {
                continue;
            }
            if let Some(index) = self.slot(column as usize, row as usize) {
                self.segments[index] = segment;
            }
        }
    }

    /// Grid indices of the segments on a border.
    fn border_indices(&self, direction: Direction) -> Vec<(usize, usize)> {
        match direction {
            Direction::North => (0..self.columns).map(|c| (c, 0)).collect(),
            Direction::South => (0..self.columns).map(|c| (c, self.rows - 1)).collect(),
            Direction::West => (0..self.rows).map(|r| (0, r)).collect(),
            Direction::East => (0..self.rows).map(|r| (self.columns - 1, r)).collect(),
        }
    }

    /// Rebuilds the grid for a new origin and size, keeping segments by
    /// absolute coordinates. Returns the segments that fell outside.
    fn regrid(&mut self, origin: (i64, i64), columns: usize, rows: usize) -> Vec<Segment> {
        let mut old: BTreeMap<(i64, i64), Segment> = std::mem::take(&mut self.segments)
            .into_iter()
            .map(|s| ((s.row(), s.column()), s))
            .collect();
        let mut segments = Vec::with_capacity(columns * rows);
        for row in origin.1..origin.1 + rows as i64 {
            for column in origin.0..origin.0 + columns as i64 {
                let segment = old
                    .remove(&(row, column))
                    .unwrap_or_else(|| Segment::new(column, row));
                segments.push(segment);
            }
        }
        self.origin = origin;
        self.columns = columns;
        self.rows = rows;
        self.segments = segments;
        old.into_values().collect()
    }

    /// Vertices with exactly one bound track.
    pub fn free_ends(&self) -> Vec<VertexId> {
        self.vertices
            .values()
            .filter(|v| v.is_free_end())
            .map(Vertex::id)
            .collect()
    }

    /// Closest vertex within `radius` of `p`.
    pub fn nearest_vertex(&self, p: &Point2, radius: f64) -> Option<VertexId> {
        self.vertices
            .values()
            .map(|v| (v.id(), (v.position() - p).norm()))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Verifies back-references, cached endpoints and segment membership.
    ///
    /// Returns every violation found.
    pub fn check_consistency(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();

        for vertex in self.vertices.values() {
            for track_id in vertex.tracks() {
                match self.tracks.get(&track_id) {
                    Some(track) if track.index_of(vertex.id()).is_some() => {}
                    Some(_) => issues.push(format!(
                        "vertex {} references track {} which does not reference it back",
                        vertex.id(),
                        track_id
                    )),
                    None => issues.push(format!(
                        "vertex {} references missing track {}",
                        vertex.id(),
                        track_id
                    )),
                }
            }
        }

        let mut expected_vertices: BTreeMap<(usize, usize), BTreeSet<VertexId>> = BTreeMap::new();
        let mut expected_tracks: BTreeMap<(usize, usize), BTreeSet<TrackId>> = BTreeMap::new();
        for vertex in self.vertices.values() {
            match self.segment_index_at(&vertex.position()) {
                Some(index) => {
                    expected_vertices.entry(index).or_default().insert(vertex.id());
                }
                None => issues.push(format!("vertex {} is outside the world", vertex.id())),
            }
        }

        for track in self.tracks.values() {
            let ends = track.geometry().ends();
            for (i, vertex_id) in track.vertices().into_iter().enumerate() {
                let Some(vertex) = self.vertices.get(&vertex_id) else {
                    issues.push(format!(
                        "track {} references missing vertex {}",
                        track.id(),
                        vertex_id
                    ));
                    continue;
                };
                if vertex.tracks().filter(|t| *t == track.id()).count() != 1 {
                    issues.push(format!(
                        "track {} is not bound exactly once to vertex {}",
                        track.id(),
                        vertex_id
                    ));
                }
                if (vertex.position() - ends[i]).norm() > 1e-9 {
                    issues.push(format!(
                        "track {} endpoint {} is out of sync with vertex {}",
                        track.id(),
                        i,
                        vertex_id
                    ));
                }
                if let Some(index) = self.segment_index_at(&vertex.position()) {
                    expected_tracks.entry(index).or_default().insert(track.id());
                }
            }
            let misplaced = track
                .platforms()
                .iter()
                .map(|o| o.track)
                .chain(track.vehicles().iter().map(|o| o.track))
                .any(|t| t != track.id());
            if misplaced {
                issues.push(format!(
                    "track {} carries an object owned by another track",
                    track.id()
                ));
            }
        }

        for row in 0..self.rows {
            for column in 0..self.columns {
                let Some(segment) = self.segment(column, row) else {
                    continue;
                };
                let index = (column, row);
                let vertices = expected_vertices.remove(&index).unwrap_or_default();
                let tracks = expected_tracks.remove(&index).unwrap_or_default();
                if segment.vertices() != &vertices || segment.tracks() != &tracks {
                    issues.push(format!(
                        "segment ({column}, {row}) membership is out of sync"
                    ));
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track_object::Platform;

    fn platform(name: &str) -> Platform {
        Platform {
            name: name.to_string(),
            stop: None,
            length: 40.0,
        }
    }

    #[test]
    fn test_add_vertices_and_track() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(0.0, 0.0).unwrap();
        let b = world.add_vertex(10.0, 0.0).unwrap();
        let t = world.add_track([a, b], TrackShape::Straight).unwrap();
        assert_eq!(world.vertex(a).unwrap().tracks().collect::<Vec<_>>(), vec![t]);
        assert_eq!(world.free_ends(), vec![a, b]);
        assert_eq!(world.segment_usage(), vec![(0, 0)]);
        assert!(world.check_consistency().is_ok());
    }

    #[test]
    fn test_add_vertex_out_of_bounds() {
        let mut world = World::new(1, 1);
        assert!(matches!(
            world.add_vertex(1000.0, 5.0),
            Err(NetworkError::OutOfBounds { .. })
        ));
        assert!(matches!(
            world.add_vertex(-0.5, 5.0),
            Err(NetworkError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_add_track_errors() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(0.0, 0.0).unwrap();
        let b = world.add_vertex(10.0, 0.0).unwrap();
        let c = world.add_vertex(20.0, 0.0).unwrap();
        let d = world.add_vertex(30.0, 0.0).unwrap();
        assert_eq!(
            world.add_track([a, a], TrackShape::Straight),
            Err(NetworkError::DegenerateTrack(a))
        );
        assert_eq!(
            world.add_track([a, 99], TrackShape::Straight),
            Err(NetworkError::UnknownVertex(99))
        );
        world.add_track([a, b], TrackShape::Straight).unwrap();
        world.add_track([b, c], TrackShape::Straight).unwrap();
        let before = world.clone();
        assert_eq!(
            world.add_track([b, d], TrackShape::Straight),
            Err(NetworkError::NoFreeSlot(b))
        );
        assert_eq!(world, before);
        world.expand_vertex(b, 1).unwrap();
        assert!(world.add_track([b, d], TrackShape::Straight).is_ok());
    }

    #[test]
    fn test_remove_guards() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(0.0, 0.0).unwrap();
        let b = world.add_vertex(10.0, 0.0).unwrap();
        let t = world.add_track([a, b], TrackShape::Straight).unwrap();
        assert_eq!(world.remove_vertex(a), Err(NetworkError::VertexInUse(a)));
        let object = world
            .attach(t, 0.5, Orientation::Forward, platform("P1"))
            .unwrap();
        assert_eq!(
            world.remove_track(t),
            Err(NetworkError::TrackHasObjects { track: t, count: 1 })
        );
        world.detach::<Platform>(t, object).unwrap();
        world.remove_track(t).unwrap();
        world.remove_vertex(a).unwrap();
        assert!(world.vertex(b).unwrap().is_open());
        assert!(world.check_consistency().is_ok());
    }

    #[test]
    fn test_move_vertex_updates_tracks_and_segments() {
        let mut world = World::new(2, 1);
        let a = world.add_vertex(100.0, 100.0).unwrap();
        let b = world.add_vertex(200.0, 100.0).unwrap();
        let t = world.add_track([a, b], TrackShape::Straight).unwrap();
        world.move_vertex(b, 1500.0, 100.0).unwrap();
        let track = world.track(t).unwrap();
        assert!((track.length() - 1400.0).abs() < 1e-9);
        assert!(world.segment(1, 0).unwrap().tracks().contains(&t));
        assert!(world.segment(1, 0).unwrap().vertices().contains(&b));
        assert!(!world.segment(0, 0).unwrap().vertices().contains(&b));
        assert!(world.check_consistency().is_ok());
    }

    #[test]
    fn test_rejected_move_leaves_world_unchanged() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(100.0, 100.0).unwrap();
        let b = world.add_vertex(200.0, 100.0).unwrap();
        let c = world.add_vertex(200.0, 300.0).unwrap();
        let t1 = world.add_track([a, b], TrackShape::Straight).unwrap();
        world.add_track([b, c], TrackShape::Straight).unwrap();
        let before = world.clone();
        // Moving b onto c collapses the second track.
        let err = world.move_vertex(b, 200.0, 300.0).unwrap_err();
        assert!(matches!(err, NetworkError::VertexMoveRejected { vertex, .. } if vertex == b));
        assert_eq!(world, before);
        assert!((world.track(t1).unwrap().length() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_extend_and_shrink_east() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(0.0, 0.0).unwrap();
        let b = world.add_vertex(10.0, 0.0).unwrap();
        world.add_track([a, b], TrackShape::Straight).unwrap();
        let before = world.clone();
        world.extend(Direction::East);
        assert_eq!((world.columns(), world.rows()), (2, 1));
        let removed = world.shrink(Direction::East).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(world, before);
    }

    #[test]
    fn test_extend_north_keeps_coordinates() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(50.0, 50.0).unwrap();
        world.extend(Direction::North);
        assert_eq!(world.origin(), (0, -1));
        assert_eq!(world.vertex(a).unwrap().position(), Point2::new(50.0, 50.0));
        assert_eq!(world.segment_index_at(&Point2::new(50.0, 50.0)), Some((0, 1)));
        assert!(world.add_vertex(50.0, -500.0).is_ok());
        assert!(world.check_consistency().is_ok());
    }

    #[test]
    fn test_shrink_guards() {
        let mut world = World::new(1, 1);
        assert!(matches!(
            world.shrink(Direction::West),
            Err(WorldError::MinimumSize { .. })
        ));
        world.extend(Direction::West);
        world.add_vertex(-10.0, 10.0).unwrap();
        assert_eq!(
            world.shrink(Direction::West),
            Err(WorldError::BorderInUse {
                border: "west".to_string(),
                column: 0,
                row: 0
            })
        );
        assert!(world.shrink(Direction::East).is_ok());
    }

    #[test]
    fn test_restore_border_keeps_background() {
        let mut world = World::new(2, 1);
        world
            .set_segment_background(1, 0, Some("east.png".into()))
            .unwrap();
        let before = world.clone();
        let removed = world.shrink(Direction::East).unwrap();
        world.restore_border(Direction::East, removed);
        assert_eq!(world, before);
    }

    #[test]
    fn test_restore_object_keeps_id() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(0.0, 0.0).unwrap();
        let b = world.add_vertex(10.0, 0.0).unwrap();
        let t = world.add_track([a, b], TrackShape::Straight).unwrap();
        let id = world
            .attach(t, 0.25, Orientation::Backward, platform("P1"))
            .unwrap();
        let before = world.clone();
        let object = world.detach::<Platform>(t, id).unwrap();
        world.restore_object(object).unwrap();
        assert_eq!(world, before);
        let restored = world.object::<Platform>(t, id).unwrap();
        assert_eq!(restored.position(), 0.25);
        assert_eq!(restored.orientation, Orientation::Backward);
    }

    #[test]
    fn test_nearest_vertex() {
        let mut world = World::new(1, 1);
        let a = world.add_vertex(0.0, 0.0).unwrap();
        let b = world.add_vertex(10.0, 0.0).unwrap();
        assert_eq!(world.nearest_vertex(&Point2::new(8.0, 1.0), 5.0), Some(b));
        assert_eq!(world.nearest_vertex(&Point2::new(1.0, 1.0), 5.0), Some(a));
        assert_eq!(world.nearest_vertex(&Point2::new(500.0, 500.0), 5.0), None);
    }
}
