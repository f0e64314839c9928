//! Network vertices.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use transitkit_core::constants::DEFAULT_VERTEX_DEGREE;
use transitkit_core::NetworkError;

use crate::geometry::Point2;

/// Identifier of a vertex. Live vertices have positive ids.
pub type VertexId = i64;

/// Identifier of a track. Live tracks have positive ids.
pub type TrackId = i64;

/// Inline capacity of the slot array; vertices with more slots spill to the heap.
const INLINE_SLOTS: usize = 4;

/// A junction point of the network with a fixed number of track slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    id: VertexId,
    position: Point2,
    slots: SmallVec<[Option<TrackId>; INLINE_SLOTS]>,
}

impl Vertex {
    /// Creates a vertex with the default degree.
    pub fn new(id: VertexId, x: f64, y: f64) -> Self {
        Self::with_degree(id, x, y, DEFAULT_VERTEX_DEGREE)
    }

    pub fn with_degree(id: VertexId, x: f64, y: f64, degree: usize) -> Self {
        Self {
            id,
            position: Point2::new(x, y),
            slots: SmallVec::from_elem(None, degree.max(1)),
        }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn position(&self) -> Point2 {
        self.position
    }

    /// Number of track slots.
    pub fn degree(&self) -> usize {
        self.slots.len()
    }

    /// Number of filled slots.
    pub fn track_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Exactly one track is bound; the vertex may be extended.
    pub fn is_free_end(&self) -> bool {
        self.track_count() == 1
    }

    /// Every slot is filled.
    pub fn is_closed(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// At least one slot is free.
    pub fn is_open(&self) -> bool {
        !self.is_closed()
    }

    /// Bound track ids in slot order.
    pub fn tracks(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.slots.iter().filter_map(|s| *s)
    }

    pub fn slots(&self) -> &[Option<TrackId>] {
        &self.slots
    }

    pub fn has_track(&self, track: TrackId) -> bool {
        self.slots.contains(&Some(track))
    }

    /// Adds `additional` empty slots.
    pub fn expand(&mut self, additional: usize) {
        self.slots
            .extend(std::iter::repeat(None).take(additional));
    }

    pub(crate) fn set_position(&mut self, position: Point2) {
        self.position = position;
    }

    /// Binds `track` to the first free slot.
    pub(crate) fn bind(&mut self, track: TrackId) -> Result<(), NetworkError> {
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(track);
                Ok(())
            }
            None => Err(NetworkError::NoFreeSlot(self.id)),
        }
    }

    /// Clears the slot holding `track`. Returns whether it was bound.
    pub(crate) fn unbind(&mut self, track: TrackId) -> bool {
        match self.slots.iter_mut().find(|s| **s == Some(track)) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vertex_is_open() {
        let v = Vertex::new(1, 10.0, 20.0);
        assert_eq!(v.degree(), DEFAULT_VERTEX_DEGREE);
        assert_eq!(v.track_count(), 0);
        assert!(v.is_open());
        assert!(!v.is_closed());
        assert!(!v.is_free_end());
    }

    #[test]
    fn test_bind_until_closed() {
        let mut v = Vertex::new(1, 0.0, 0.0);
        v.bind(7).unwrap();
        assert!(v.is_free_end());
        v.bind(8).unwrap();
        assert!(v.is_closed());
        assert_eq!(v.bind(9), Err(NetworkError::NoFreeSlot(1)));
        assert_eq!(v.tracks().collect::<Vec<_>>(), vec![7, 8]);
    }

    #[test]
    fn test_expand_and_unbind() {
        let mut v = Vertex::new(1, 0.0, 0.0);
        v.bind(7).unwrap();
        v.bind(8).unwrap();
        v.expand(1);
        assert_eq!(v.degree(), 3);
        v.bind(9).unwrap();
        assert!(v.unbind(8));
        assert!(!v.unbind(8));
        assert_eq!(v.slots(), &[Some(7), None, Some(9)]);
        assert!(v.is_open());
    }
}
