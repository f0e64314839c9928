//! Spatial buckets of the world grid.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vertex::{TrackId, VertexId};

/// A border of the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// One `SEGMENT_SIZE` x `SEGMENT_SIZE` cell of the world.
///
/// `column` and `row` are absolute grid coordinates; they stay the same when
/// the world grows or shrinks at its north or west border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    column: i64,
    row: i64,
    background: Option<String>,
    pub(crate) vertices: BTreeSet<VertexId>,
    pub(crate) tracks: BTreeSet<TrackId>,
}

impl Segment {
    pub fn new(column: i64, row: i64) -> Self {
        Self {
            column,
            row,
            background: None,
            vertices: BTreeSet::new(),
            tracks: BTreeSet::new(),
        }
    }

    pub fn column(&self) -> i64 {
        self.column
    }

    pub fn row(&self) -> i64 {
        self.row
    }

    /// Path of the background bitmap, if any.
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    /// Replaces the background and returns the previous one.
    pub fn set_background(&mut self, background: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.background, background)
    }

    pub fn vertices(&self) -> &BTreeSet<VertexId> {
        &self.vertices
    }

    pub fn tracks(&self) -> &BTreeSet<TrackId> {
        &self.tracks
    }

    /// Whether any vertex or track is located here.
    pub fn is_in_use(&self) -> bool {
        !self.vertices.is_empty() || !self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_usage() {
        let mut segment = Segment::new(0, 0);
        assert!(!segment.is_in_use());
        segment.tracks.insert(3);
        assert!(segment.is_in_use());
    }

    #[test]
    fn test_background_replace() {
        let mut segment = Segment::new(2, -1);
        assert_eq!(segment.set_background(Some("map.png".into())), None);
        assert_eq!(segment.background(), Some("map.png"));
        assert_eq!(segment.set_background(None), Some("map.png".into()));
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::North.to_string(), "north");
        assert_eq!(Direction::ALL.len(), 4);
    }
}
