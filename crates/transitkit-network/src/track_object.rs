//! Objects placed along tracks: platforms and vehicles.

use serde::{Deserialize, Serialize};
use transitkit_core::NetworkError;

use crate::track::Track;
use crate::vertex::TrackId;

/// Identifier of a track object, unique within the world.
pub type TrackObjectId = i64;

/// Direction an object faces relative to the track's vertex order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Orientation {
    /// Facing from vertex 0 towards vertex 1.
    #[default]
    Forward,
    /// Facing from vertex 1 towards vertex 0.
    Backward,
}

impl Orientation {
    pub fn reversed(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Backward,
            Orientation::Backward => Orientation::Forward,
        }
    }
}

/// An object located at a relative position along a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackObject<P> {
    pub id: TrackObjectId,
    pub track: TrackId,
    position: f64,
    pub orientation: Orientation,
    pub payload: P,
}

impl<P> TrackObject<P> {
    pub fn new(
        id: TrackObjectId,
        track: TrackId,
        position: f64,
        orientation: Orientation,
        payload: P,
    ) -> Result<Self, NetworkError> {
        check_position(position)?;
        Ok(Self {
            id,
            track,
            position,
            orientation,
            payload,
        })
    }

    /// Relative position in `[0, 1]` from vertex 0.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn set_position(&mut self, position: f64) -> Result<(), NetworkError> {
        check_position(position)?;
        self.position = position;
        Ok(())
    }
}

fn check_position(position: f64) -> Result<(), NetworkError> {
    if (0.0..=1.0).contains(&position) {
        Ok(())
    } else {
        Err(NetworkError::InvalidTrackPosition(position))
    }
}

/// A platform where vehicles stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    /// Stop this platform belongs to, if any.
    pub stop: Option<u64>,
    /// Platform length in metres.
    pub length: f64,
}

/// A vehicle standing on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePlacement {
    pub vehicle: u64,
}

/// Payload types that tracks keep a collection of.
pub trait TrackObjectPayload: Clone + Sized {
    /// Name used in logs and errors.
    const KIND: &'static str;

    fn objects(track: &Track) -> &Vec<TrackObject<Self>>;

    fn objects_mut(track: &mut Track) -> &mut Vec<TrackObject<Self>>;
}

impl TrackObjectPayload for Platform {
    const KIND: &'static str = "platform";

    fn objects(track: &Track) -> &Vec<TrackObject<Self>> {
        &track.platforms
    }

    fn objects_mut(track: &mut Track) -> &mut Vec<TrackObject<Self>> {
        &mut track.platforms
    }
}

impl TrackObjectPayload for VehiclePlacement {
    const KIND: &'static str = "vehicle";

    fn objects(track: &Track) -> &Vec<TrackObject<Self>> {
        &track.vehicles
    }

    fn objects_mut(track: &mut Track) -> &mut Vec<TrackObject<Self>> {
        &mut track.vehicles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_range() {
        let platform = Platform {
            name: "P1".into(),
            stop: None,
            length: 50.0,
        };
        assert!(TrackObject::new(1, 1, 0.5, Orientation::Forward, platform.clone()).is_ok());
        assert_eq!(
            TrackObject::new(1, 1, 1.5, Orientation::Forward, platform).unwrap_err(),
            NetworkError::InvalidTrackPosition(1.5)
        );
    }

    #[test]
    fn test_orientation_reversed() {
        assert_eq!(Orientation::Forward.reversed(), Orientation::Backward);
        assert_eq!(Orientation::default(), Orientation::Forward);
    }
}
