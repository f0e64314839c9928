//! Error handling for TransitKit
//!
//! Provides the error taxonomy shared by every layer of the application:
//! - Validation errors (duplicate names, broken references) raised by managers
//! - Network errors (topology edits rejected by the track graph)
//! - World errors (resizing the segment grid)
//! - Integrity errors (memento bookkeeping broken during undo/redo)
//!
//! Validation, network and world errors are checked failures: the operation
//! that raised them has not been applied. Integrity errors indicate a bug.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Validation error raised by entity managers.
///
/// A command whose manager call fails with this error is treated as not
/// applied and is never pushed onto the history.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Another entity of the same kind already uses this name
    #[error("{entity} name '{name}' is already in use")]
    DuplicateName {
        /// The entity kind, e.g. "stop".
        entity: &'static str,
        /// The conflicting name.
        name: String,
    },

    /// A referenced entity does not exist
    #[error("{entity} references missing {target} {id}")]
    MissingReference {
        /// The referencing entity kind.
        entity: &'static str,
        /// The referenced entity kind.
        target: &'static str,
        /// The id that could not be resolved.
        id: u64,
    },

    /// The entity is still referenced by another entity
    #[error("{entity} {id} is still referenced by {referrer} {referrer_id}")]
    StillReferenced {
        /// The entity kind being removed.
        entity: &'static str,
        /// The id being removed.
        id: u64,
        /// The referencing entity kind.
        referrer: &'static str,
        /// The referencing id.
        referrer_id: u64,
    },

    /// No entity with this id exists
    #[error("{entity} {id} not found")]
    NotFound {
        /// The entity kind.
        entity: &'static str,
        /// The missing id.
        id: u64,
    },

    /// A field value is not acceptable
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// The field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Errors raised by topology edits of the track network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// No vertex with this id exists
    #[error("Unknown vertex {0}")]
    UnknownVertex(i64),

    /// No track with this id exists
    #[error("Unknown track {0}")]
    UnknownTrack(i64),

    /// No track object with this id exists on the track
    #[error("Unknown track object {object} on track {track}")]
    UnknownTrackObject {
        /// The track searched.
        track: i64,
        /// The missing object id.
        object: i64,
    },

    /// The vertex has no free slot for another track
    #[error("Vertex {0} has no free track slot")]
    NoFreeSlot(i64),

    /// The vertex still has tracks bound to it
    #[error("Vertex {0} still has bound tracks")]
    VertexInUse(i64),

    /// The track still carries track objects
    #[error("Track {track} still carries {count} track object(s)")]
    TrackHasObjects {
        /// The track.
        track: i64,
        /// Number of attached objects.
        count: usize,
    },

    /// A track cannot connect a vertex to itself
    #[error("Track endpoints must be distinct vertices (got {0} twice)")]
    DegenerateTrack(i64),

    /// An incident track refused the vertex move
    #[error("Move of vertex {vertex} rejected by track {track}")]
    VertexMoveRejected {
        /// The vertex that was to be moved.
        vertex: i64,
        /// The first track that voted no.
        track: i64,
    },

    /// The track geometry cannot be constructed
    #[error("Cannot construct geometry for track {track}: {reason}")]
    InvalidGeometry {
        /// The track id (negative for staged tracks).
        track: i64,
        /// Why construction failed.
        reason: String,
    },

    /// The position is outside the world
    #[error("Position ({x:.2}, {y:.2}) is outside the world")]
    OutOfBounds {
        /// X coordinate in metres.
        x: f64,
        /// Y coordinate in metres.
        y: f64,
    },

    /// A track object position is outside [0, 1]
    #[error("Track position {0} is outside [0, 1]")]
    InvalidTrackPosition(f64),

    /// A staged record references a vertex that is neither staged nor live
    #[error("Staged track {track} references unresolved vertex {vertex}")]
    UnresolvedVertex {
        /// The staged track.
        track: i64,
        /// The unresolved vertex id.
        vertex: i64,
    },

    /// The operation is not supported
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Errors raised when resizing the world grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    /// The border to remove still contains vertices or tracks
    #[error("Cannot shrink {border}: border segment ({column}, {row}) is in use")]
    BorderInUse {
        /// The border direction.
        border: String,
        /// Column of the first occupied segment.
        column: usize,
        /// Row of the first occupied segment.
        row: usize,
    },

    /// Shrinking would remove the last row or column
    #[error("Cannot shrink {border}: world must keep at least one row and column")]
    MinimumSize {
        /// The border direction.
        border: String,
    },

    /// The segment coordinate is outside the grid
    #[error("Segment ({column}, {row}) is outside the world")]
    UnknownSegment {
        /// Column.
        column: usize,
        /// Row.
        row: usize,
    },
}

/// Broken memento bookkeeping detected during undo/redo.
///
/// These are programmer errors. They are never caused by user input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrityError {
    /// The command has no memento to restore
    #[error("Command '{command}' has no memento for {what}")]
    MissingMemento {
        /// The command name.
        command: String,
        /// What the memento was for.
        what: String,
    },

    /// An entity expected to be live could not be found
    #[error("Command '{command}' could not find {entity} {id}")]
    EntityNotFound {
        /// The command name.
        command: String,
        /// The entity kind.
        entity: &'static str,
        /// The missing id.
        id: i64,
    },

    /// The command is not in a state that allows the transition
    #[error("Command '{command}' cannot {action} while {state}")]
    InvalidState {
        /// The command name.
        command: String,
        /// The attempted action.
        action: &'static str,
        /// The current state.
        state: String,
    },

    /// Restoring a memento was refused by the model
    #[error("Command '{command}' failed to restore state: {reason}")]
    RestoreFailed {
        /// The command name.
        command: String,
        /// The underlying failure.
        reason: String,
    },
}

/// Checked failure of a command's `execute`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// A manager rejected the change
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The track graph rejected the change
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The world grid rejected the change
    #[error(transparent)]
    World(#[from] WorldError),

    /// The command was executed twice
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

/// Errors returned by the history.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    /// There is nothing left to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// There is nothing left to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// The requested jump target is outside the retained entries
    #[error("History index {index} is out of range (0..={len})")]
    IndexOutOfRange {
        /// The requested cursor.
        index: usize,
        /// Number of retained entries.
        len: usize,
    },

    /// The command failed to execute and was not recorded
    #[error("Command failed: {0}")]
    Command(#[from] CommandError),

    /// Undo or redo failed; the history has been cleared
    #[error("History integrity failure: {0}")]
    Integrity(#[from] IntegrityError),
}

/// Errors returned by serial executors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// The executor thread has stopped accepting jobs
    #[error("Executor '{0}' is shut down")]
    ShutDown(String),

    /// The job panicked or dropped its reply channel
    #[error("Executor '{0}' dropped the reply")]
    ReplyDropped(String),

    /// The executor thread could not be spawned
    #[error("Failed to spawn executor '{name}': {reason}")]
    SpawnFailed {
        /// Thread name.
        name: String,
        /// OS error text.
        reason: String,
    },
}

/// Main error type for TransitKit
///
/// Unifies all layer errors for use at crate boundaries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network error
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// World error
    #[error(transparent)]
    World(#[from] WorldError),

    /// History error
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Executor error
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a message
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other(message.into())
    }
}

impl From<CommandError> for Error {
    fn from(err: CommandError) -> Self {
        Error::History(HistoryError::Command(err))
    }
}

/// Result type alias for TransitKit operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::DuplicateName {
            entity: "stop",
            name: "Central".to_string(),
        };
        assert_eq!(err.to_string(), "stop name 'Central' is already in use");

        let err = ValidationError::MissingReference {
            entity: "vehicle type",
            target: "mean of transport",
            id: 7,
        };
        assert_eq!(
            err.to_string(),
            "vehicle type references missing mean of transport 7"
        );
    }

    #[test]
    fn test_network_error_display() {
        let err = NetworkError::VertexMoveRejected { vertex: 3, track: 9 };
        assert_eq!(err.to_string(), "Move of vertex 3 rejected by track 9");

        let err = NetworkError::TrackHasObjects { track: 2, count: 1 };
        assert_eq!(err.to_string(), "Track 2 still carries 1 track object(s)");
    }

    #[test]
    fn test_command_error_conversion() {
        let err: CommandError = WorldError::MinimumSize {
            border: "east".to_string(),
        }
        .into();
        assert!(matches!(err, CommandError::World(_)));

        let err: HistoryError = err.into();
        assert!(matches!(err, HistoryError::Command(CommandError::World(_))));
    }

    #[test]
    fn test_error_from_command_error() {
        let err: Error = CommandError::Network(NetworkError::NoFreeSlot(1)).into();
        assert!(matches!(
            err,
            Error::History(HistoryError::Command(CommandError::Network(_)))
        ));
    }
}
