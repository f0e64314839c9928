//! Event type definitions for the event bus.
//!
//! Events are immutable value payloads. They are cloneable and serializable
//! so they can be logged or replayed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// World grid and segment usage events
    World(WorldEvent),
    /// Camera updates published by the UI side
    Camera(CameraEvent),
    /// Project lifecycle events
    Project(ProjectEvent),
    /// Command history events
    History(HistoryEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::World(_) => EventCategory::World,
            AppEvent::Camera(_) => EventCategory::Camera,
            AppEvent::Project(_) => EventCategory::Project,
            AppEvent::History(_) => EventCategory::History,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::World(e) => e.description(),
            AppEvent::Camera(e) => e.description(),
            AppEvent::Project(e) => e.description(),
            AppEvent::History(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// World grid events.
    World,
    /// Camera events.
    Camera,
    /// Project lifecycle events.
    Project,
    /// History events.
    History,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::World => write!(f, "World"),
            EventCategory::Camera => write!(f, "Camera"),
            EventCategory::Project => write!(f, "Project"),
            EventCategory::History => write!(f, "History"),
        }
    }
}

/// World-related events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// The set of segments holding vertices or tracks changed.
    SegmentUsageChanged {
        /// Number of segment columns.
        columns: usize,
        /// Number of segment rows.
        rows: usize,
        /// `(column, row)` of every segment currently in use.
        in_use: Vec<(usize, usize)>,
    },
}

impl WorldEvent {
    fn description(&self) -> String {
        match self {
            WorldEvent::SegmentUsageChanged {
                columns,
                rows,
                in_use,
            } => format!(
                "World {}x{}: {} segment(s) in use",
                columns,
                rows,
                in_use.len()
            ),
        }
    }
}

/// Plain camera state carried by camera events.
///
/// The scene crate wraps this in `CameraModelSnapshot`, which adds the
/// coordinate conversions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshotData {
    /// Monotonic revision of the camera model.
    pub revision: u64,
    /// World X of the viewport's top-left corner in metres.
    pub x: f64,
    /// World Y of the viewport's top-left corner in metres.
    pub y: f64,
    /// Zoom in metres per pixel.
    pub meters_per_pixel: f64,
    /// Viewport width in pixels.
    pub viewport_width: u32,
    /// Viewport height in pixels.
    pub viewport_height: u32,
    /// World X of the world's top-left corner in metres.
    pub world_x: f64,
    /// World Y of the world's top-left corner in metres.
    pub world_y: f64,
    /// World width in metres.
    pub world_width: f64,
    /// World height in metres.
    pub world_height: f64,
}

/// Camera events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CameraEvent {
    /// The camera model changed; carries the snapshot taken right after.
    Updated(CameraSnapshotData),
}

impl CameraEvent {
    fn description(&self) -> String {
        match self {
            CameraEvent::Updated(data) => format!(
                "Camera r{} at ({:.1}, {:.1}) {:.3} m/px",
                data.revision, data.x, data.y, data.meters_per_pixel
            ),
        }
    }
}

/// Project lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectEvent {
    /// A project was created or opened and replaced the current one.
    NewProject {
        /// Project name.
        name: String,
        /// Backing file, if the project was opened from disk.
        path: Option<PathBuf>,
    },
}

impl ProjectEvent {
    fn description(&self) -> String {
        match self {
            ProjectEvent::NewProject { name, path } => match path {
                Some(path) => format!("New project '{}' ({})", name, path.display()),
                None => format!("New project '{}'", name),
            },
        }
    }
}

/// Direction of a replayed history step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayDirection {
    /// The command was undone.
    Undo,
    /// The command was redone.
    Redo,
}

/// Command history events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// Entries were added, evicted, replayed or cleared.
    Changed {
        /// Number of undoable entries.
        past: usize,
        /// Number of redoable entries.
        future: usize,
    },
    /// A single command was undone or redone.
    CommandReplayed {
        /// Command name.
        name: String,
        /// Undo or redo.
        direction: ReplayDirection,
        /// Cursor after the step.
        cursor: usize,
    },
}

impl HistoryEvent {
    fn description(&self) -> String {
        match self {
            HistoryEvent::Changed { past, future } => {
                format!("History changed ({} past, {} future)", past, future)
            }
            HistoryEvent::CommandReplayed {
                name,
                direction,
                cursor,
            } => format!("{:?} '{}' -> cursor {}", direction, name, cursor),
        }
    }
}
