//! # TransitKit Scene
//!
//! The camera/scene snapshot pipeline. The UI side owns the camera and
//! publishes immutable snapshots; the model side rebuilds network
//! snapshots; both meet in the [`SceneManager`], from which the
//! [`Renderer`] paints through the render streams.

pub mod camera;
pub mod error;
pub mod painter;
pub mod renderer;
pub mod scene;
pub mod snapshot;
pub mod streams;
pub mod updater;

pub use camera::{CameraController, CameraModel, CameraModelSnapshot, WorldRect};
pub use error::{SceneError, SceneResult};
pub use painter::{Color, DrawCall, Painter, RecordingPainter, Stroke, SvgPainter};
pub use renderer::{RenderStats, Renderer};
pub use scene::{ResourceKey, SceneManager, SceneResource, SceneResources};
pub use snapshot::{
    NetworkSnapshot, ObjectSnapshot, SegmentSnapshot, SegmentsSnapshot, SelectionSnapshot,
    TrackSnapshot, VertexSnapshot,
};
pub use streams::{default_streams, Frame, RenderStream, RenderStyle};
pub use updater::SceneUpdater;
