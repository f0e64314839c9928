//! Render streams: stateless per-frame visitors over the committed scene.
//!
//! Streams paint in the fixed order of [`default_streams`]. A stream whose
//! snapshot is absent paints nothing.

mod bitmaps;
mod grid;
mod labels;
mod objects;
mod selection;
mod tracks;

pub use bitmaps::BitmapStream;
pub use grid::GridStream;
pub use labels::LabelStream;
pub use objects::{TrackObjectStream, VehicleStream};
pub use selection::SelectionStream;
pub use tracks::TrackStream;

use transitkit_network::Point2;

use crate::camera::CameraModelSnapshot;
use crate::painter::{Color, Painter, Stroke};
use crate::scene::SceneResources;

/// Colours and sizes used by the streams.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub grid: Stroke,
    pub segment_in_use: Color,
    pub track: Stroke,
    pub editable_track: Stroke,
    pub vertex: Color,
    pub free_end: Color,
    /// Vertex marker radius in pixels.
    pub vertex_radius: f64,
    pub platform: Stroke,
    pub vehicle: Color,
    pub vehicle_radius: f64,
    pub label: Color,
    pub label_size: f64,
    /// Labels are hidden when zoomed out further than this.
    pub label_max_meters_per_pixel: f64,
    pub selection: Stroke,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            grid: Stroke::solid(Color::rgb(200, 200, 200), 1.0),
            segment_in_use: Color::rgba(120, 160, 220, 24),
            track: Stroke::solid(Color::rgb(60, 60, 60), 3.0),
            editable_track: Stroke::dashed(Color::rgb(30, 120, 255), 3.0),
            vertex: Color::rgb(60, 60, 60),
            free_end: Color::rgb(220, 60, 40),
            vertex_radius: 3.0,
            platform: Stroke::solid(Color::rgb(30, 140, 60), 6.0),
            vehicle: Color::rgb(240, 170, 0),
            vehicle_radius: 5.0,
            label: Color::BLACK,
            label_size: 11.0,
            label_max_meters_per_pixel: 2.0,
            selection: Stroke::solid(Color::rgba(255, 120, 0, 200), 5.0),
        }
    }
}

/// Everything a stream may read while painting one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub resources: &'a SceneResources,
    pub camera: &'a CameraModelSnapshot,
    pub style: &'a RenderStyle,
}

impl Frame<'_> {
    pub fn to_pixel(&self, p: &Point2) -> (f64, f64) {
        self.camera.world_to_pixel(p)
    }

    pub fn to_pixels(&self, points: &[Point2]) -> Vec<(f64, f64)> {
        points.iter().map(|p| self.to_pixel(p)).collect()
    }
}

pub trait RenderStream: Send + Sync {
    /// Layer name, also used as the SVG group id.
    fn name(&self) -> &'static str;

    fn paint(&self, frame: &Frame<'_>, painter: &mut dyn Painter);
}

/// Grid, bitmaps, tracks, editable tracks, track objects, vehicles,
/// labels, selection.
pub fn default_streams() -> Vec<Box<dyn RenderStream>> {
    vec![
        Box::new(GridStream),
        Box::new(BitmapStream),
        Box::new(TrackStream::committed()),
        Box::new(TrackStream::editable()),
        Box::new(TrackObjectStream),
        Box::new(VehicleStream),
        Box::new(LabelStream),
        Box::new(SelectionStream),
    ]
}
