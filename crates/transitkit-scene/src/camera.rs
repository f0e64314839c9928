//! Camera model, immutable camera snapshots and the UI-side controller.
//!
//! Screen and world share orientation: pixel (0, 0) is the top-left corner
//! of the viewport and world Y grows towards the south, like the segment
//! rows. Only the UI side mutates a [`CameraModel`]; everything else sees
//! [`CameraModelSnapshot`] copies.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use transitkit_core::constants::{
    DEFAULT_METERS_PER_PIXEL, MAX_METERS_PER_PIXEL, MIN_METERS_PER_PIXEL, SEGMENT_SIZE,
};
use transitkit_core::{AppEvent, CameraEvent, CameraSnapshotData, EventBus};
use transitkit_network::{Point2, World};

use crate::error::{SceneError, SceneResult};

/// Default zoom factor used by [`CameraController::zoom_in_at`].
pub const DEFAULT_ZOOM_STEP: f64 = 1.2;

/// Axis-aligned rectangle in world metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    pub min: Point2,
    pub max: Point2,
}

impl WorldRect {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self {
            min: Point2::new(min.x.min(max.x), min.y.min(max.y)),
            max: Point2::new(min.x.max(max.x), min.y.max(max.y)),
        }
    }

    /// Smallest rectangle enclosing `points`, `None` if empty.
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self::new(first, first), |rect, p| rect.expanded_to(p)))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &WorldRect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn intersection(&self, other: &WorldRect) -> Option<WorldRect> {
        self.intersects(other).then(|| WorldRect {
            min: Point2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        })
    }

    pub fn expanded_to(self, p: &Point2) -> Self {
        Self {
            min: Point2::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: Point2::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    /// Grows the rectangle by `margin` on every side.
    pub fn inflated(self, margin: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }
}

/// Mutable view transform owned by the UI side.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraModel {
    revision: u64,
    x: f64,
    y: f64,
    meters_per_pixel: f64,
    min_meters_per_pixel: f64,
    max_meters_per_pixel: f64,
    viewport_width: u32,
    viewport_height: u32,
    world: WorldRect,
}

impl CameraModel {
    /// Creates a camera for a viewport of the given pixel size looking at
    /// an empty world at the origin.
    pub fn new(viewport_width: u32, viewport_height: u32) -> SceneResult<Self> {
        check_viewport(viewport_width, viewport_height)?;
        Ok(Self {
            revision: 0,
            x: 0.0,
            y: 0.0,
            meters_per_pixel: DEFAULT_METERS_PER_PIXEL,
            min_meters_per_pixel: MIN_METERS_PER_PIXEL,
            max_meters_per_pixel: MAX_METERS_PER_PIXEL,
            viewport_width,
            viewport_height,
            world: WorldRect::new(Point2::origin(), Point2::new(SEGMENT_SIZE, SEGMENT_SIZE)),
        })
    }

    /// Replaces the allowed zoom range and clamps the current zoom into it.
    pub fn with_zoom_range(mut self, min: f64, max: f64) -> SceneResult<Self> {
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(SceneError::InvalidZoomRange { min, max });
        }
        self.min_meters_per_pixel = min;
        self.max_meters_per_pixel = max;
        self.meters_per_pixel = self.meters_per_pixel.clamp(min, max);
        self.clamp_position();
        Ok(self)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    pub fn meters_per_pixel(&self) -> f64 {
        self.meters_per_pixel
    }

    pub fn zoom_range(&self) -> (f64, f64) {
        (self.min_meters_per_pixel, self.max_meters_per_pixel)
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn world_bounds(&self) -> WorldRect {
        self.world
    }

    /// Moves the viewport's top-left corner to world `(x, y)`.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.clamp_position();
        self.touch();
    }

    /// Pans by a distance given in pixels.
    pub fn move_by_pixels(&mut self, dx: f64, dy: f64) {
        self.x += dx * self.meters_per_pixel;
        self.y += dy * self.meters_per_pixel;
        self.clamp_position();
        self.touch();
    }

    /// Sets the zoom, keeping the viewport centre fixed.
    pub fn set_zoom(&mut self, meters_per_pixel: f64) -> SceneResult<()> {
        let (cx, cy) = (
            f64::from(self.viewport_width) / 2.0,
            f64::from(self.viewport_height) / 2.0,
        );
        self.zoom_to(cx, cy, meters_per_pixel)
    }

    /// Zooms by `factor` keeping the world point under pixel `(px, py)`
    /// fixed. Factors above one zoom in.
    pub fn zoom_at(&mut self, px: f64, py: f64, factor: f64) -> SceneResult<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(SceneError::InvalidZoom(factor));
        }
        self.zoom_to(px, py, self.meters_per_pixel / factor)
    }

    fn zoom_to(&mut self, px: f64, py: f64, meters_per_pixel: f64) -> SceneResult<()> {
        if !(meters_per_pixel.is_finite() && meters_per_pixel > 0.0) {
            return Err(SceneError::InvalidZoom(meters_per_pixel));
        }
        let anchor = self.pixel_to_world(px, py);
        self.meters_per_pixel =
            meters_per_pixel.clamp(self.min_meters_per_pixel, self.max_meters_per_pixel);
        self.x = anchor.x - px * self.meters_per_pixel;
        self.y = anchor.y - py * self.meters_per_pixel;
        self.clamp_position();
        self.touch();
        Ok(())
    }

    pub fn resize_viewport(&mut self, width: u32, height: u32) -> SceneResult<()> {
        check_viewport(width, height)?;
        self.viewport_width = width;
        self.viewport_height = height;
        self.clamp_position();
        self.touch();
        Ok(())
    }

    /// Resizes the world keeping its top-left corner.
    pub fn set_world_size(&mut self, width: f64, height: f64) {
        let min = self.world.min;
        self.set_world_bounds(WorldRect::new(
            min,
            Point2::new(min.x + width.max(0.0), min.y + height.max(0.0)),
        ));
    }

    pub fn set_world_bounds(&mut self, bounds: WorldRect) {
        self.world = bounds;
        self.clamp_position();
        self.touch();
    }

    /// Adopts the bounds of `world`.
    pub fn fit_world(&mut self, world: &World) {
        let (min, max) = world.bounds();
        self.set_world_bounds(WorldRect::new(min, max));
    }

    /// Centres the viewport on world `(x, y)`.
    pub fn center_on(&mut self, x: f64, y: f64) {
        let (w, h) = self.visible_extent();
        self.x = x - w / 2.0;
        self.y = y - h / 2.0;
        self.clamp_position();
        self.touch();
    }

    pub fn pixel_to_world(&self, px: f64, py: f64) -> Point2 {
        Point2::new(
            self.x + px * self.meters_per_pixel,
            self.y + py * self.meters_per_pixel,
        )
    }

    /// Immutable copy of the current state.
    pub fn snapshot(&self) -> CameraModelSnapshot {
        CameraModelSnapshot {
            data: CameraSnapshotData {
                revision: self.revision,
                x: self.x,
                y: self.y,
                meters_per_pixel: self.meters_per_pixel,
                viewport_width: self.viewport_width,
                viewport_height: self.viewport_height,
                world_x: self.world.min.x,
                world_y: self.world.min.y,
                world_width: self.world.width(),
                world_height: self.world.height(),
            },
        }
    }

    fn visible_extent(&self) -> (f64, f64) {
        (
            f64::from(self.viewport_width) * self.meters_per_pixel,
            f64::from(self.viewport_height) * self.meters_per_pixel,
        )
    }

    // A viewport larger than the world is centred on it.
    fn clamp_position(&mut self) {
        let (w, h) = self.visible_extent();
        self.x = clamp_axis(self.x, w, self.world.min.x, self.world.width());
        self.y = clamp_axis(self.y, h, self.world.min.y, self.world.height());
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

fn check_viewport(width: u32, height: u32) -> SceneResult<()> {
    if width == 0 || height == 0 {
        return Err(SceneError::InvalidViewport { width, height });
    }
    Ok(())
}

fn clamp_axis(position: f64, visible: f64, world_min: f64, world_len: f64) -> f64 {
    if visible >= world_len {
        world_min - (visible - world_len) / 2.0
    } else {
        position.clamp(world_min, world_min + world_len - visible)
    }
}

/// Immutable camera state handed to the render thread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraModelSnapshot {
    data: CameraSnapshotData,
}

impl From<CameraSnapshotData> for CameraModelSnapshot {
    fn from(data: CameraSnapshotData) -> Self {
        Self { data }
    }
}

impl From<CameraModelSnapshot> for CameraSnapshotData {
    fn from(snapshot: CameraModelSnapshot) -> Self {
        snapshot.data
    }
}

impl CameraModelSnapshot {
    pub fn revision(&self) -> u64 {
        self.data.revision
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.data.x, self.data.y)
    }

    pub fn meters_per_pixel(&self) -> f64 {
        self.data.meters_per_pixel
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        (self.data.viewport_width, self.data.viewport_height)
    }

    pub fn world_bounds(&self) -> WorldRect {
        let min = Point2::new(self.data.world_x, self.data.world_y);
        WorldRect::new(
            min,
            Point2::new(min.x + self.data.world_width, min.y + self.data.world_height),
        )
    }

    pub fn pixel_to_world(&self, px: f64, py: f64) -> Point2 {
        Point2::new(
            self.data.x + px * self.data.meters_per_pixel,
            self.data.y + py * self.data.meters_per_pixel,
        )
    }

    pub fn world_to_pixel(&self, p: &Point2) -> (f64, f64) {
        (
            (p.x - self.data.x) / self.data.meters_per_pixel,
            (p.y - self.data.y) / self.data.meters_per_pixel,
        )
    }

    /// Converts a length in metres to pixels.
    pub fn to_pixels(&self, meters: f64) -> f64 {
        meters / self.data.meters_per_pixel
    }

    pub fn visible_world_rect(&self) -> WorldRect {
        let (w, h) = self.viewport_size();
        WorldRect::new(
            self.position(),
            self.pixel_to_world(f64::from(w), f64::from(h)),
        )
    }

    /// Absolute `(column, row)` of every world segment intersecting the
    /// visible rectangle, row-major.
    pub fn visible_segments(&self) -> Vec<(i64, i64)> {
        let Some(rect) = self.visible_world_rect().intersection(&self.world_bounds()) else {
            return Vec::new();
        };
        let world = self.world_bounds();
        let first = |v: f64| (v / SEGMENT_SIZE).floor() as i64;
        // The far edges are exclusive, except when they are the world edge.
        let last = |v: f64, edge: f64| {
            let index = (v / SEGMENT_SIZE).floor() as i64;
            if v >= edge || (v / SEGMENT_SIZE).fract() == 0.0 {
                index - 1
            } else {
                index
            }
        };
        let (c0, c1) = (first(rect.min.x), last(rect.max.x, world.max.x));
        let (r0, r1) = (first(rect.min.y), last(rect.max.y, world.max.y));
        (r0..=r1)
            .flat_map(|row| (c0..=c1).map(move |column| (column, row)))
            .collect()
    }
}

/// Owns the [`CameraModel`] on the UI side and publishes a snapshot after
/// every mutation.
#[derive(Debug)]
pub struct CameraController {
    model: CameraModel,
    zoom_step: f64,
    event_bus: Option<Arc<EventBus>>,
}

impl CameraController {
    pub fn new(model: CameraModel) -> Self {
        Self {
            model,
            zoom_step: DEFAULT_ZOOM_STEP,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Factor applied by one zoom-in or zoom-out step.
    pub fn with_zoom_step(mut self, step: f64) -> SceneResult<Self> {
        if !(step.is_finite() && step > 1.0) {
            return Err(SceneError::InvalidZoom(step));
        }
        self.zoom_step = step;
        Ok(self)
    }

    pub fn model(&self) -> &CameraModel {
        &self.model
    }

    pub fn snapshot(&self) -> CameraModelSnapshot {
        self.model.snapshot()
    }

    pub fn set_position(&mut self, x: f64, y: f64) -> CameraModelSnapshot {
        self.model.set_position(x, y);
        self.publish()
    }

    pub fn move_by_pixels(&mut self, dx: f64, dy: f64) -> CameraModelSnapshot {
        self.model.move_by_pixels(dx, dy);
        self.publish()
    }

    pub fn set_zoom(&mut self, meters_per_pixel: f64) -> SceneResult<CameraModelSnapshot> {
        self.model.set_zoom(meters_per_pixel)?;
        Ok(self.publish())
    }

    pub fn zoom_at(&mut self, px: f64, py: f64, factor: f64) -> SceneResult<CameraModelSnapshot> {
        self.model.zoom_at(px, py, factor)?;
        Ok(self.publish())
    }

    pub fn zoom_in_at(&mut self, px: f64, py: f64) -> SceneResult<CameraModelSnapshot> {
        self.zoom_at(px, py, self.zoom_step)
    }

    pub fn zoom_out_at(&mut self, px: f64, py: f64) -> SceneResult<CameraModelSnapshot> {
        self.zoom_at(px, py, 1.0 / self.zoom_step)
    }

    pub fn resize_viewport(&mut self, width: u32, height: u32) -> SceneResult<CameraModelSnapshot> {
        self.model.resize_viewport(width, height)?;
        Ok(self.publish())
    }

    pub fn set_world_bounds(&mut self, bounds: WorldRect) -> CameraModelSnapshot {
        self.model.set_world_bounds(bounds);
        self.publish()
    }

    pub fn fit_world(&mut self, world: &World) -> CameraModelSnapshot {
        self.model.fit_world(world);
        self.publish()
    }

    pub fn center_on(&mut self, x: f64, y: f64) -> CameraModelSnapshot {
        self.model.center_on(x, y);
        self.publish()
    }

    fn publish(&self) -> CameraModelSnapshot {
        let snapshot = self.model.snapshot();
        tracing::trace!(
            revision = snapshot.revision(),
            meters_per_pixel = snapshot.meters_per_pixel(),
            "Camera updated"
        );
        if let Some(bus) = &self.event_bus {
            bus.publish(AppEvent::Camera(CameraEvent::Updated(snapshot.into())));
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transitkit_core::EventFilter;

    fn camera() -> CameraModel {
        let mut camera = CameraModel::new(200, 100).unwrap();
        camera.set_world_size(4000.0, 3000.0);
        camera
    }

    #[test]
    fn test_pixel_world_round_trip() {
        let mut camera = camera();
        camera.set_position(100.0, 50.0);
        camera.set_zoom(2.0).unwrap();
        let snapshot = camera.snapshot();
        let p = snapshot.pixel_to_world(37.0, 81.0);
        let (px, py) = snapshot.world_to_pixel(&p);
        assert!((px - 37.0).abs() < 1e-9);
        assert!((py - 81.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_is_not_altered_by_later_mutation() {
        let mut camera = camera();
        let before = camera.snapshot();
        let copy = before;
        camera.move_by_pixels(50.0, 20.0);
        camera.set_zoom(3.0).unwrap();
        assert_eq!(before, copy);
        assert_eq!(before.position(), Point2::new(0.0, 0.0));
        assert_ne!(camera.snapshot(), before);
        assert!(camera.revision() > before.revision());
    }

    #[test]
    fn test_position_is_clamped_to_world() {
        let mut camera = camera();
        camera.set_position(-500.0, 10_000.0);
        assert_eq!(camera.position(), Point2::new(0.0, 2900.0));
        camera.set_zoom(100.0).unwrap();
        // 20 km wide viewport on a 4 km world is centred.
        assert_eq!(camera.position().x, -8000.0);
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut camera = camera();
        camera.set_position(1000.0, 1000.0);
        let anchor = camera.pixel_to_world(40.0, 30.0);
        camera.zoom_at(40.0, 30.0, 2.0).unwrap();
        assert_eq!(camera.meters_per_pixel(), 0.5);
        let after = camera.pixel_to_world(40.0, 30.0);
        assert!((after - anchor).norm() < 1e-9);
    }

    #[test]
    fn test_zoom_is_clamped_and_validated() {
        let mut camera = camera();
        camera.set_zoom(1e-6).unwrap();
        assert_eq!(camera.meters_per_pixel(), MIN_METERS_PER_PIXEL);
        assert!(matches!(
            camera.set_zoom(f64::NAN),
            Err(SceneError::InvalidZoom(_))
        ));
        assert!(camera.zoom_at(0.0, 0.0, 0.0).is_err());
        assert!(camera.resize_viewport(0, 10).is_err());
    }

    #[test]
    fn test_visible_segments() {
        let mut camera = camera();
        camera.set_position(900.0, 1500.0);
        let snapshot = camera.snapshot();
        // x 900..1100, y 1500..1600
        assert_eq!(snapshot.visible_segments(), vec![(0, 1), (1, 1)]);

        camera.set_position(1000.0, 0.0);
        let snapshot = camera.snapshot();
        assert_eq!(snapshot.visible_segments(), vec![(1, 0)]);
    }

    #[test]
    fn test_visible_segments_with_shifted_origin() {
        let mut camera = camera();
        camera.set_world_bounds(WorldRect::new(
            Point2::new(-1000.0, -1000.0),
            Point2::new(1000.0, 1000.0),
        ));
        camera.set_position(-1100.0, -1050.0);
        assert_eq!(camera.snapshot().visible_segments(), vec![(-1, -1)]);
    }

    #[test]
    fn test_controller_publishes_snapshots() {
        let bus = Arc::new(EventBus::new());
        let (_id, mut rx) = bus.subscribe_queue(EventFilter::All);
        let mut controller = CameraController::new(camera()).with_event_bus(bus);
        let snapshot = controller.center_on(2000.0, 1500.0);
        match rx.try_recv() {
            Ok(AppEvent::Camera(CameraEvent::Updated(data))) => {
                assert_eq!(CameraModelSnapshot::from(data), snapshot);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(snapshot.position(), Point2::new(1900.0, 1450.0));
    }
}
