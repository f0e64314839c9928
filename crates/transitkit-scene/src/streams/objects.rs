use super::{Frame, RenderStream};
use crate::painter::Painter;

/// Platforms, drawn as bars along their track.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackObjectStream;

impl RenderStream for TrackObjectStream {
    fn name(&self) -> &'static str {
        "track-objects"
    }

    fn paint(&self, frame: &Frame<'_>, painter: &mut dyn Painter) {
        let Some(network) = frame.resources.network() else {
            return;
        };
        let visible = frame.camera.visible_world_rect();
        for platform in network.platforms.iter().filter(|p| visible.contains(&p.position)) {
            let half = platform.heading * (platform.length / 2.0);
            let from = frame.to_pixel(&(platform.position - half));
            let to = frame.to_pixel(&(platform.position + half));
            painter.line(from, to, &frame.style.platform);
        }
    }
}

/// Vehicles with a short heading tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct VehicleStream;

impl RenderStream for VehicleStream {
    fn name(&self) -> &'static str {
        "vehicles"
    }

    fn paint(&self, frame: &Frame<'_>, painter: &mut dyn Painter) {
        let Some(network) = frame.resources.network() else {
            return;
        };
        let style = frame.style;
        let visible = frame.camera.visible_world_rect();
        for vehicle in network.vehicles.iter().filter(|v| visible.contains(&v.position)) {
            let center = frame.to_pixel(&vehicle.position);
            painter.circle(center, style.vehicle_radius, style.vehicle, None);
            let tip = (
                center.0 + vehicle.heading.x * style.vehicle_radius * 2.0,
                center.1 + vehicle.heading.y * style.vehicle_radius * 2.0,
            );
            painter.line(center, tip, &style.track);
        }
    }
}
