use super::{Frame, RenderStream};
use crate::painter::{Painter, Stroke};

/// Highlight of selected tracks, vertices and objects plus the rubber band.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectionStream;

impl RenderStream for SelectionStream {
    fn name(&self) -> &'static str {
        "selection"
    }

    fn paint(&self, frame: &Frame<'_>, painter: &mut dyn Painter) {
        let Some(selection) = frame.resources.selection() else {
            return;
        };
        let stroke = &frame.style.selection;
        if let Some(network) = frame.resources.network() {
            for track in selection.tracks.iter().filter_map(|id| network.track(*id)) {
                painter.polyline(&frame.to_pixels(&track.polyline), stroke);
            }
            for vertex in selection.vertices.iter().filter_map(|id| network.vertex(*id)) {
                painter.circle(
                    frame.to_pixel(&vertex.position),
                    frame.style.vertex_radius * 2.0,
                    stroke.color,
                    None,
                );
            }
            let objects = network.platforms.iter().chain(&network.vehicles);
            for object in objects.filter(|o| selection.objects.contains(&o.id)) {
                painter.circle(
                    frame.to_pixel(&object.position),
                    frame.style.vehicle_radius * 1.5,
                    stroke.color,
                    None,
                );
            }
        }
        if let Some(rect) = &selection.rect {
            painter.rect(
                frame.to_pixel(&rect.min),
                frame.to_pixel(&rect.max),
                None,
                Some(&Stroke::dashed(stroke.color, 1.0)),
            );
        }
    }
}
