use super::{Frame, RenderStream};
use crate::painter::Painter;
use crate::scene::ResourceKey;

/// Track centre lines and vertex markers of either the committed or the
/// editable network.
#[derive(Debug, Clone, Copy)]
pub struct TrackStream {
    key: ResourceKey,
}

impl TrackStream {
    pub fn committed() -> Self {
        Self {
            key: ResourceKey::Network,
        }
    }

    /// The network staged by the active edit tool.
    pub fn editable() -> Self {
        Self {
            key: ResourceKey::EditableNetwork,
        }
    }
}

impl RenderStream for TrackStream {
    fn name(&self) -> &'static str {
        match self.key {
            ResourceKey::EditableNetwork => "editable-tracks",
            _ => "tracks",
        }
    }

    fn paint(&self, frame: &Frame<'_>, painter: &mut dyn Painter) {
        let editable = self.key == ResourceKey::EditableNetwork;
        let network = if editable {
            frame.resources.editable_network()
        } else {
            frame.resources.network()
        };
        let Some(network) = network else {
            return;
        };
        let style = frame.style;
        let stroke = if editable {
            &style.editable_track
        } else {
            &style.track
        };
        let margin = stroke.width * frame.camera.meters_per_pixel();
        let visible = frame.camera.visible_world_rect().inflated(margin);

        for track in network.tracks.iter().filter(|t| t.bounds.intersects(&visible)) {
            painter.polyline(&frame.to_pixels(&track.polyline), stroke);
        }
        for vertex in network.vertices.iter().filter(|v| visible.contains(&v.position)) {
            // Committed vertices only show free ends.
            let fill = if vertex.is_free_end() {
                style.free_end
            } else if editable {
                style.vertex
            } else {
                continue;
            };
            painter.circle(frame.to_pixel(&vertex.position), style.vertex_radius, fill, None);
        }
    }
}
