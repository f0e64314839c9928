use super::{Frame, RenderStream};
use crate::painter::Painter;

/// Platform names, hidden when zoomed far out.
#[derive(Debug, Default, Clone, Copy)]
pub struct LabelStream;

impl RenderStream for LabelStream {
    fn name(&self) -> &'static str {
        "labels"
    }

    fn paint(&self, frame: &Frame<'_>, painter: &mut dyn Painter) {
        let style = frame.style;
        if frame.camera.meters_per_pixel() > style.label_max_meters_per_pixel {
            return;
        }
        let Some(network) = frame.resources.network() else {
            return;
        };
        let visible = frame.camera.visible_world_rect();
        for platform in network.platforms.iter().filter(|p| visible.contains(&p.position)) {
            if platform.label.is_empty() {
                continue;
            }
            let (x, y) = frame.to_pixel(&platform.position);
            let offset = style.platform.width + style.label_size;
            painter.text((x + offset, y - offset), &platform.label, style.label_size, style.label);
        }
    }
}
