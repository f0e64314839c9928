use transitkit_core::constants::SEGMENT_SIZE;

use super::{Frame, RenderStream};
use crate::painter::Painter;

/// Segment borders; segments in use get a light fill.
#[derive(Debug, Default, Clone, Copy)]
pub struct GridStream;

impl RenderStream for GridStream {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn paint(&self, frame: &Frame<'_>, painter: &mut dyn Painter) {
        let Some(segments) = frame.resources.segments() else {
            return;
        };
        let visible = frame.camera.visible_world_rect();
        for segment in &segments.segments {
            let bounds = segment.bounds(SEGMENT_SIZE);
            if !bounds.intersects(&visible) {
                continue;
            }
            let fill = segment.in_use.then_some(frame.style.segment_in_use);
            painter.rect(
                frame.to_pixel(&bounds.min),
                frame.to_pixel(&bounds.max),
                fill,
                Some(&frame.style.grid),
            );
        }
    }
}
