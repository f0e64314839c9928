use transitkit_core::constants::SEGMENT_SIZE;

use super::{Frame, RenderStream};
use crate::painter::Painter;

/// Background images of the visible segments.
#[derive(Debug, Default, Clone, Copy)]
pub struct BitmapStream;

impl RenderStream for BitmapStream {
    fn name(&self) -> &'static str {
        "bitmaps"
    }

    fn paint(&self, frame: &Frame<'_>, painter: &mut dyn Painter) {
        let Some(segments) = frame.resources.segments() else {
            return;
        };
        let visible = frame.camera.visible_world_rect();
        for segment in &segments.segments {
            let Some(path) = segment.background.as_deref() else {
                continue;
            };
            let bounds = segment.bounds(SEGMENT_SIZE);
            if bounds.intersects(&visible) {
                painter.image(path, frame.to_pixel(&bounds.min), frame.to_pixel(&bounds.max));
            }
        }
    }
}
