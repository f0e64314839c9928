//! Paints the latest committed scene through the render streams.

use std::sync::Arc;

use crate::painter::Painter;
use crate::scene::SceneManager;
use crate::streams::{default_streams, Frame, RenderStream, RenderStyle};

/// Outcome of one [`Renderer::render`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStats {
    /// Revision of the resource table that was painted.
    pub revision: u64,
    /// Names of the streams that ran, in paint order.
    pub layers: Vec<&'static str>,
}

pub struct Renderer {
    scene: Arc<SceneManager>,
    streams: Vec<Box<dyn RenderStream>>,
    style: RenderStyle,
}

impl Renderer {
    pub fn new(scene: Arc<SceneManager>) -> Self {
        Self::with_streams(scene, default_streams())
    }

    pub fn with_streams(scene: Arc<SceneManager>, streams: Vec<Box<dyn RenderStream>>) -> Self {
        Self {
            scene,
            streams,
            style: RenderStyle::default(),
        }
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn stream_names(&self) -> Vec<&'static str> {
        self.streams.iter().map(|s| s.name()).collect()
    }

    /// Paints one frame. Without a camera snapshot nothing is painted.
    pub fn render(&self, painter: &mut dyn Painter) -> RenderStats {
        let resources = self.scene.snapshot();
        let mut stats = RenderStats {
            revision: resources.revision(),
            layers: Vec::new(),
        };
        let Some(camera) = resources.camera() else {
            tracing::trace!(revision = stats.revision, "No camera, skipping frame");
            return stats;
        };
        let frame = Frame {
            resources: &resources,
            camera,
            style: &self.style,
        };
        let (width, height) = camera.viewport_size();
        painter.begin_frame(width, height);
        for stream in &self.streams {
            painter.begin_layer(stream.name());
            stream.paint(&frame, painter);
            painter.end_layer();
            stats.layers.push(stream.name());
        }
        painter.end_frame();
        stats
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("streams", &self.stream_names())
            .finish()
    }
}
