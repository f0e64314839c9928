//! Painting back-ends for the render streams.
//!
//! All coordinates handed to a [`Painter`] are viewport pixels.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub dashed: bool,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dashed: false,
        }
    }

    pub fn dashed(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dashed: true,
        }
    }
}

/// Drawing surface used by the render streams.
pub trait Painter {
    /// Starts a frame of `width` x `height` pixels.
    fn begin_frame(&mut self, width: u32, height: u32);

    /// Opens a named group; streams wrap their output in one.
    fn begin_layer(&mut self, name: &str);

    fn end_layer(&mut self);

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &Stroke);

    fn circle(&mut self, center: (f64, f64), radius: f64, fill: Color, stroke: Option<&Stroke>);

    fn rect(&mut self, min: (f64, f64), max: (f64, f64), fill: Option<Color>, stroke: Option<&Stroke>);

    fn image(&mut self, path: &str, min: (f64, f64), max: (f64, f64));

    fn text(&mut self, position: (f64, f64), text: &str, size: f64, color: Color);

    fn end_frame(&mut self);

    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke) {
        self.polyline(&[from, to], stroke);
    }
}

/// Builds an SVG document.
#[derive(Debug, Default, Clone)]
pub struct SvgPainter {
    width: u32,
    height: u32,
    body: String,
    document: String,
}

impl SvgPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last finished document.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn into_document(self) -> String {
        self.document
    }

    fn stroke_attrs(stroke: &Stroke) -> String {
        let mut attrs = format!(
            r#"stroke="{}" stroke-width="{:.2}""#,
            stroke.color, stroke.width
        );
        if stroke.color.a != 255 {
            let _ = write!(attrs, r#" stroke-opacity="{:.3}""#, stroke.color.opacity());
        }
        if stroke.dashed {
            let _ = write!(
                attrs,
                r#" stroke-dasharray="{:.1} {:.1}""#,
                stroke.width * 4.0,
                stroke.width * 3.0
            );
        }
        attrs
    }

    fn fill_attrs(fill: Option<Color>) -> String {
        match fill {
            Some(color) if color.a != 255 => {
                format!(r#"fill="{}" fill-opacity="{:.3}""#, color, color.opacity())
            }
            Some(color) => format!(r#"fill="{}""#, color),
            None => r#"fill="none""#.to_string(),
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Painter for SvgPainter {
    fn begin_frame(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.body.clear();
    }

    fn begin_layer(&mut self, name: &str) {
        let _ = writeln!(self.body, r#"<g id="{}">"#, escape(name));
    }

    fn end_layer(&mut self) {
        self.body.push_str("</g>\n");
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &Stroke) {
        if points.len() < 2 {
            return;
        }
        let mut data = String::with_capacity(points.len() * 16);
        for (i, (x, y)) in points.iter().enumerate() {
            let _ = write!(data, "{}{:.2} {:.2} ", if i == 0 { "M " } else { "L " }, x, y);
        }
        let _ = writeln!(
            self.body,
            r#"<path d="{}" fill="none" {} stroke-linecap="round"/>"#,
            data.trim_end(),
            Self::stroke_attrs(stroke)
        );
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, fill: Color, stroke: Option<&Stroke>) {
        let stroke = stroke.map(Self::stroke_attrs).unwrap_or_default();
        let _ = writeln!(
            self.body,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" {} {}/>"#,
            center.0,
            center.1,
            radius,
            Self::fill_attrs(Some(fill)),
            stroke
        );
    }

    fn rect(&mut self, min: (f64, f64), max: (f64, f64), fill: Option<Color>, stroke: Option<&Stroke>) {
        let stroke = stroke.map(Self::stroke_attrs).unwrap_or_default();
        let _ = writeln!(
            self.body,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" {} {}/>"#,
            min.0,
            min.1,
            max.0 - min.0,
            max.1 - min.1,
            Self::fill_attrs(fill),
            stroke
        );
    }

    fn image(&mut self, path: &str, min: (f64, f64), max: (f64, f64)) {
        let _ = writeln!(
            self.body,
            r#"<image href="{}" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" preserveAspectRatio="none"/>"#,
            escape(path),
            min.0,
            min.1,
            max.0 - min.0,
            max.1 - min.1
        );
    }

    fn text(&mut self, position: (f64, f64), text: &str, size: f64, color: Color) {
        let _ = writeln!(
            self.body,
            r#"<text x="{:.2}" y="{:.2}" font-size="{:.1}" fill="{}">{}</text>"#,
            position.0,
            position.1,
            size,
            color,
            escape(text)
        );
    }

    fn end_frame(&mut self) {
        self.document = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        );
        self.body.clear();
    }
}

/// One recorded painter call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    BeginFrame { width: u32, height: u32 },
    BeginLayer(String),
    EndLayer,
    Polyline { points: Vec<(f64, f64)>, stroke: Stroke },
    Circle { center: (f64, f64), radius: f64, fill: Color },
    Rect { min: (f64, f64), max: (f64, f64), fill: Option<Color> },
    Image { path: String, min: (f64, f64), max: (f64, f64) },
    Text { position: (f64, f64), text: String },
    EndFrame,
}

/// Records every call; used to inspect what the streams draw.
#[derive(Debug, Default, Clone)]
pub struct RecordingPainter {
    pub calls: Vec<DrawCall>,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer names in the order they were opened.
    pub fn layers(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::BeginLayer(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Calls made between opening and closing layer `name`.
    pub fn layer(&self, name: &str) -> Vec<&DrawCall> {
        let mut inside = false;
        let mut calls = Vec::new();
        for call in &self.calls {
            match call {
                DrawCall::BeginLayer(layer) => inside = layer == name,
                DrawCall::EndLayer => inside = false,
                other if inside => calls.push(other),
                _ => {}
            }
        }
        calls
    }
}

impl Painter for RecordingPainter {
    fn begin_frame(&mut self, width: u32, height: u32) {
        self.calls.clear();
        self.calls.push(DrawCall::BeginFrame { width, height });
    }

    fn begin_layer(&mut self, name: &str) {
        self.calls.push(DrawCall::BeginLayer(name.to_string()));
    }

    fn end_layer(&mut self) {
        self.calls.push(DrawCall::EndLayer);
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &Stroke) {
        self.calls.push(DrawCall::Polyline {
            points: points.to_vec(),
            stroke: *stroke,
        });
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, fill: Color, _stroke: Option<&Stroke>) {
        self.calls.push(DrawCall::Circle {
            center,
            radius,
            fill,
        });
    }

    fn rect(&mut self, min: (f64, f64), max: (f64, f64), fill: Option<Color>, _stroke: Option<&Stroke>) {
        self.calls.push(DrawCall::Rect { min, max, fill });
    }

    fn image(&mut self, path: &str, min: (f64, f64), max: (f64, f64)) {
        self.calls.push(DrawCall::Image {
            path: path.to_string(),
            min,
            max,
        });
    }

    fn text(&mut self, position: (f64, f64), text: &str, _size: f64, _color: Color) {
        self.calls.push(DrawCall::Text {
            position,
            text: text.to_string(),
        });
    }

    fn end_frame(&mut self) {
        self.calls.push(DrawCall::EndFrame);
    }
}
