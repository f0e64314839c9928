//! Cubic Bézier curves.

use super::{distance_to_segment, polyline_length, unit, Point2, Vec2};

/// Tolerance used by [`CubicBezier::length`].
const LENGTH_TOLERANCE: f64 = 1e-3;

const MAX_DEPTH: u32 = 16;

/// A cubic Bézier curve defined by four control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point2,
    pub p1: Point2,
    pub p2: Point2,
    pub p3: Point2,
}

impl CubicBezier {
    pub fn new(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// S-curve from `start` to `end` leaving `start` along `start_tangent`
    /// and leaving `end` (backwards along the curve) along `end_tangent`.
    ///
    /// Control points sit at one third of the chord length along each tangent.
    pub fn from_tangents(start: Point2, start_tangent: Vec2, end: Point2, end_tangent: Vec2) -> Self {
        let reach = (end - start).norm() / 3.0;
        let t0 = unit(&start_tangent).unwrap_or_else(Vec2::zeros);
        let t1 = unit(&end_tangent).unwrap_or_else(Vec2::zeros);
        Self::new(start, start + t0 * reach, end + t1 * reach, end)
    }

    pub fn point_at(&self, t: f64) -> Point2 {
        let u = 1.0 - t;
        let coords = self.p0.coords * (u * u * u)
            + self.p1.coords * (3.0 * u * u * t)
            + self.p2.coords * (3.0 * u * t * t)
            + self.p3.coords * (t * t * t);
        Point2::from(coords)
    }

    /// First derivative at `t`.
    pub fn derivative(&self, t: f64) -> Vec2 {
        let u = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Unit direction of travel at `t`.
    ///
    /// Falls back to the chord direction where the derivative vanishes
    /// (control point on top of an endpoint).
    pub fn tangent_at(&self, t: f64) -> Vec2 {
        unit(&self.derivative(t))
            .or_else(|| unit(&(self.p3 - self.p0)))
            .unwrap_or_else(Vec2::zeros)
    }

    /// Splits the curve at `t` (de Casteljau).
    pub fn split(&self, t: f64) -> (CubicBezier, CubicBezier) {
        let lerp = |a: Point2, b: Point2| a + (b - a) * t;
        let p01 = lerp(self.p0, self.p1);
        let p12 = lerp(self.p1, self.p2);
        let p23 = lerp(self.p2, self.p3);
        let p012 = lerp(p01, p12);
        let p123 = lerp(p12, p23);
        let mid = lerp(p012, p123);
        (
            CubicBezier::new(self.p0, p01, p012, mid),
            CubicBezier::new(mid, p123, p23, self.p3),
        )
    }

    fn is_flat(&self, tolerance: f64) -> bool {
        distance_to_segment(&self.p1, &self.p0, &self.p3) <= tolerance
            && distance_to_segment(&self.p2, &self.p0, &self.p3) <= tolerance
    }

    /// Adaptive polyline approximation, including both endpoints.
    pub fn flatten(&self, tolerance: f64) -> Vec<Point2> {
        let mut points = vec![self.p0];
        self.flatten_into(tolerance, 0, &mut points);
        points
    }

    fn flatten_into(&self, tolerance: f64, depth: u32, out: &mut Vec<Point2>) {
        if depth >= MAX_DEPTH || self.is_flat(tolerance) {
            out.push(self.p3);
            return;
        }
        let (left, right) = self.split(0.5);
        left.flatten_into(tolerance, depth + 1, out);
        right.flatten_into(tolerance, depth + 1, out);
    }

    /// Curve length by adaptive flattening.
    pub fn length(&self) -> f64 {
        polyline_length(&self.flatten(LENGTH_TOLERANCE))
    }
}
