//! Circular arcs.

use super::{angle_of, direction, normalize_angle, rotate_ccw, Point2, Vec2, EPSILON};

/// A circular arc starting at `start_angle` and sweeping `sweep` radians
/// (positive counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl Arc {
    /// Arc around `center` from `from` to `to`, counter-clockwise when `ccw`.
    ///
    /// The radius is taken from `from`; `to` only determines the end angle.
    pub fn from_endpoints(center: Point2, from: Point2, to: Point2, ccw: bool) -> Self {
        let start_angle = angle_of(&(from - center));
        let end_angle = angle_of(&(to - center));
        let sweep = if ccw {
            normalize_angle(end_angle - start_angle)
        } else {
            -normalize_angle(start_angle - end_angle)
        };
        Self {
            center,
            radius: (from - center).norm(),
            start_angle,
            sweep,
        }
    }

    /// Arc length.
    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point2 {
        self.center + direction(self.start_angle + self.sweep * t) * self.radius
    }

    /// Unit direction of travel at parameter `t`.
    pub fn tangent_at(&self, t: f64) -> Vec2 {
        let radial = direction(self.start_angle + self.sweep * t);
        let forward = rotate_ccw(&radial);
        if self.sweep < 0.0 {
            -forward
        } else {
            forward
        }
    }

    /// Polyline approximation whose chord error stays below `tolerance`.
    pub fn flatten(&self, tolerance: f64) -> Vec<Point2> {
        let steps = if self.radius <= EPSILON || self.sweep.abs() <= EPSILON {
            1
        } else {
            let tol = tolerance.max(EPSILON).min(self.radius);
            let max_step = 2.0 * (1.0 - tol / self.radius).acos();
            let steps = (self.sweep.abs() / max_step.max(1e-3)).ceil() as usize;
            steps.clamp(1, 1024)
        };
        (0..=steps)
            .map(|i| self.point_at(i as f64 / steps as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn quarter(ccw: bool) -> Arc {
        Arc::from_endpoints(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
            ccw,
        )
    }

    #[test]
    fn test_sweep_direction() {
        assert!((quarter(true).sweep - PI / 2.0).abs() < 1e-12);
        assert!((quarter(false).sweep + 3.0 * PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_length() {
        assert!((quarter(true).length() - 5.0 * PI).abs() < 1e-9);
        assert!((quarter(false).length() - 15.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn test_endpoints_and_tangent() {
        let arc = quarter(true);
        assert!((arc.point_at(0.0) - Point2::new(10.0, 0.0)).norm() < 1e-9);
        assert!((arc.point_at(1.0) - Point2::new(0.0, 10.0)).norm() < 1e-9);
        let t = arc.tangent_at(0.0);
        assert!((t - Vec2::new(0.0, 1.0)).norm() < 1e-9);
        let t = quarter(false).tangent_at(0.0);
        assert!((t - Vec2::new(0.0, -1.0)).norm() < 1e-9);
    }

    #[test]
    fn test_flatten_stays_on_circle() {
        let arc = quarter(true);
        let points = arc.flatten(0.01);
        assert!(points.len() > 2);
        for p in points {
            assert!(((p - arc.center).norm() - 10.0).abs() < 1e-9);
        }
    }
}
