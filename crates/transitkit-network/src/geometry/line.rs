//! Infinite lines.

use super::{cross, rotate_ccw, unit, Point2, Vec2, EPSILON};

/// An infinite line through `point` along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub point: Point2,
    pub direction: Vec2,
}

impl Line {
    pub fn new(point: Point2, direction: Vec2) -> Self {
        Self { point, direction }
    }

    /// Line through two points.
    pub fn through(a: Point2, b: Point2) -> Self {
        Self::new(a, b - a)
    }

    /// Line through `point` orthogonal to `direction`.
    pub fn orthogonal_at(point: Point2, direction: Vec2) -> Self {
        Self::new(point, rotate_ccw(&direction))
    }

    /// Perpendicular bisector of the segment `a`-`b`.
    pub fn perpendicular_bisector(a: Point2, b: Point2) -> Self {
        let mid = nalgebra::center(&a, &b);
        Self::orthogonal_at(mid, b - a)
    }

    /// Intersection point, or `None` for parallel (or degenerate) lines.
    pub fn intersect(&self, other: &Line) -> Option<Point2> {
        let d1 = unit(&self.direction)?;
        let d2 = unit(&other.direction)?;
        let denom = cross(&d1, &d2);
        if denom.abs() <= EPSILON {
            return None;
        }
        let t = cross(&(other.point - self.point), &d2) / denom;
        Some(self.point + d1 * t)
    }

    /// Signed side of `p`: positive left of the direction, negative right.
    pub fn side(&self, p: &Point2) -> f64 {
        cross(&self.direction, &(p - self.point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_axes() {
        let x_axis = Line::new(Point2::new(-5.0, 0.0), Vec2::new(1.0, 0.0));
        let y_axis = Line::new(Point2::new(0.0, 7.0), Vec2::new(0.0, -2.0));
        let p = x_axis.intersect(&y_axis).expect("lines cross");
        assert!(p.coords.norm() < 1e-12);
    }

    #[test]
    fn test_parallel_lines_do_not_intersect() {
        let a = Line::new(Point2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Line::new(Point2::new(0.0, 1.0), Vec2::new(2.0, 2.0));
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn test_perpendicular_bisector() {
        let bisector = Line::perpendicular_bisector(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        assert_eq!(bisector.point, Point2::new(2.0, 0.0));
        assert!(bisector.direction.x.abs() < 1e-12);
    }

    #[test]
    fn test_side() {
        let line = Line::through(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        assert!(line.side(&Point2::new(0.5, 1.0)) > 0.0);
        assert!(line.side(&Point2::new(0.5, -1.0)) < 0.0);
    }
}
