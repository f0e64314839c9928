//! Geometry kernel.
//!
//! Pure functions over `nalgebra` points and vectors used by tracks to
//! compute tangents, intersections and curve lengths. Nothing in here knows
//! about vertices or tracks.

mod arc;
mod bezier;
mod line;

pub use arc::Arc;
pub use bezier::CubicBezier;
pub use line::Line;

pub use transitkit_core::constants::EPSILON;

/// A point in world coordinates (metres).
pub type Point2 = nalgebra::Point2<f64>;

/// A direction or offset in world coordinates.
pub type Vec2 = nalgebra::Vector2<f64>;

/// Angle of `v` in radians, in `(-PI, PI]`.
pub fn angle_of(v: &Vec2) -> f64 {
    v.y.atan2(v.x)
}

/// Normalizes an angle into `[0, 2*PI)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let a = angle % tau;
    if a < 0.0 {
        a + tau
    } else {
        a
    }
}

/// `v` rotated by +90 degrees.
pub fn rotate_ccw(v: &Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Z component of the 2D cross product.
pub fn cross(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Unit vector of `v`, or `None` when `v` is (almost) zero.
pub fn unit(v: &Vec2) -> Option<Vec2> {
    let len = v.norm();
    if len <= EPSILON {
        None
    } else {
        Some(v / len)
    }
}

/// Whether two points coincide within [`EPSILON`].
pub fn coincident(a: &Point2, b: &Point2) -> bool {
    (a - b).norm() <= EPSILON
}

/// Unit direction of the given angle.
pub fn direction(angle: f64) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= EPSILON * EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}
