//! Geometric utilities over 2D landmark positions.
//!
//! All angles are returned in degrees. Image coordinates have y growing
//! downward, which does not affect any of the unsigned quantities here.

use nalgebra::Vector2;

use crate::types::Point2D;

const EPSILON: f64 = 1e-10;

/// Angle between two vectors in radians, `None` if either has zero length
pub fn angle_between(v1: &Vector2<f64>, v2: &Vector2<f64>) -> Option<f64> {
    let norms = v1.norm() * v2.norm();
    if norms < EPSILON {
        return None;
    }
    Some((v1.dot(v2) / norms).clamp(-1.0, 1.0).acos())
}

/// Angle in degrees at `vertex` formed by `p1` and `p2`, in [0, 180].
///
/// Returns `None` when either point coincides with the vertex.
pub fn angle_at(p1: &Point2D, vertex: &Point2D, p2: &Point2D) -> Option<f64> {
    angle_between(&p1.vector_from(vertex), &p2.vector_from(vertex)).map(f64::to_degrees)
}

/// Euclidean distance between two points
pub fn distance(a: &Point2D, b: &Point2D) -> f64 {
    a.distance_to(b)
}

/// Lean of the shoulder-midpoint to hip-midpoint segment away from vertical,
/// in degrees. 0 is upright, 90 is horizontal.
pub fn torso_angle(
    left_shoulder: &Point2D,
    right_shoulder: &Point2D,
    left_hip: &Point2D,
    right_hip: &Point2D,
) -> f64 {
    let shoulders = left_shoulder.midpoint(right_shoulder);
    let hips = left_hip.midpoint(right_hip);
    let dx = (shoulders.x - hips.x).abs();
    let dy = (shoulders.y - hips.y).abs();
    dx.atan2(dy).to_degrees()
}

/// Slope `dy/dx` of the line through two points; `None` if vertical
pub fn slope(a: &Point2D, b: &Point2D) -> Option<f64> {
    let dx = b.x - a.x;
    if dx.abs() < EPSILON {
        return None;
    }
    Some((b.y - a.y) / dx)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
