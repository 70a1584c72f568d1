//! Conversions between world space and an element's unrotated local frame.

use kurbo::{Affine, Point};

/// Rotations smaller than this (in degrees) are treated as no rotation.
const ROTATION_EPSILON: f64 = 1e-9;

/// Rotate `point` by `degrees` around `center`.
pub fn rotate_about_degrees(point: Point, center: Point, degrees: f64) -> Point {
    if degrees.abs() < ROTATION_EPSILON {
        return point;
    }
    Affine::rotate_about(degrees.to_radians(), center) * point
}

/// Map a world-space point into the local frame of an element rotated by
/// `rotation` degrees around `center`.
pub fn world_to_local(point: Point, center: Point, rotation: f64) -> Point {
    rotate_about_degrees(point, center, -rotation)
}

/// Map a local-frame point back into world space.
pub fn local_to_world(point: Point, center: Point, rotation: f64) -> Point {
    rotate_about_degrees(point, center, rotation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rotation_is_identity() {
        let p = Point::new(12.5, -3.0);
        assert_eq!(world_to_local(p, Point::new(100.0, 100.0), 0.0), p);
    }

    #[test]
    fn test_quarter_turn() {
        let center = Point::new(50.0, 25.0);
        // Local north edge midpoint appears on the east side after a 90° turn.
        let world = local_to_world(Point::new(50.0, 0.0), center, 90.0);
        assert!((world.x - 75.0).abs() < 1e-9);
        assert!((world.y - 25.0).abs() < 1e-9);
        let back = world_to_local(world, center, 90.0);
        assert!((back.x - 50.0).abs() < 1e-9);
        assert!(back.y.abs() < 1e-9);
    }

    #[test]
    fn test_roundtrip_arbitrary_angle() {
        let center = Point::new(-20.0, 40.0);
        let p = Point::new(33.0, 7.0);
        let back = world_to_local(local_to_world(p, center, 37.5), center, 37.5);
        assert!(back.distance(p) < 1e-9);
    }
}
