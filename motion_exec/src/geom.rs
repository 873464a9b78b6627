//! # Planar line geometry

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A directed line through two points in the plane.
#[derive(Debug, Clone, Copy)]
pub struct Line2d {
    start_m: Vector2<f64>,
    end_m: Vector2<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Line2d {
    /// Create the directed line from `start_m` through `end_m`.
    ///
    /// The two points must be distinct, a zero-length line has no defined
    /// side.
    pub fn new(start_m: Vector2<f64>, end_m: Vector2<f64>) -> Self {
        Self { start_m, end_m }
    }

    /// Signed distance from a point to the line.
    ///
    /// Positive on the left of the directed line, negative on the right
    /// (right hand rule about +Z). The sign comes from the z component of the
    /// cross product between the line direction and the start-to-point
    /// vector.
    pub fn signed_distance(&self, point_m: &Vector2<f64>) -> f64 {
        let dir = self.end_m - self.start_m;
        let rel = point_m - self.start_m;

        (dir.x * rel.y - dir.y * rel.x) / dir.norm()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_signed_distance_sides() {
        // Directed along +X: left is +Y
        let line = Line2d::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0));

        assert_eq!(line.signed_distance(&Vector2::new(0.5, 1.0)), 1.0);
        assert_eq!(line.signed_distance(&Vector2::new(0.5, -1.0)), -1.0);
        assert_eq!(line.signed_distance(&Vector2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn test_signed_distance_is_independent_of_length() {
        let short = Line2d::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0));
        let long = Line2d::new(Vector2::new(0.0, 0.0), Vector2::new(10.0, 10.0));
        let point = Vector2::new(0.0, 2.0);

        assert!((short.signed_distance(&point) - long.signed_distance(&point)).abs() < 1e-12);
    }
}
