use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A position in image pixel space.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate2D {
    pub x: f64,
    pub y: f64,
}

impl Coordinate2D {
    pub fn new(x: f64, y: f64) -> Self {
        Coordinate2D { x, y }
    }

    fn as_point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// distance returns the Euclidean distance to `other`.
    pub fn distance(&self, other: &Coordinate2D) -> f64 {
        nalgebra::distance(&self.as_point(), &other.as_point())
    }

    pub fn midpoint(&self, other: &Coordinate2D) -> Coordinate2D {
        let center = nalgebra::center(&self.as_point(), &other.as_point());
        Coordinate2D::new(center.x, center.y)
    }
}


#[cfg(test)]
mod tests {
    use crate::utils::coordinate::Coordinate2D;

    #[test]
    fn test_distance() {
        let a = Coordinate2D::new(0.0, 0.0);
        let b = Coordinate2D::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn test_midpoint() {
        let mid = Coordinate2D::new(100.0, 400.0).midpoint(&Coordinate2D::new(140.0, 420.0));
        assert_eq!(mid, Coordinate2D::new(120.0, 410.0));
    }
}
