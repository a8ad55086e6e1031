//! Bounding spheres

use serde::{Serialize, Deserialize};

use crate::Cartesian3;

/// A sphere given by center and radius
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Cartesian3,
    pub radius: f64,
}

impl BoundingSphere {
    /// Create a new bounding sphere
    pub const fn new(center: Cartesian3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Smallest sphere around a set of points, centered on their mean
    ///
    /// Not the minimal enclosing sphere, but always contains every point.
    pub fn from_points(points: &[Cartesian3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let sum = points.iter().fold(Cartesian3::ZERO, |acc, p| acc + *p);
        let center = sum / points.len() as f64;
        let radius = points
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0, f64::max);
        Some(Self { center, radius })
    }

    /// Whether a point lies inside or on the sphere
    pub fn contains(&self, point: Cartesian3) -> bool {
        point.distance(self.center) <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let sphere = BoundingSphere::from_points(&[
            Cartesian3::new(-1.0, 0.0, 0.0),
            Cartesian3::new(1.0, 0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(sphere.center, Cartesian3::ZERO);
        assert_eq!(sphere.radius, 1.0);
    }

    #[test]
    fn test_from_no_points() {
        assert!(BoundingSphere::from_points(&[]).is_none());
    }

    #[test]
    fn test_contains() {
        let sphere = BoundingSphere::new(Cartesian3::ZERO, 2.0);
        assert!(sphere.contains(Cartesian3::new(0.0, 2.0, 0.0)));
        assert!(!sphere.contains(Cartesian3::new(0.0, 2.1, 0.0)));
    }
}
