//! Map projections used by 2D and Columbus view

use crate::{Cartesian3, Cartographic, Ellipsoid};

/// A projection between geodetic positions and flat map coordinates
///
/// Projected coordinates are in meters: `x` east, `y` north, `z` height.
pub trait MapProjection {
    /// The ellipsoid this projection is defined on
    fn ellipsoid(&self) -> &Ellipsoid;

    /// Geodetic position to map coordinates
    fn project(&self, cartographic: &Cartographic) -> Cartesian3;

    /// Map coordinates to geodetic position
    fn unproject(&self, projected: Cartesian3) -> Cartographic;
}

/// Plate carrée: longitude and latitude scaled by the semimajor axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquidistantCylindricalProjection {
    ellipsoid: Ellipsoid,
    semimajor_axis: f64,
    one_over_semimajor_axis: f64,
}

impl Default for EquidistantCylindricalProjection {
    fn default() -> Self {
        Self::new(Ellipsoid::WGS84)
    }
}

impl EquidistantCylindricalProjection {
    /// Create a projection for an ellipsoid
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        let semimajor_axis = ellipsoid.maximum_radius();
        Self {
            ellipsoid,
            semimajor_axis,
            one_over_semimajor_axis: 1.0 / semimajor_axis,
        }
    }
}

impl MapProjection for EquidistantCylindricalProjection {
    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    fn project(&self, cartographic: &Cartographic) -> Cartesian3 {
        Cartesian3::new(
            cartographic.longitude * self.semimajor_axis,
            cartographic.latitude * self.semimajor_axis,
            cartographic.height,
        )
    }

    fn unproject(&self, projected: Cartesian3) -> Cartographic {
        Cartographic::new(
            projected.x * self.one_over_semimajor_axis,
            projected.y * self.one_over_semimajor_axis,
            projected.z,
        )
    }
}
