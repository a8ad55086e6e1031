//! Reference ellipsoids and geodetic coordinates

use serde::{Serialize, Deserialize};

use crate::Cartesian3;

/// Geodetic position: longitude and latitude in radians, height in meters
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Cartographic {
    /// Create a new Cartographic from radians
    #[inline]
    pub const fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self { longitude, latitude, height }
    }

    /// Create a new Cartographic from degrees
    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        Self::new(longitude.to_radians(), latitude.to_radians(), height)
    }
}

/// An axis-aligned ellipsoid centered at the origin
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    radii: Cartesian3,
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

impl Ellipsoid {
    /// The WGS84 reference ellipsoid
    pub const WGS84: Self = Self {
        radii: Cartesian3::new(6_378_137.0, 6_378_137.0, 6_356_752.314_245_179),
    };

    /// A sphere of radius 1
    pub const UNIT_SPHERE: Self = Self {
        radii: Cartesian3::new(1.0, 1.0, 1.0),
    };

    /// Create an ellipsoid from its three radii
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { radii: Cartesian3::new(x, y, z) }
    }

    /// The radii along each axis
    pub fn radii(&self) -> Cartesian3 {
        self.radii
    }

    /// The smallest radius; the radius of the largest sphere fully inside
    pub fn minimum_radius(&self) -> f64 {
        self.radii.min_component()
    }

    /// The largest radius
    pub fn maximum_radius(&self) -> f64 {
        self.radii.max_component()
    }

    /// Surface normal at a point on (or near) the surface
    pub fn geodetic_surface_normal(&self, position: Cartesian3) -> Cartesian3 {
        let radii_squared = self.radii.component_mul(self.radii);
        position.component_div(radii_squared).normalized()
    }

    /// Surface normal at a geodetic position
    pub fn geodetic_surface_normal_cartographic(&self, cartographic: &Cartographic) -> Cartesian3 {
        let cos_lat = cartographic.latitude.cos();
        Cartesian3::new(
            cos_lat * cartographic.longitude.cos(),
            cos_lat * cartographic.longitude.sin(),
            cartographic.latitude.sin(),
        )
    }

    /// Convert a geodetic position to world coordinates
    pub fn cartographic_to_cartesian(&self, cartographic: &Cartographic) -> Cartesian3 {
        let n = self.geodetic_surface_normal_cartographic(cartographic);
        let radii_squared = self.radii.component_mul(self.radii);
        let k = radii_squared.component_mul(n);
        let gamma = n.dot(k).sqrt();
        k / gamma + n * cartographic.height
    }

    /// Convert world coordinates to a geodetic position
    ///
    /// Exact for points on the surface. Off-surface heights are measured along
    /// the geocentric ray, which is close enough for picking and view fitting.
    pub fn cartesian_to_cartographic(&self, position: Cartesian3) -> Option<Cartographic> {
        let surface = self.scale_to_geocentric_surface(position)?;
        let n = self.geodetic_surface_normal(surface);
        let height = (position - surface).dot(n);
        Some(Cartographic::new(
            n.y.atan2(n.x),
            n.z.clamp(-1.0, 1.0).asin(),
            height,
        ))
    }

    /// Scale a position along the ray from the center so it lies on the surface
    pub fn scale_to_geocentric_surface(&self, position: Cartesian3) -> Option<Cartesian3> {
        let scaled = position.component_div(self.radii);
        let len_sq = scaled.magnitude_squared();
        if len_sq == 0.0 {
            return None;
        }
        Some(position * (1.0 / len_sq.sqrt()))
    }

    /// Distance along a ray to the nearest surface intersection in front of the origin
    ///
    /// `direction` need not be normalized; the result is in units of `direction`.
    /// Returns `None` when the ray misses. A ray starting inside the ellipsoid
    /// reports the exit point.
    pub fn intersect_ray(&self, origin: Cartesian3, direction: Cartesian3) -> Option<f64> {
        let o = origin.component_div(self.radii);
        let d = direction.component_div(self.radii);

        let a = d.magnitude_squared();
        let b = 2.0 * o.dot(d);
        let c = o.magnitude_squared() - 1.0;
        if a == 0.0 {
            return None;
        }

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let near = (-b - sqrt_disc) / (2.0 * a);
        let far = (-b + sqrt_disc) / (2.0 * a);

        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(far)
        } else {
            None
        }
    }
}
