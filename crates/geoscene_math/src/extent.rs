//! Geographic extents (longitude/latitude rectangles)

use serde::{Serialize, Deserialize};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::Cartographic;

/// A longitude/latitude rectangle in radians
///
/// `east` may be less than `west` when the extent crosses the antimeridian.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Extent {
    /// The whole globe
    pub const MAX_VALUE: Self = Self {
        west: -PI,
        south: -FRAC_PI_2,
        east: PI,
        north: FRAC_PI_2,
    };

    /// Create an extent from radians
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }

    /// Create an extent from degrees
    pub fn from_degrees(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self::new(
            west.to_radians(),
            south.to_radians(),
            east.to_radians(),
            north.to_radians(),
        )
    }

    /// Longitude span, accounting for antimeridian crossing
    pub fn width(&self) -> f64 {
        if self.east < self.west {
            self.east + 2.0 * PI - self.west
        } else {
            self.east - self.west
        }
    }

    /// Latitude span
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Geographic center (height zero)
    pub fn center(&self) -> Cartographic {
        let mut longitude = self.west + self.width() * 0.5;
        if longitude > PI {
            longitude -= 2.0 * PI;
        }
        Cartographic::new(longitude, (self.south + self.north) * 0.5, 0.0)
    }

    /// Whether the extent's bounds are in range and ordered
    pub fn is_valid(&self) -> bool {
        let lon_ok = |v: f64| (-PI..=PI).contains(&v);
        let lat_ok = |v: f64| (-FRAC_PI_2..=FRAC_PI_2).contains(&v);
        lon_ok(self.west)
            && lon_ok(self.east)
            && lat_ok(self.south)
            && lat_ok(self.north)
            && self.south <= self.north
    }
}
