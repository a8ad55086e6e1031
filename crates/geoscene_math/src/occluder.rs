//! Horizon culling against a spherical occluder
//!
//! The occluder is a sphere (usually the globe's inscribed sphere) seen from a
//! camera position. Anything hidden behind it, i.e. inside its shadow cone and
//! past the horizon plane, can be skipped by renderables.

use crate::{BoundingSphere, Cartesian3};

/// A spherical occluder seen from a camera position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Occluder {
    sphere: BoundingSphere,
    camera_position: Cartesian3,
}

impl Occluder {
    /// Create an occluder from a sphere and the camera's world position
    pub fn new(sphere: BoundingSphere, camera_position: Cartesian3) -> Self {
        Self { sphere, camera_position }
    }

    /// The occluding sphere
    pub fn sphere(&self) -> &BoundingSphere {
        &self.sphere
    }

    /// The camera (eye) position the occluder was built for
    pub fn camera_position(&self) -> Cartesian3 {
        self.camera_position
    }

    /// Update the eye position, keeping the sphere
    pub fn set_camera_position(&mut self, camera_position: Cartesian3) {
        self.camera_position = camera_position;
    }

    /// Whether the eye is inside the occluder (then nothing is occluded)
    pub fn camera_inside(&self) -> bool {
        self.sphere.contains(self.camera_position)
    }

    /// Whether a point can be seen past the occluder
    pub fn is_point_visible(&self, point: Cartesian3) -> bool {
        self.is_bounding_sphere_visible(&BoundingSphere::new(point, 0.0))
    }

    /// Whether any part of a sphere can be seen past the occluder
    ///
    /// Conservative: spheres straddling the horizon count as visible.
    pub fn is_bounding_sphere_visible(&self, occludee: &BoundingSphere) -> bool {
        if self.camera_inside() {
            return true;
        }

        let to_occluder = self.sphere.center - self.camera_position;
        let distance = to_occluder.magnitude();
        let axis = to_occluder / distance;
        let r = self.sphere.radius;

        let to_occludee = occludee.center - self.camera_position;
        let occludee_distance = to_occludee.magnitude();
        if occludee_distance <= occludee.radius {
            return true;
        }

        // Must lie entirely beyond the horizon plane
        let horizon_plane = (distance * distance - r * r) / distance;
        if to_occludee.dot(axis) - occludee.radius < horizon_plane {
            return true;
        }

        // And entirely inside the shadow cone
        let cone_half_angle = (r / distance).asin();
        let angle_to_center = (to_occludee.dot(axis) / occludee_distance)
            .clamp(-1.0, 1.0)
            .acos();
        let angular_radius = (occludee.radius / occludee_distance).asin();

        angle_to_center + angular_radius > cone_half_angle
    }
}
