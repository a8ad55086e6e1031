//! Globe Mathematics Library
//!
//! This crate provides the value types the geoscene renderer works with.
//!
//! ## Core Types
//!
//! - [`Cartesian2`] / [`Cartesian3`] - `f64` vectors for window and world positions
//! - [`Cartographic`] - longitude/latitude/height
//! - [`Mat4`] - column-major `f32` 4x4 matrix for GPU upload
//!
//! ## Globe Types
//!
//! - [`Ellipsoid`] - reference ellipsoid (WGS84 by default)
//! - [`BoundingSphere`] - center + radius
//! - [`Occluder`] - horizon culling against a sphere
//! - [`Extent`] - longitude/latitude rectangle
//! - [`MapProjection`] - flat map projection used by 2D and Columbus view

mod cartesian;
mod ellipsoid;
mod bounding_sphere;
mod occluder;
mod extent;
pub mod mat4;
pub mod projection;

pub use cartesian::{Cartesian2, Cartesian3};
pub use ellipsoid::{Cartographic, Ellipsoid};
pub use bounding_sphere::BoundingSphere;
pub use occluder::Occluder;
pub use extent::Extent;
pub use mat4::Mat4;
pub use projection::{MapProjection, EquidistantCylindricalProjection};
