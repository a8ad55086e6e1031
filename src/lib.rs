//! GeoScene viewer
//!
//! Window, configuration and input handling around the `geoscene_core` scene
//! and its wgpu backend.

pub mod config;
pub mod input;
pub mod systems;
