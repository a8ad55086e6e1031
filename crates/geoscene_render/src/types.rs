//! GPU-compatible uniform layouts
//!
//! These types match the shader layouts exactly.
//! All types derive Pod and Zeroable for safe GPU buffer operations.

use bytemuck::{Pod, Zeroable};

/// Uniforms for the post-effect pass
/// Layout: 16 bytes (must match post_fx.wgsl PostFxUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PostFxUniforms {
    /// The effect's tunable parameter
    pub t: f32,
    /// Which effect the shader runs
    pub effect: u32,
    /// Viewport size in pixels
    pub width: f32,
    pub height: f32,
}

/// Uniforms for the globe pass
/// Layout: 208 bytes (must match globe.wgsl GlobeUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobeUniforms {
    /// World to clip, for writing depth (64 bytes)
    pub view_projection: [[f32; 4]; 4],
    /// Ray origin at each full-screen triangle corner, in scaled units (48 bytes)
    pub ray_origins: [[f32; 4]; 3],
    /// Ray direction at each corner, in scaled units (48 bytes)
    pub ray_directions: [[f32; 4]; 3],
    /// xyz: scale from scaled units back to meters; w: 0 = globe, 1 = flat map
    pub scale: [f32; 4],
    /// xyz: direction toward the sun; w: 1 if lighting is on
    pub sun_direction: [f32; 4],
    /// Color written in the pick pass
    pub pick_color: [f32; 4],
}

impl Default for GlobeUniforms {
    fn default() -> Self {
        Self {
            view_projection: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            ray_origins: [[0.0; 4]; 3],
            ray_directions: [[0.0; 4]; 3],
            scale: [1.0, 1.0, 1.0, 0.0],
            sun_direction: [1.0, 0.0, 0.0, 0.0],
            pick_color: [0.0; 4],
        }
    }
}
