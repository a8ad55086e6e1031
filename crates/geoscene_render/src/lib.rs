//! wgpu rendering backend for geoscene
//!
//! Implements the scene's GPU seam on top of wgpu.
//!
//! ## Key Components
//!
//! - [`context::WgpuContext`] - device, queue, surface and the frame's command encoder
//! - [`framebuffer::WgpuFramebuffer`] - offscreen color + depth target
//! - [`pick_framebuffer::WgpuPickFramebuffer`] - pick target with single-texel readback
//! - [`viewport_quad::ViewportQuad`] - full-screen post effect
//! - [`globe::Globe`] - ray-cast central body
//! - [`shader_cache::ShaderCache`] - shared programs, freed on the periodic sweep

pub mod context;
pub mod framebuffer;
pub mod globe;
pub mod pick_framebuffer;
pub mod shader_cache;
pub mod types;
pub mod viewport_quad;

pub use context::WgpuContext;
pub use framebuffer::{WgpuFramebuffer, WgpuTexture};
pub use globe::Globe;
pub use pick_framebuffer::WgpuPickFramebuffer;
pub use shader_cache::{ShaderCache, ShaderProgram};
pub use viewport_quad::ViewportQuad;

// Re-export the scene types a viewer needs alongside the backend
pub use geoscene_core::{Scene, SceneError, SceneMode, GpuError};
