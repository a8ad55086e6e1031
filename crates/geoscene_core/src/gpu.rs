//! The GPU context seam
//!
//! The scene never talks to a graphics API directly. Everything it needs from
//! the GPU (textures, framebuffers, clears, pick readback, post-effect quads,
//! per-frame uniforms and shader cache maintenance) goes through
//! [`GpuContext`], so the orchestration logic can run against a wgpu backend
//! or a recording test double alike.

use geoscene_math::{mat4, Cartesian3, Mat4};

use crate::error::GpuError;
use crate::pick::{PickColor, PickIdRegistry, PixelPosition};
use crate::post_effect::{PostEffect, PostEffectKind};

/// Channel layout of a texture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgba,
    DepthComponent,
}

/// Storage type of each channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelDatatype {
    UnsignedByte,
    UnsignedShort,
    UnsignedInt,
    Float,
}

/// Parameters for [`GpuContext::create_texture_2d`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureDescription {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub pixel_datatype: PixelDatatype,
}

impl TextureDescription {
    /// RGBA8 color attachment
    pub fn color(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_format: PixelFormat::Rgba,
            pixel_datatype: PixelDatatype::UnsignedByte,
        }
    }

    /// 16-bit depth attachment
    pub fn depth(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_format: PixelFormat::DepthComponent,
            pixel_datatype: PixelDatatype::UnsignedShort,
        }
    }

    /// Reject zero-sized textures
    pub fn validate(&self) -> Result<(), GpuError> {
        if self.width == 0 || self.height == 0 {
            return Err(GpuError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Which buffers a clear touches and with what values
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearState {
    pub color: Option<[f32; 4]>,
    pub depth: Option<f32>,
}

impl Default for ClearState {
    /// Opaque black, depth 1.0
    fn default() -> Self {
        Self {
            color: Some([0.0, 0.0, 0.0, 1.0]),
            depth: Some(1.0),
        }
    }
}

impl ClearState {
    /// Clear used by the pick pass: the background decodes to "no object"
    pub fn pick() -> Self {
        Self {
            color: Some(PickColor::NONE.to_f32_array()),
            depth: Some(1.0),
        }
    }
}

/// A rectangle of the drawing buffer, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole buffer of the given size
    pub const fn full(size: (u32, u32)) -> Self {
        Self::new(0, 0, size.0, size.1)
    }
}

/// Per-frame values shared by every draw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformState {
    projection: Mat4,
    infinite_projection: Mat4,
    view: Mat4,
    sun_position: Cartesian3,
}

impl Default for UniformState {
    fn default() -> Self {
        Self {
            projection: mat4::IDENTITY,
            infinite_projection: mat4::IDENTITY,
            view: mat4::IDENTITY,
            sun_position: Cartesian3::ZERO,
        }
    }
}

impl UniformState {
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    pub fn infinite_projection(&self) -> Mat4 {
        self.infinite_projection
    }

    pub fn set_infinite_projection(&mut self, projection: Mat4) {
        self.infinite_projection = projection;
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    pub fn sun_position(&self) -> Cartesian3 {
        self.sun_position
    }

    pub fn set_sun_position(&mut self, position: Cartesian3) {
        self.sun_position = position;
    }

    /// `projection * view`
    pub fn view_projection(&self) -> Mat4 {
        mat4::mul(self.projection, self.view)
    }
}

/// A color + depth render target
pub trait Framebuffer {
    type Texture;

    fn color_texture(&self) -> &Self::Texture;
    fn depth_texture(&self) -> &Self::Texture;

    /// Size in pixels of the attachments
    fn size(&self) -> (u32, u32);
}

/// Offscreen target for the pick pass
pub trait PickFramebuffer<C: GpuContext> {
    /// Bind and clear the target, returning it for pick rendering
    fn begin(&mut self, context: &mut C) -> Result<&C::Framebuffer, GpuError>;

    /// Finish the pass and read back one texel
    ///
    /// `None` ends the pass without reading anything.
    fn end(
        &mut self,
        context: &mut C,
        position: Option<PixelPosition>,
    ) -> Result<Option<PickColor>, GpuError>;
}

/// Everything the scene needs from a graphics backend
pub trait GpuContext: Sized + 'static {
    type Texture;
    type Framebuffer: Framebuffer<Texture = Self::Texture>;
    type PickFramebuffer: PickFramebuffer<Self>;

    /// Current size of the default drawing buffer
    fn drawing_buffer_size(&self) -> (u32, u32);

    fn create_texture_2d(&mut self, description: &TextureDescription) -> Result<Self::Texture, GpuError>;

    fn create_framebuffer(
        &mut self,
        color: Self::Texture,
        depth: Self::Texture,
    ) -> Result<Self::Framebuffer, GpuError>;

    fn create_pick_framebuffer(&mut self) -> Result<Self::PickFramebuffer, GpuError>;

    /// Build the full-screen quad for one post effect
    fn create_post_effect(
        &mut self,
        kind: PostEffectKind,
        viewport: Viewport,
    ) -> Result<Box<dyn PostEffect<Self>>, GpuError>;

    /// Direct subsequent draws to a framebuffer, or to the default buffer with `None`
    fn bind_framebuffer(&mut self, framebuffer: Option<&Self::Framebuffer>);

    /// Clear the currently bound target
    fn clear(&mut self, clear_state: &ClearState) -> Result<(), GpuError>;

    fn uniform_state(&self) -> &UniformState;
    fn uniform_state_mut(&mut self) -> &mut UniformState;

    /// Free shader programs nothing references any more
    fn destroy_released_shader_programs(&mut self);

    /// Registry mapping pick colors back to objects
    fn pick_ids(&mut self) -> &mut PickIdRegistry;

    /// Submit the frame's work and show the default drawing buffer
    fn present(&mut self) -> Result<(), GpuError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_description_validation() {
        assert!(TextureDescription::color(800, 600).validate().is_ok());
        assert_eq!(
            TextureDescription::depth(0, 600).validate(),
            Err(GpuError::InvalidSize { width: 0, height: 600 })
        );
    }

    #[test]
    fn test_default_clear_state() {
        let clear = ClearState::default();
        assert_eq!(clear.color, Some([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(clear.depth, Some(1.0));
        assert_eq!(ClearState::pick().color, Some([0.0; 4]));
    }

    #[test]
    fn test_view_projection_identity() {
        let uniforms = UniformState::default();
        assert_eq!(uniforms.view_projection(), mat4::IDENTITY);
    }
}
