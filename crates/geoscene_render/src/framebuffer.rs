//! wgpu textures and color + depth framebuffers

use std::sync::Arc;

use geoscene_core::{Framebuffer, GpuError, PixelDatatype, PixelFormat, TextureDescription};

/// Color format of offscreen and pick targets
pub const OFFSCREEN_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Depth format of offscreen and pick targets
pub const OFFSCREEN_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth16Unorm;

/// wgpu format for a texture description
pub fn texture_format(description: &TextureDescription) -> Result<wgpu::TextureFormat, GpuError> {
    use PixelDatatype::*;
    use PixelFormat::*;

    match (description.pixel_format, description.pixel_datatype) {
        (Rgba, UnsignedByte) => Ok(wgpu::TextureFormat::Rgba8Unorm),
        (Rgba, Float) => Ok(wgpu::TextureFormat::Rgba32Float),
        (DepthComponent, UnsignedShort) => Ok(wgpu::TextureFormat::Depth16Unorm),
        (DepthComponent, UnsignedInt) => Ok(wgpu::TextureFormat::Depth24Plus),
        (DepthComponent, Float) => Ok(wgpu::TextureFormat::Depth32Float),
        (format, datatype) => Err(GpuError::ResourceCreation(format!(
            "unsupported texture layout {:?}/{:?}",
            format, datatype
        ))),
    }
}

/// Usages a texture of this layout needs: everything is sampled by post
/// effects, color is also copied out for pick readback
pub fn texture_usage(description: &TextureDescription) -> wgpu::TextureUsages {
    let usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
    match description.pixel_format {
        PixelFormat::Rgba => usage | wgpu::TextureUsages::COPY_SRC,
        PixelFormat::DepthComponent => usage,
    }
}

/// A 2D texture plus its default view
#[derive(Debug)]
pub struct WgpuTexture {
    pub texture: wgpu::Texture,
    pub view: Arc<wgpu::TextureView>,
    pub description: TextureDescription,
}

impl WgpuTexture {
    pub fn new(device: &wgpu::Device, description: &TextureDescription) -> Result<Self, GpuError> {
        description.validate()?;
        let format = texture_format(description)?;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Texture"),
            size: wgpu::Extent3d {
                width: description.width,
                height: description.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: texture_usage(description),
            view_formats: &[],
        });
        let view = Arc::new(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        Ok(Self {
            texture,
            view,
            description: *description,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.description.width, self.description.height)
    }
}

/// Color + depth render target
#[derive(Debug)]
pub struct WgpuFramebuffer {
    pub color: WgpuTexture,
    pub depth: WgpuTexture,
}

impl WgpuFramebuffer {
    /// Pair two textures; both must be the same size and the right kinds
    pub fn new(color: WgpuTexture, depth: WgpuTexture) -> Result<Self, GpuError> {
        if color.description.pixel_format != PixelFormat::Rgba
            || depth.description.pixel_format != PixelFormat::DepthComponent
        {
            return Err(GpuError::ResourceCreation(
                "framebuffer needs an RGBA color and a depth attachment".to_string(),
            ));
        }
        if color.size() != depth.size() {
            return Err(GpuError::ResourceCreation(format!(
                "attachment sizes differ: {:?} vs {:?}",
                color.size(),
                depth.size()
            )));
        }
        Ok(Self { color, depth })
    }
}

impl Framebuffer for WgpuFramebuffer {
    type Texture = WgpuTexture;

    fn color_texture(&self) -> &WgpuTexture {
        &self.color
    }

    fn depth_texture(&self) -> &WgpuTexture {
        &self.depth
    }

    fn size(&self) -> (u32, u32) {
        self.color.size()
    }
}
