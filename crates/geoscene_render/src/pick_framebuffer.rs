//! Offscreen pick target with single-texel readback

use geoscene_core::{
    ClearState, Framebuffer, GpuContext, GpuError, PickColor, PickFramebuffer, PixelPosition,
    TextureDescription,
};

use crate::context::WgpuContext;
use crate::framebuffer::WgpuFramebuffer;

/// Row pitch of the readback buffer; copies need 256-byte aligned rows
const READBACK_BYTES_PER_ROW: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// Texture row for a framebuffer-space y (origin bottom-left); wgpu rows start at the top
fn texture_row(framebuffer_y: u32, height: u32) -> Option<u32> {
    (framebuffer_y < height).then(|| height - 1 - framebuffer_y)
}

/// Pick target sized to the drawing buffer, recreated when that changes
pub struct WgpuPickFramebuffer {
    framebuffer: Option<WgpuFramebuffer>,
    readback: wgpu::Buffer,
}

impl WgpuPickFramebuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pick Readback Buffer"),
            size: READBACK_BYTES_PER_ROW as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            framebuffer: None,
            readback,
        }
    }

    fn read_texel(&self, context: &mut WgpuContext, position: PixelPosition) -> Result<Option<PickColor>, GpuError> {
        let Some(framebuffer) = self.framebuffer.as_ref() else {
            return Ok(None);
        };
        let (width, height) = framebuffer.size();
        let Some(row) = texture_row(position.y, height) else {
            return Ok(None);
        };
        if position.x >= width {
            return Ok(None);
        }

        context.encoder().copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &framebuffer.color.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: position.x, y: row, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(READBACK_BYTES_PER_ROW),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        context.submit();

        let slice = self.readback.slice(..4);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = context.device.poll(wgpu::Maintain::Wait);

        receiver
            .recv()
            .map_err(|e| GpuError::Readback(e.to_string()))?
            .map_err(|e| GpuError::Readback(e.to_string()))?;
        let rgba = {
            let data = slice.get_mapped_range();
            [data[0], data[1], data[2], data[3]]
        };
        self.readback.unmap();
        Ok(Some(PickColor::from(rgba)))
    }
}

impl PickFramebuffer<WgpuContext> for WgpuPickFramebuffer {
    fn begin(&mut self, context: &mut WgpuContext) -> Result<&WgpuFramebuffer, GpuError> {
        let size = context.drawing_buffer_size();
        let framebuffer = match self.framebuffer.take() {
            Some(framebuffer) if framebuffer.size() == size => framebuffer,
            _ => {
                let (width, height) = size;
                let color = context.create_texture_2d(&TextureDescription::color(width, height))?;
                let depth = context.create_texture_2d(&TextureDescription::depth(width, height))?;
                context.create_framebuffer(color, depth)?
            }
        };
        let framebuffer = self.framebuffer.insert(framebuffer);

        context.bind_framebuffer(Some(&*framebuffer));
        context.clear(&ClearState::pick())?;
        Ok(&*framebuffer)
    }

    fn end(
        &mut self,
        context: &mut WgpuContext,
        position: Option<PixelPosition>,
    ) -> Result<Option<PickColor>, GpuError> {
        context.bind_framebuffer(None);
        match position {
            Some(position) => self.read_texel(context, position),
            None => {
                context.submit();
                Ok(None)
            }
        }
    }
}
