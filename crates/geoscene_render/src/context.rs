//! wgpu implementation of the scene's GPU context
//!
//! Owns the device, queue and surface. Work for a frame is recorded into one
//! command encoder that is submitted on [`GpuContext::present`] (or earlier,
//! when a pick needs its readback). The surface texture is acquired lazily,
//! the first time something draws to the default drawing buffer.

use std::sync::Arc;

use geoscene_core::{
    ClearState, GpuContext, GpuError, PickIdRegistry, PostEffect, PostEffectKind, TextureDescription,
    UniformState, Viewport,
};
use winit::window::Window;

use crate::framebuffer::{WgpuFramebuffer, WgpuTexture};
use crate::pick_framebuffer::WgpuPickFramebuffer;
use crate::shader_cache::{ShaderCache, ShaderProgram};
use crate::viewport_quad::ViewportQuad;

/// The target draws currently go to
#[derive(Clone)]
enum BoundTarget {
    Default,
    Offscreen {
        color: Arc<wgpu::TextureView>,
        depth: Arc<wgpu::TextureView>,
    },
}

struct SurfaceFrame {
    texture: wgpu::SurfaceTexture,
    view: Arc<wgpu::TextureView>,
}

/// GPU context backed by a wgpu device and a window surface
pub struct WgpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    uniforms: UniformState,
    pick_ids: PickIdRegistry,
    shaders: ShaderCache,
    encoder: Option<wgpu::CommandEncoder>,
    surface_frame: Option<SurfaceFrame>,
    bound: BoundTarget,
}

impl WgpuContext {
    /// Create a context for a window with vsync enabled
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        Self::with_vsync(window, true).await
    }

    /// Create a context for a window
    pub async fn with_vsync(window: Arc<Window>, vsync: bool) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .map_err(|e| GpuError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| GpuError::DeviceRequest("no suitable adapter".to_string()))?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("GeoScene Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| GpuError::DeviceRequest(e.to_string()))?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| GpuError::Surface("surface reports no formats".to_string()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            uniforms: UniformState::default(),
            pick_ids: PickIdRegistry::new(),
            shaders: ShaderCache::new(),
            encoder: None,
            surface_frame: None,
            bound: BoundTarget::Default,
        })
    }

    /// Reconfigure the surface for a new window size
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure with the current size, after the surface was lost
    pub fn reconfigure(&mut self) {
        self.surface_frame = None;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.size.width as f32 / self.size.height.max(1) as f32
    }

    /// Format of the default drawing buffer
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Shader program for `label`, compiled from `source` on first use
    pub fn shader(&mut self, label: &str, source: &str) -> Arc<ShaderProgram> {
        let device = &self.device;
        self.shaders.get_or_insert_with(label, || ShaderProgram {
            label: label.to_string(),
            module: device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            }),
        })
    }

    /// This frame's command encoder
    pub fn encoder(&mut self) -> &mut wgpu::CommandEncoder {
        let device = &self.device;
        self.encoder.get_or_insert_with(|| {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            })
        })
    }

    /// Submit recorded work without presenting
    pub fn submit(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
    }

    fn surface_view(&mut self) -> Result<Arc<wgpu::TextureView>, GpuError> {
        let frame = match self.surface_frame.take() {
            Some(frame) => frame,
            None => {
                let texture = match self.surface.get_current_texture() {
                    Ok(texture) => texture,
                    Err(wgpu::SurfaceError::Lost) => return Err(GpuError::SurfaceLost),
                    Err(wgpu::SurfaceError::OutOfMemory) => return Err(GpuError::OutOfMemory),
                    Err(e) => return Err(GpuError::Surface(format!("{:?}", e))),
                };
                let view = Arc::new(texture.texture.create_view(&wgpu::TextureViewDescriptor::default()));
                SurfaceFrame { texture, view }
            }
        };
        let view = frame.view.clone();
        self.surface_frame = Some(frame);
        Ok(view)
    }

    /// Whether draws currently go to the default drawing buffer
    pub fn is_default_target_bound(&self) -> bool {
        matches!(self.bound, BoundTarget::Default)
    }

    /// Begin a render pass on the bound target
    ///
    /// With `clear`, the attachments it names are cleared first; otherwise
    /// their contents are kept. The default drawing buffer has no depth.
    pub fn begin_render_pass(
        &mut self,
        label: &str,
        clear: Option<&ClearState>,
    ) -> Result<wgpu::RenderPass<'_>, GpuError> {
        let (color, depth) = match self.bound.clone() {
            BoundTarget::Default => (self.surface_view()?, None),
            BoundTarget::Offscreen { color, depth } => (color, Some(depth)),
        };

        let color_load = match clear.and_then(|c| c.color) {
            Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            }),
            None => wgpu::LoadOp::Load,
        };
        let depth_load = match clear.and_then(|c| c.depth) {
            Some(value) => wgpu::LoadOp::Clear(value),
            None => wgpu::LoadOp::Load,
        };

        let pass = self.encoder().begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: depth.as_deref().map(|view| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        Ok(pass)
    }

    /// Number of shader programs currently cached
    pub fn cached_shader_count(&self) -> usize {
        self.shaders.len()
    }
}

impl GpuContext for WgpuContext {
    type Texture = WgpuTexture;
    type Framebuffer = WgpuFramebuffer;
    type PickFramebuffer = WgpuPickFramebuffer;

    fn drawing_buffer_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn create_texture_2d(&mut self, description: &TextureDescription) -> Result<WgpuTexture, GpuError> {
        WgpuTexture::new(&self.device, description)
    }

    fn create_framebuffer(&mut self, color: WgpuTexture, depth: WgpuTexture) -> Result<WgpuFramebuffer, GpuError> {
        WgpuFramebuffer::new(color, depth)
    }

    fn create_pick_framebuffer(&mut self) -> Result<WgpuPickFramebuffer, GpuError> {
        Ok(WgpuPickFramebuffer::new(&self.device))
    }

    fn create_post_effect(
        &mut self,
        kind: PostEffectKind,
        viewport: Viewport,
    ) -> Result<Box<dyn PostEffect<Self>>, GpuError> {
        Ok(Box::new(ViewportQuad::new(self, kind, viewport)))
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<&WgpuFramebuffer>) {
        self.bound = match framebuffer {
            Some(framebuffer) => BoundTarget::Offscreen {
                color: framebuffer.color.view.clone(),
                depth: framebuffer.depth.view.clone(),
            },
            None => BoundTarget::Default,
        };
    }

    fn clear(&mut self, clear_state: &ClearState) -> Result<(), GpuError> {
        // An empty pass with clear load ops is the clear.
        self.begin_render_pass("Clear Pass", Some(clear_state))?;
        Ok(())
    }

    fn uniform_state(&self) -> &UniformState {
        &self.uniforms
    }

    fn uniform_state_mut(&mut self) -> &mut UniformState {
        &mut self.uniforms
    }

    fn destroy_released_shader_programs(&mut self) {
        self.shaders.destroy_released();
    }

    fn pick_ids(&mut self) -> &mut PickIdRegistry {
        &mut self.pick_ids
    }

    fn present(&mut self) -> Result<(), GpuError> {
        self.submit();
        if let Some(frame) = self.surface_frame.take() {
            frame.texture.present();
        }
        Ok(())
    }
}
