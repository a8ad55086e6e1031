//! Full-screen post-effect pass
//!
//! A viewport quad draws one full-screen triangle that reads the offscreen
//! color and depth with `textureLoad` and writes the effect's output to the
//! default drawing buffer. All effects share one shader; a uniform selects
//! the effect and carries its parameter `t`.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use geoscene_core::{GpuError, PostEffect, PostEffectKind, Tunable, Viewport};

use crate::context::WgpuContext;
use crate::framebuffer::WgpuFramebuffer;
use crate::shader_cache::ShaderProgram;
use crate::types::PostFxUniforms;

const POST_FX_SHADER: &str = include_str!("shaders/post_fx.wgsl");

/// Starting value of `t` for every effect
///
/// Brightness and contrast scale by `2 - t`, so 1.0 leaves the image unchanged.
pub const DEFAULT_PARAMETER: f32 = 1.0;

/// One post effect drawn as a full-screen triangle
pub struct ViewportQuad {
    kind: PostEffectKind,
    t: f32,
    viewport: Viewport,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    bind_group: Option<wgpu::BindGroup>,
    _shader: Arc<ShaderProgram>,
}

impl ViewportQuad {
    pub fn new(context: &mut WgpuContext, kind: PostEffectKind, viewport: Viewport) -> Self {
        let shader = context.shader("post_fx", POST_FX_SHADER);
        let device = &context.device;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Post FX Bind Group Layout"),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Scene color
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Scene depth
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Post FX Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(kind.name()),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader.module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader.module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: context.surface_format(),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Post FX Uniform Buffer"),
            contents: bytemuck::bytes_of(&PostFxUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            kind,
            t: DEFAULT_PARAMETER,
            viewport,
            pipeline,
            bind_group_layout,
            uniform_buffer,
            bind_group: None,
            _shader: shader,
        }
    }

    fn uniforms(&self) -> PostFxUniforms {
        PostFxUniforms {
            t: self.t,
            effect: self.kind.shader_index(),
            width: self.viewport.width as f32,
            height: self.viewport.height as f32,
        }
    }
}

impl Tunable for ViewportQuad {
    fn parameter(&self) -> f32 {
        self.t
    }

    fn set_parameter(&mut self, value: f32) {
        self.t = value;
    }
}

impl PostEffect<WgpuContext> for ViewportQuad {
    fn kind(&self) -> PostEffectKind {
        self.kind
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.bind_group = None;
    }

    fn update(&mut self, context: &mut WgpuContext, source: &WgpuFramebuffer) -> Result<(), GpuError> {
        self.bind_group = Some(context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Post FX Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&source.color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&source.depth.view),
                },
            ],
        }));
        context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms()));
        Ok(())
    }

    fn render(&mut self, context: &mut WgpuContext) -> Result<(), GpuError> {
        let Some(bind_group) = self.bind_group.as_ref() else {
            return Err(GpuError::ResourceCreation(format!(
                "{} effect rendered before update",
                self.kind
            )));
        };

        let viewport = self.viewport;
        let mut pass = context.begin_render_pass("Post FX Pass", None)?;
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_viewport(
            viewport.x as f32,
            viewport.y as f32,
            viewport.width as f32,
            viewport.height as f32,
            0.0,
            1.0,
        );
        pass.draw(0..3, 0..1);
        Ok(())
    }
}
