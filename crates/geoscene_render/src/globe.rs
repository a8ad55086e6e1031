//! Ray-cast globe central body
//!
//! The globe has no mesh. A full-screen triangle carries one camera ray per
//! corner; the fragment shader intersects the interpolated ray with the unit
//! sphere (3D) or the `z = 0` map plane (2D and Columbus view), shades a
//! latitude/longitude grid and writes real depth so later primitives and the
//! depth-based post effects see the surface.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use geoscene_core::{
    CentralBody, FrameState, GpuContext, PickColor, PickId, PickedObject, Primitive, SceneError,
    SceneMode,
};
use geoscene_math::{mat4, Cartesian3, Ellipsoid, Mat4, MapProjection};

use crate::context::WgpuContext;
use crate::framebuffer::{WgpuFramebuffer, OFFSCREEN_COLOR_FORMAT, OFFSCREEN_DEPTH_FORMAT};
use crate::shader_cache::ShaderProgram;
use crate::types::GlobeUniforms;

const GLOBE_SHADER: &str = include_str!("shaders/globe.wgsl");

/// Full-screen triangle corners in NDC
const CORNERS: [[f64; 2]; 3] = [[-1.0, -1.0], [3.0, -1.0], [-1.0, 3.0]];

/// Camera rays through the full-screen triangle corners, divided by `scale`
///
/// Returns `(origins, directions)` or `None` if the matrix can't be inverted.
pub fn corner_rays(view_projection: Mat4, scale: Cartesian3) -> Option<([[f32; 4]; 3], [[f32; 4]; 3])> {
    let mut origins = [[0.0; 4]; 3];
    let mut directions = [[0.0; 4]; 3];
    for (i, [x, y]) in CORNERS.iter().copied().enumerate() {
        let near = mat4::unproject(view_projection, [x, y, 0.0])?.component_div(scale);
        let far = mat4::unproject(view_projection, [x, y, 1.0])?.component_div(scale);
        let [ox, oy, oz] = near.to_f32_array();
        let [dx, dy, dz] = (far - near).to_f32_array();
        origins[i] = [ox, oy, oz, 1.0];
        directions[i] = [dx, dy, dz, 0.0];
    }
    Some((origins, directions))
}

/// The central body: WGS84 (or any ellipsoid) drawn as a gridded globe or flat map
pub struct Globe {
    ellipsoid: Ellipsoid,
    pick_id: PickId,
    /// Shade with the sun direction from the uniform state
    pub lighting: bool,
    visible: bool,
    uniforms: GlobeUniforms,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    render_pipeline: wgpu::RenderPipeline,
    pick_pipeline: wgpu::RenderPipeline,
    _shader: Arc<ShaderProgram>,
}

impl Globe {
    /// Create a WGS84 globe
    pub fn new(context: &mut WgpuContext) -> Self {
        Self::with_ellipsoid(context, Ellipsoid::WGS84)
    }

    pub fn with_ellipsoid(context: &mut WgpuContext, ellipsoid: Ellipsoid) -> Self {
        let shader = context.shader("globe", GLOBE_SHADER);
        let pick_id = context.pick_ids().allocate(PickedObject::new("Earth"));
        let device = &context.device;

        let uniforms = GlobeUniforms {
            pick_color: PickColor::from_id(pick_id).to_f32_array(),
            ..Default::default()
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globe Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globe Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globe Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Globe Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, fragment_entry: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader.module,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader.module,
                    entry_point: Some(fragment_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: OFFSCREEN_COLOR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: OFFSCREEN_DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let render_pipeline = make_pipeline("Globe Pipeline", "fs_main");
        let pick_pipeline = make_pipeline("Globe Pick Pipeline", "fs_pick");

        log::info!("Created globe with radii {:?}", ellipsoid.radii());

        Self {
            ellipsoid,
            pick_id,
            lighting: true,
            visible: false,
            uniforms,
            uniform_buffer,
            bind_group,
            render_pipeline,
            pick_pipeline,
            _shader: shader,
        }
    }

    pub fn pick_id(&self) -> PickId {
        self.pick_id
    }

    fn draw(&self, context: &mut WgpuContext, label: &str, pipeline: &wgpu::RenderPipeline) -> Result<(), SceneError> {
        if !self.visible {
            return Ok(());
        }
        let mut pass = context.begin_render_pass(label, None)?;
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
        Ok(())
    }
}

impl Primitive<WgpuContext> for Globe {
    fn update(&mut self, context: &mut WgpuContext, frame_state: &FrameState) -> Result<(), SceneError> {
        let camera = frame_state.camera();
        let view_projection = mat4::mul(camera.projection, camera.view);

        let flat = matches!(frame_state.mode(), SceneMode::Scene2D | SceneMode::ColumbusView);
        let scale = if flat {
            let a = frame_state.projection().ellipsoid().maximum_radius();
            Cartesian3::new(a, a, a)
        } else {
            self.ellipsoid.radii()
        };

        let Some((origins, directions)) = corner_rays(view_projection, scale) else {
            log::debug!("Globe skipped: camera matrices are singular");
            self.visible = false;
            return Ok(());
        };
        self.visible = true;

        let sun = context.uniform_state().sun_position();
        let sun_direction = if sun.magnitude_squared() > 0.0 {
            sun.normalized()
        } else {
            Cartesian3::UNIT_X
        };
        let [sx, sy, sz] = sun_direction.to_f32_array();
        let [kx, ky, kz] = scale.to_f32_array();

        self.uniforms = GlobeUniforms {
            view_projection,
            ray_origins: origins,
            ray_directions: directions,
            scale: [kx, ky, kz, if flat { 1.0 } else { 0.0 }],
            sun_direction: [sx, sy, sz, if self.lighting && !flat { 1.0 } else { 0.0 }],
            pick_color: PickColor::from_id(self.pick_id).to_f32_array(),
        };
        context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
        Ok(())
    }

    fn render(&mut self, context: &mut WgpuContext) -> Result<(), SceneError> {
        self.draw(context, "Globe Pass", &self.render_pipeline)
    }

    fn render_for_pick(&mut self, context: &mut WgpuContext, _framebuffer: &WgpuFramebuffer) -> Result<(), SceneError> {
        self.draw(context, "Globe Pick Pass", &self.pick_pipeline)
    }
}

impl CentralBody<WgpuContext> for Globe {
    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}
