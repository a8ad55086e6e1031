//! The scene: owns the GPU context, camera, primitives and post effects and
//! drives one frame at a time
//!
//! A frame runs animations, updates the camera, loads the camera matrices into
//! the uniform state, runs the user animation callback, rebuilds the
//! [`FrameState`], updates primitives, draws them into an offscreen target and
//! finally composites that target to the drawing buffer through the active
//! post effect. Picking binds and clears a lazily created pick framebuffer
//! first, then reuses the frame-state and update path and reads back one texel.

use geoscene_math::{Cartesian2, Cartesian3, Ellipsoid, EquidistantCylindricalProjection, Extent};

use crate::animation::AnimationCollection;
use crate::camera::{Camera, SceneCamera, ViewSpace};
use crate::error::{GpuError, SceneError};
use crate::frame_state::{FrameInputs, FrameState, Passes};
use crate::gpu::{ClearState, Framebuffer, GpuContext, PickFramebuffer, TextureDescription, Viewport};
use crate::pick::{window_to_framebuffer, PickedObject};
use crate::post_effect::{PostEffect, PostEffectChain, PostEffectKind, Tunable};
use crate::primitive::{CompositePrimitive, Primitive};
use crate::scene_mode::SceneMode;

/// Frames between shader cache sweeps
pub const SHADER_EVICTION_INTERVAL: u32 = 120;

/// Per-frame user hook, run after the camera is updated and before primitives are
pub type AnimateFn<C> = Box<dyn FnMut(&dyn SceneCamera, &mut CompositePrimitive<C>)>;

/// Chain of GPU post effects for a context
pub type PostEffects<C> = PostEffectChain<Box<dyn PostEffect<C>>>;

/// Counts completed frames and fires every `interval`
#[derive(Clone, Copy, Debug)]
struct ShaderEviction {
    frames: u32,
    interval: u32,
}

impl ShaderEviction {
    fn new(interval: u32) -> Self {
        Self {
            frames: 0,
            interval: interval.max(1),
        }
    }

    fn tick(&mut self) -> bool {
        self.frames += 1;
        if self.frames >= self.interval {
            self.frames = 0;
            true
        } else {
            false
        }
    }
}

/// Everything that goes away on destroy
///
/// Fields drop in declaration order, which is the teardown order.
struct SceneResources<C: GpuContext> {
    post_effects: PostEffects<C>,
    offscreen: Option<C::Framebuffer>,
    camera: Box<dyn SceneCamera>,
    pick_framebuffer: Option<C::PickFramebuffer>,
    primitives: CompositePrimitive<C>,
    context: C,
    frame_state: FrameState,
    animations: AnimationCollection,
    animate: Option<AnimateFn<C>>,
    clear_state: ClearState,
    shader_eviction: ShaderEviction,
}

/// A renderable globe scene
pub struct Scene<C: GpuContext> {
    mode: SceneMode,
    morph_time: f64,
    projection: EquidistantCylindricalProjection,
    frame_number: u64,
    resources: Option<SceneResources<C>>,
}

impl<C: GpuContext> Scene<C> {
    /// Create a scene with the stock [`Camera`]
    pub fn new(context: C) -> Result<Self, SceneError> {
        let (width, height) = context.drawing_buffer_size();
        Self::with_camera(context, Box::new(Camera::new(width, height)))
    }

    /// Create a scene around a given camera
    ///
    /// Builds one post effect of every kind, the first one active.
    pub fn with_camera(mut context: C, camera: Box<dyn SceneCamera>) -> Result<Self, SceneError> {
        let viewport = Viewport::full(context.drawing_buffer_size());
        let effects = PostEffectKind::ALL
            .iter()
            .map(|kind| context.create_post_effect(*kind, viewport))
            .collect::<Result<Vec<_>, GpuError>>()?;
        let post_effects = PostEffectChain::new(effects).ok_or(SceneError::NoPostEffects)?;
        log::info!("Scene created with {} post effects", post_effects.len());

        Ok(Self {
            mode: SceneMode::Scene3D,
            morph_time: 1.0,
            projection: EquidistantCylindricalProjection::new(Ellipsoid::WGS84),
            frame_number: 0,
            resources: Some(SceneResources {
                post_effects,
                offscreen: None,
                camera,
                pick_framebuffer: None,
                primitives: CompositePrimitive::new(),
                context,
                frame_state: FrameState::new(),
                animations: AnimationCollection::new(),
                animate: None,
                clear_state: ClearState::default(),
                shader_eviction: ShaderEviction::new(SHADER_EVICTION_INTERVAL),
            }),
        })
    }

    fn live(&self) -> Result<&SceneResources<C>, SceneError> {
        self.resources.as_ref().ok_or(SceneError::Destroyed)
    }

    fn live_mut(&mut self) -> Result<&mut SceneResources<C>, SceneError> {
        self.resources.as_mut().ok_or(SceneError::Destroyed)
    }

    pub fn mode(&self) -> Result<SceneMode, SceneError> {
        self.live()?;
        Ok(self.mode)
    }

    pub fn set_mode(&mut self, mode: SceneMode) -> Result<(), SceneError> {
        self.live()?;
        if mode != self.mode {
            log::info!("Scene mode {} -> {}", self.mode, mode);
        }
        self.mode = mode;
        if let Some(morph_time) = mode.morph_time() {
            self.morph_time = morph_time;
        }
        Ok(())
    }

    /// Change mode and, when given, fit `extent` into the new view
    pub fn switch_mode(&mut self, mode: SceneMode, extent: Option<&Extent>) -> Result<(), SceneError> {
        self.set_mode(mode)?;
        match extent {
            Some(extent) => self.view_region(Some(extent), None),
            None => Ok(()),
        }
    }

    /// 1.0 in 3D, 0.0 in the flat modes, in between while morphing
    pub fn morph_time(&self) -> Result<f64, SceneError> {
        self.live()?;
        Ok(self.morph_time)
    }

    pub fn set_morph_time(&mut self, morph_time: f64) -> Result<(), SceneError> {
        self.live()?;
        self.morph_time = morph_time.clamp(0.0, 1.0);
        Ok(())
    }

    /// Projection used by 2D and Columbus view
    pub fn projection(&self) -> Result<&EquidistantCylindricalProjection, SceneError> {
        self.live()?;
        Ok(&self.projection)
    }

    pub fn set_projection(&mut self, projection: EquidistantCylindricalProjection) -> Result<(), SceneError> {
        self.live()?;
        self.projection = projection;
        Ok(())
    }

    /// Number of frames rendered so far
    pub fn frame_number(&self) -> Result<u64, SceneError> {
        self.live()?;
        Ok(self.frame_number)
    }

    pub fn is_destroyed(&self) -> bool {
        self.resources.is_none()
    }

    pub fn context(&self) -> Result<&C, SceneError> {
        Ok(&self.live()?.context)
    }

    pub fn context_mut(&mut self) -> Result<&mut C, SceneError> {
        Ok(&mut self.live_mut()?.context)
    }

    pub fn camera(&self) -> Result<&dyn SceneCamera, SceneError> {
        Ok(self.live()?.camera.as_ref())
    }

    pub fn camera_mut(&mut self) -> Result<&mut (dyn SceneCamera + 'static), SceneError> {
        Ok(self.live_mut()?.camera.as_mut())
    }

    pub fn primitives(&self) -> Result<&CompositePrimitive<C>, SceneError> {
        Ok(&self.live()?.primitives)
    }

    pub fn primitives_mut(&mut self) -> Result<&mut CompositePrimitive<C>, SceneError> {
        Ok(&mut self.live_mut()?.primitives)
    }

    pub fn animations_mut(&mut self) -> Result<&mut AnimationCollection, SceneError> {
        Ok(&mut self.live_mut()?.animations)
    }

    /// The frame state built by the most recent render or pick
    pub fn frame_state(&self) -> Result<&FrameState, SceneError> {
        Ok(&self.live()?.frame_state)
    }

    pub fn post_effects(&self) -> Result<&PostEffects<C>, SceneError> {
        Ok(&self.live()?.post_effects)
    }

    pub fn post_effects_mut(&mut self) -> Result<&mut PostEffects<C>, SceneError> {
        Ok(&mut self.live_mut()?.post_effects)
    }

    /// Install (or with `None` remove) the per-frame animation callback
    pub fn set_animation(&mut self, animate: Option<AnimateFn<C>>) -> Result<(), SceneError> {
        self.live_mut()?.animate = animate;
        Ok(())
    }

    pub fn set_clear_state(&mut self, clear_state: ClearState) -> Result<(), SceneError> {
        self.live_mut()?.clear_state = clear_state;
        Ok(())
    }

    /// Change how many frames pass between shader cache sweeps
    pub fn set_shader_eviction_interval(&mut self, frames: u32) -> Result<(), SceneError> {
        self.live_mut()?.shader_eviction = ShaderEviction::new(frames);
        Ok(())
    }

    /// Sun position in world coordinates, for lighting
    pub fn sun_position(&self) -> Result<Cartesian3, SceneError> {
        Ok(self.live()?.context.uniform_state().sun_position())
    }

    pub fn set_sun_position(&mut self, position: Cartesian3) -> Result<(), SceneError> {
        self.live_mut()?.context.uniform_state_mut().set_sun_position(position);
        Ok(())
    }

    /// Select the next post effect, wrapping around
    pub fn select_next_post_effect(&mut self) -> Result<PostEffectKind, SceneError> {
        let effects = &mut self.live_mut()?.post_effects;
        effects.select_next();
        log::info!("Post effect: {}", effects.active().kind());
        Ok(effects.active().kind())
    }

    /// Select the previous post effect, wrapping around
    pub fn select_previous_post_effect(&mut self) -> Result<PostEffectKind, SceneError> {
        let effects = &mut self.live_mut()?.post_effects;
        effects.select_previous();
        log::info!("Post effect: {}", effects.active().kind());
        Ok(effects.active().kind())
    }

    /// Lower the active effect's parameter by one step
    pub fn increase_post_effect_parameter(&mut self) -> Result<f32, SceneError> {
        let effects = &mut self.live_mut()?.post_effects;
        effects.increase_parameter();
        Ok(effects.active().parameter())
    }

    /// Raise the active effect's parameter by one step
    pub fn decrease_post_effect_parameter(&mut self) -> Result<f32, SceneError> {
        let effects = &mut self.live_mut()?.post_effects;
        effects.decrease_parameter();
        Ok(effects.active().parameter())
    }

    fn next_frame_inputs<'a>(
        mode: SceneMode,
        morph_time: f64,
        frame_number: u64,
        projection: &'a EquidistantCylindricalProjection,
        camera: &'a dyn SceneCamera,
        primitives: &'a CompositePrimitive<C>,
    ) -> FrameInputs<'a> {
        FrameInputs {
            mode,
            morph_time,
            frame_number,
            camera,
            projection,
            central_body: primitives.central_body_ellipsoid(),
        }
    }

    /// Render one frame to the drawing buffer
    pub fn render_frame(&mut self) -> Result<(), SceneError> {
        let resources = self.resources.as_mut().ok_or(SceneError::Destroyed)?;
        let size = resources.context.drawing_buffer_size();

        resources.animations.update();
        resources.camera.update(size);

        let uniforms = resources.context.uniform_state_mut();
        uniforms.set_projection(resources.camera.projection_matrix());
        if let Some(infinite) = resources.camera.infinite_projection_matrix() {
            uniforms.set_infinite_projection(infinite);
        }
        uniforms.set_view(resources.camera.view_matrix());

        if let Some(animate) = resources.animate.as_mut() {
            animate(resources.camera.as_ref(), &mut resources.primitives);
        }

        self.frame_number += 1;
        let inputs = Self::next_frame_inputs(
            self.mode,
            self.morph_time,
            self.frame_number,
            &self.projection,
            resources.camera.as_ref(),
            &resources.primitives,
        );
        resources.frame_state.rebuild(&inputs);

        resources.primitives.update(&mut resources.context, &resources.frame_state)?;

        let offscreen = ensure_offscreen_target(
            &mut resources.context,
            &mut resources.offscreen,
            &mut resources.post_effects,
            size,
        )?;
        resources.context.bind_framebuffer(Some(offscreen));
        resources.context.clear(&resources.clear_state)?;
        resources.primitives.render(&mut resources.context)?;
        resources.context.bind_framebuffer(None);

        let effect = resources.post_effects.active_mut();
        effect.update(&mut resources.context, offscreen)?;
        effect.render(&mut resources.context)?;
        resources.context.present()?;

        if resources.shader_eviction.tick() {
            log::debug!("Frame {}: destroying released shader programs", self.frame_number);
            resources.context.destroy_released_shader_programs();
        }
        Ok(())
    }

    /// Object under a window position (origin top-left), if any
    pub fn pick(&mut self, window_position: Option<Cartesian2>) -> Result<Option<PickedObject>, SceneError> {
        let resources = self.resources.as_mut().ok_or(SceneError::Destroyed)?;
        let window_position = window_position.ok_or(SceneError::MissingArgument("window_position"))?;
        let size = resources.context.drawing_buffer_size();

        let pick_framebuffer = match resources.pick_framebuffer.take() {
            Some(framebuffer) => framebuffer,
            None => {
                log::debug!("Creating pick framebuffer");
                resources.context.create_pick_framebuffer()?
            }
        };
        let pick_framebuffer = resources.pick_framebuffer.insert(pick_framebuffer);
        let target = pick_framebuffer.begin(&mut resources.context)?;

        let inputs = Self::next_frame_inputs(
            self.mode,
            self.morph_time,
            self.frame_number,
            &self.projection,
            resources.camera.as_ref(),
            &resources.primitives,
        );
        resources.frame_state.rebuild(&inputs);
        resources.frame_state.set_passes(Passes::PICK);

        let drawn = match resources.primitives.update(&mut resources.context, &resources.frame_state) {
            Ok(()) => resources.primitives.render_for_pick(&mut resources.context, target),
            Err(e) => Err(e),
        };
        if let Err(e) = drawn {
            pick_framebuffer.end(&mut resources.context, None)?;
            return Err(e);
        }

        let texel = window_to_framebuffer(window_position, size);
        let color = pick_framebuffer.end(&mut resources.context, texel)?;

        let picked = color
            .and_then(|color| color.to_id())
            .and_then(|id| resources.context.pick_ids().get(id).cloned());
        log::debug!(
            "Pick at ({}, {}) -> {:?}",
            window_position.x,
            window_position.y,
            picked.as_ref().map(|object| object.name.as_str())
        );
        Ok(picked)
    }

    /// Point on the ground under a window position
    ///
    /// `ellipsoid` defaults to WGS84 and only matters in 3D; the flat modes
    /// use the scene's projection. Returns `None` while morphing.
    pub fn pick_ground_point(
        &self,
        window_position: Option<Cartesian2>,
        ellipsoid: Option<&Ellipsoid>,
    ) -> Result<Option<Cartesian3>, SceneError> {
        let resources = self.live()?;
        let window_position = window_position.ok_or(SceneError::MissingArgument("window_position"))?;
        let ellipsoid = ellipsoid.copied().unwrap_or_default();

        let Some(space) = view_space(self.mode, &ellipsoid, &self.projection) else {
            return Ok(None);
        };
        Ok(resources.camera.pick(window_position, space))
    }

    /// Move the camera so `extent` fills the view
    ///
    /// `ellipsoid` defaults to WGS84 and only matters in 3D. Does nothing
    /// while morphing.
    pub fn view_region(&mut self, extent: Option<&Extent>, ellipsoid: Option<&Ellipsoid>) -> Result<(), SceneError> {
        let resources = self.resources.as_mut().ok_or(SceneError::Destroyed)?;
        let extent = extent.ok_or(SceneError::MissingArgument("extent"))?;
        let ellipsoid = ellipsoid.copied().unwrap_or_default();

        if let Some(space) = view_space(self.mode, &ellipsoid, &self.projection) {
            resources.camera.view_extent(extent, space);
        }
        Ok(())
    }

    /// Release every GPU resource; the scene is unusable afterwards
    pub fn destroy(&mut self) -> Result<(), SceneError> {
        let resources = self.resources.take().ok_or(SceneError::Destroyed)?;
        let SceneResources {
            post_effects,
            offscreen,
            camera,
            pick_framebuffer,
            primitives,
            context,
            ..
        } = resources;

        // Targets first, then camera, pick framebuffer, primitives and finally the context.
        drop(post_effects);
        drop(offscreen);
        drop(camera);
        drop(pick_framebuffer);
        drop(primitives);
        drop(context);

        log::info!("Scene destroyed after {} frames", self.frame_number);
        Ok(())
    }
}

/// Geometry mode-dependent camera queries run against, `None` while morphing
fn view_space<'a>(
    mode: SceneMode,
    ellipsoid: &'a Ellipsoid,
    projection: &'a EquidistantCylindricalProjection,
) -> Option<ViewSpace<'a>> {
    match mode {
        SceneMode::Scene3D => Some(ViewSpace::Globe(ellipsoid)),
        SceneMode::Scene2D => Some(ViewSpace::Map2D(projection)),
        SceneMode::ColumbusView => Some(ViewSpace::Columbus(projection)),
        SceneMode::Morphing => None,
    }
}

/// Offscreen color + depth target matching the drawing buffer
///
/// Recreated (and the post effects resized) whenever the size changes.
fn ensure_offscreen_target<'f, C: GpuContext>(
    context: &mut C,
    slot: &'f mut Option<C::Framebuffer>,
    post_effects: &mut PostEffects<C>,
    size: (u32, u32),
) -> Result<&'f C::Framebuffer, GpuError> {
    let framebuffer = match slot.take() {
        Some(framebuffer) if framebuffer.size() == size => framebuffer,
        previous => {
            if previous.is_some() {
                log::info!("Drawing buffer resized to {}x{}, recreating offscreen target", size.0, size.1);
            }
            drop(previous);

            let (width, height) = size;
            let color = context.create_texture_2d(&TextureDescription::color(width, height))?;
            let depth = context.create_texture_2d(&TextureDescription::depth(width, height))?;
            let framebuffer = context.create_framebuffer(color, depth)?;
            for effect in post_effects.iter_mut() {
                effect.resize(Viewport::full(size));
            }
            framebuffer
        }
    };
    Ok(&*slot.insert(framebuffer))
}
