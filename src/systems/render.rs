//! Scene rendering system
//!
//! Owns the `Scene` over a `WgpuContext` and translates viewer actions into
//! scene calls. Surface loss is recovered here by reconfiguring the surface.

use std::sync::Arc;
use winit::window::Window;

use geoscene_core::{
    Camera, CentralBody, GpuError, PickedObject, PostEffect, PostEffectKind, Scene, SceneError,
    SceneMode, Tunable,
};
use geoscene_math::{Cartesian2, Cartesian3, Extent};
use geoscene_render::{Globe, WgpuContext};

use crate::config::ViewerConfig;

/// Render error types
#[derive(Debug)]
pub enum RenderError {
    /// Surface was lost (window resized, minimized, etc.)
    SurfaceLost,
    /// GPU out of memory
    OutOfMemory,
    /// Any other scene or GPU failure
    Other(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Surface lost"),
            RenderError::OutOfMemory => write!(f, "Out of memory"),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<GpuError> for RenderError {
    fn from(e: GpuError) -> Self {
        match e {
            GpuError::SurfaceLost => RenderError::SurfaceLost,
            GpuError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Other(other.to_string()),
        }
    }
}

impl From<SceneError> for RenderError {
    fn from(e: SceneError) -> Self {
        match e {
            SceneError::Gpu(gpu) => RenderError::from(gpu),
            other => RenderError::Other(other.to_string()),
        }
    }
}

/// Drives the scene for the viewer window
pub struct RenderSystem {
    scene: Scene<WgpuContext>,
    home_region: Extent,
    minimized: bool,
}

impl RenderSystem {
    /// Create the context, the scene and its globe from window and config
    pub fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self, RenderError> {
        let mut context = pollster::block_on(WgpuContext::with_vsync(window, config.window.vsync))?;

        let mut globe = Globe::new(&mut context);
        globe.lighting = config.rendering.lighting;

        let size = context.size;
        let mut camera = Camera::new(size.width, size.height);
        camera.fov_y = config.camera.fov.to_radians();
        camera.near = config.camera.near;
        camera.far = config.camera.far;

        let mut scene = Scene::with_camera(context, Box::new(camera))?;
        let radii = globe.ellipsoid().radii();
        scene.primitives_mut()?.set_central_body(Some(Box::new(globe)));
        log::info!("Central body radii: {:?}", radii);

        let home_region = config.scene.home_extent();
        let mode: SceneMode = config.scene.mode.into();
        if mode == SceneMode::Scene3D {
            scene.set_mode(mode)?;
        } else {
            scene.switch_mode(mode, Some(&home_region))?;
        }
        scene.set_clear_state(config.rendering.clear_state())?;
        scene.set_sun_position(config.rendering.sun())?;
        scene.set_shader_eviction_interval(config.scene.shader_eviction_interval)?;

        let effects = scene.post_effects_mut()?;
        effects.set_step(config.scene.parameter_step);
        if !effects.select(config.scene.post_effect) {
            log::warn!(
                "Post effect index {} out of range (0..{}), keeping {}",
                config.scene.post_effect,
                effects.len(),
                effects.active().kind()
            );
        }

        Ok(Self {
            scene,
            home_region,
            minimized: false,
        })
    }

    /// Handle window resize; a zero size pauses rendering
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.minimized = width == 0 || height == 0;
        self.scene
            .context_mut()?
            .resize(winit::dpi::PhysicalSize::new(width, height));
        Ok(())
    }

    /// Render a single frame
    ///
    /// A lost surface is reconfigured before the error is returned, so the
    /// caller only needs to request another redraw.
    pub fn render_frame(&mut self) -> Result<(), RenderError> {
        if self.minimized {
            return Ok(());
        }

        match self.scene.render_frame() {
            Ok(()) => Ok(()),
            Err(SceneError::Gpu(GpuError::SurfaceLost)) => {
                log::warn!("Surface lost, reconfiguring");
                self.scene.context_mut()?.reconfigure();
                Err(RenderError::SurfaceLost)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Current drawing buffer size
    pub fn size(&self) -> Result<(u32, u32), RenderError> {
        let size = self.scene.context()?.size;
        Ok((size.width, size.height))
    }

    pub fn mode(&self) -> Result<SceneMode, RenderError> {
        Ok(self.scene.mode()?)
    }

    /// Switch mode and land on the home region
    pub fn set_mode(&mut self, mode: SceneMode) -> Result<(), RenderError> {
        if self.scene.mode()? != mode {
            log::info!("Switching to {}", mode);
            self.scene.switch_mode(mode, Some(&self.home_region))?;
        }
        Ok(())
    }

    /// Active post effect and its parameter
    pub fn active_effect(&self) -> Result<(PostEffectKind, f32), RenderError> {
        let effect = self.scene.post_effects()?.active();
        Ok((effect.kind(), effect.parameter()))
    }

    pub fn next_effect(&mut self) -> Result<PostEffectKind, RenderError> {
        Ok(self.scene.select_next_post_effect()?)
    }

    pub fn previous_effect(&mut self) -> Result<PostEffectKind, RenderError> {
        Ok(self.scene.select_previous_post_effect()?)
    }

    pub fn increase_parameter(&mut self) -> Result<f32, RenderError> {
        Ok(self.scene.increase_post_effect_parameter()?)
    }

    pub fn decrease_parameter(&mut self) -> Result<f32, RenderError> {
        Ok(self.scene.decrease_post_effect_parameter()?)
    }

    /// Object and ground point under a window position
    pub fn pick(&mut self, position: Cartesian2) -> Result<(Option<PickedObject>, Option<Cartesian3>), RenderError> {
        let object = self.scene.pick(Some(position))?;
        let ground = self.scene.pick_ground_point(Some(position), None)?;
        Ok((object, ground))
    }

    /// Fit the configured home region into view
    pub fn view_home_region(&mut self) -> Result<(), RenderError> {
        self.scene.view_region(Some(&self.home_region), None)?;
        Ok(())
    }

    /// Release the scene's GPU resources
    pub fn destroy(&mut self) {
        if let Err(e) = self.scene.destroy() {
            log::warn!("Scene teardown: {}", e);
        }
    }
}
