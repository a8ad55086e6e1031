//! Per-frame snapshot handed to every primitive
//!
//! The scene rebuilds the [`FrameState`] once per render and once per pick.
//! Primitives only ever see it by shared reference, so within one frame every
//! primitive observes identical values.

use bitflags::bitflags;
use geoscene_math::{mat4, BoundingSphere, Cartesian3, Ellipsoid, EquidistantCylindricalProjection, Mat4, Occluder};

use crate::camera::SceneCamera;
use crate::scene_mode::SceneMode;

bitflags! {
    /// Special passes a frame may be running
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Passes: u8 {
        /// Primitives draw pick ids instead of shaded color
        const PICK = 1 << 0;
    }
}

/// Copy of the camera values taken when the frame state was built
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSnapshot {
    pub position_wc: Cartesian3,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for CameraSnapshot {
    fn default() -> Self {
        Self {
            position_wc: Cartesian3::ZERO,
            view: mat4::IDENTITY,
            projection: mat4::IDENTITY,
        }
    }
}

impl CameraSnapshot {
    pub fn of(camera: &dyn SceneCamera) -> Self {
        Self {
            position_wc: camera.position_wc(),
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
        }
    }
}

/// Scene values a frame state is rebuilt from
pub struct FrameInputs<'a> {
    pub mode: SceneMode,
    pub morph_time: f64,
    pub frame_number: u64,
    pub camera: &'a dyn SceneCamera,
    pub projection: &'a EquidistantCylindricalProjection,
    /// Ellipsoid of the central body, if the scene has one
    pub central_body: Option<&'a Ellipsoid>,
}

/// Horizon occluder for the current frame
///
/// Only a 3D scene with a central body occludes; the sphere is the body's
/// inscribed sphere so nothing visible is ever culled.
pub fn compute_occluder(
    mode: SceneMode,
    central_body: Option<&Ellipsoid>,
    camera_position: Cartesian3,
) -> Option<Occluder> {
    match (mode, central_body) {
        (SceneMode::Scene3D, Some(ellipsoid)) => {
            let sphere = BoundingSphere::new(Cartesian3::ZERO, ellipsoid.minimum_radius());
            Some(Occluder::new(sphere, camera_position))
        }
        _ => None,
    }
}

/// Read-only per-frame context
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameState {
    mode: SceneMode,
    morph_time: f64,
    frame_number: u64,
    camera: CameraSnapshot,
    projection: EquidistantCylindricalProjection,
    occluder: Option<Occluder>,
    passes: Passes,
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite every field from the scene's current values
    ///
    /// Pass flags are cleared; a pick sets them afterwards.
    pub fn rebuild(&mut self, inputs: &FrameInputs<'_>) {
        let camera = CameraSnapshot::of(inputs.camera);
        self.mode = inputs.mode;
        self.morph_time = inputs.morph_time;
        self.frame_number = inputs.frame_number;
        self.projection = *inputs.projection;
        self.occluder = compute_occluder(inputs.mode, inputs.central_body, camera.position_wc);
        self.camera = camera;
        self.passes = Passes::empty();
    }

    pub fn set_passes(&mut self, passes: Passes) {
        self.passes = passes;
    }

    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    pub fn morph_time(&self) -> f64 {
        self.morph_time
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn camera(&self) -> &CameraSnapshot {
        &self.camera
    }

    /// Projection used by the flat modes
    pub fn projection(&self) -> &EquidistantCylindricalProjection {
        &self.projection
    }

    pub fn occluder(&self) -> Option<&Occluder> {
        self.occluder.as_ref()
    }

    pub fn passes(&self) -> Passes {
        self.passes
    }

    /// Whether this frame is a pick pass
    pub fn is_pick(&self) -> bool {
        self.passes.contains(Passes::PICK)
    }
}
