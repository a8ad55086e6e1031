//! Integration tests for the scene render pipeline
//!
//! These run the scene against a recording GPU context and verify:
//! 1. A frame runs its steps in order and composites through the active effect,
//!    and a failing primitive stops the frame before compositing
//! 2. The frame state carries an occluder only in 3D with a central body
//! 3. Picking flips window y and decodes the synthetic pick pixel
//! 4. Mode dispatch, missing arguments and teardown behave as documented

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use geoscene_core::{
    Animation, Camera, CentralBody, ClearState, CompositePrimitive, Framebuffer, FrameState, GpuContext,
    GpuError, PickColor, PickFramebuffer, PickId, PickIdRegistry, PickedObject, PixelPosition, PostEffect,
    PostEffectKind, Primitive, Scene, SceneCamera, SceneError, SceneMode, TextureDescription,
    Tunable, UniformState, ViewSpace, Viewport,
};
use geoscene_math::{Cartesian2, Cartesian3, Ellipsoid, EquidistantCylindricalProjection, Extent, Mat4};

type Log = Rc<RefCell<Vec<String>>>;

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn position_of(log: &Log, entry: &str) -> usize {
    log.borrow()
        .iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("missing log entry {:?} in {:?}", entry, log.borrow()))
}

// ==================== Recording GPU Context ====================

struct MockTexture {
    description: TextureDescription,
}

struct MockFramebuffer {
    color: MockTexture,
    depth: MockTexture,
}

impl Framebuffer for MockFramebuffer {
    type Texture = MockTexture;

    fn color_texture(&self) -> &MockTexture {
        &self.color
    }

    fn depth_texture(&self) -> &MockTexture {
        &self.depth
    }

    fn size(&self) -> (u32, u32) {
        (self.color.description.width, self.color.description.height)
    }
}

impl MockFramebuffer {
    fn new(size: (u32, u32)) -> Self {
        Self {
            color: MockTexture { description: TextureDescription::color(size.0, size.1) },
            depth: MockTexture { description: TextureDescription::depth(size.0, size.1) },
        }
    }
}

struct MockPickFramebuffer {
    target: Option<MockFramebuffer>,
    log: Log,
}

impl Drop for MockPickFramebuffer {
    fn drop(&mut self) {
        self.log.borrow_mut().push("drop pick framebuffer".into());
    }
}

impl PickFramebuffer<MockContext> for MockPickFramebuffer {
    fn begin(&mut self, context: &mut MockContext) -> Result<&MockFramebuffer, GpuError> {
        context.pick_pixels.clear();
        context.log.borrow_mut().push("pick begin".into());
        let size = context.size;
        if self.target.as_ref().map(|t| t.size()) != Some(size) {
            self.target = None;
        }
        Ok(&*self.target.get_or_insert_with(|| MockFramebuffer::new(size)))
    }

    fn end(
        &mut self,
        context: &mut MockContext,
        position: Option<PixelPosition>,
    ) -> Result<Option<PickColor>, GpuError> {
        context.log.borrow_mut().push("pick end".into());
        Ok(position.map(|p| context.pick_pixels.get(&(p.x, p.y)).copied().unwrap_or(PickColor::NONE)))
    }
}

struct MockEffect {
    kind: PostEffectKind,
    t: f32,
    log: Log,
}

impl Tunable for MockEffect {
    fn parameter(&self) -> f32 {
        self.t
    }

    fn set_parameter(&mut self, value: f32) {
        self.t = value;
    }
}

impl PostEffect<MockContext> for MockEffect {
    fn kind(&self) -> PostEffectKind {
        self.kind
    }

    fn resize(&mut self, viewport: Viewport) {
        self.log
            .borrow_mut()
            .push(format!("resize {} {}x{}", self.kind, viewport.width, viewport.height));
    }

    fn update(&mut self, _context: &mut MockContext, source: &MockFramebuffer) -> Result<(), GpuError> {
        let (w, h) = source.size();
        self.log.borrow_mut().push(format!("effect update {} {}x{}", self.kind, w, h));
        Ok(())
    }

    fn render(&mut self, context: &mut MockContext) -> Result<(), GpuError> {
        let target = if context.bound.is_none() { "default" } else { "offscreen" };
        self.log.borrow_mut().push(format!("effect render {} {}", self.kind, target));
        Ok(())
    }
}

struct MockContext {
    size: (u32, u32),
    log: Log,
    uniforms: UniformState,
    pick_ids: PickIdRegistry,
    pick_pixels: HashMap<(u32, u32), PickColor>,
    bound: Option<(u32, u32)>,
    clears: Vec<ClearState>,
    framebuffers_created: usize,
    pick_framebuffers_created: usize,
    evictions: usize,
    presents: usize,
}

impl MockContext {
    fn new(log: &Log) -> Self {
        Self {
            size: (800, 600),
            log: log.clone(),
            uniforms: UniformState::default(),
            pick_ids: PickIdRegistry::new(),
            pick_pixels: HashMap::new(),
            bound: None,
            clears: Vec::new(),
            framebuffers_created: 0,
            pick_framebuffers_created: 0,
            evictions: 0,
            presents: 0,
        }
    }
}

impl Drop for MockContext {
    fn drop(&mut self) {
        self.log.borrow_mut().push("drop context".into());
    }
}

impl GpuContext for MockContext {
    type Texture = MockTexture;
    type Framebuffer = MockFramebuffer;
    type PickFramebuffer = MockPickFramebuffer;

    fn drawing_buffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn create_texture_2d(&mut self, description: &TextureDescription) -> Result<MockTexture, GpuError> {
        description.validate()?;
        Ok(MockTexture { description: *description })
    }

    fn create_framebuffer(&mut self, color: MockTexture, depth: MockTexture) -> Result<MockFramebuffer, GpuError> {
        self.framebuffers_created += 1;
        Ok(MockFramebuffer { color, depth })
    }

    fn create_pick_framebuffer(&mut self) -> Result<MockPickFramebuffer, GpuError> {
        self.pick_framebuffers_created += 1;
        Ok(MockPickFramebuffer { target: None, log: self.log.clone() })
    }

    fn create_post_effect(
        &mut self,
        kind: PostEffectKind,
        _viewport: Viewport,
    ) -> Result<Box<dyn PostEffect<Self>>, GpuError> {
        Ok(Box::new(MockEffect { kind, t: 0.5, log: self.log.clone() }))
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<&MockFramebuffer>) {
        self.bound = framebuffer.map(|f| f.size());
        let entry = if self.bound.is_some() { "bind offscreen" } else { "bind default" };
        self.log.borrow_mut().push(entry.into());
    }

    fn clear(&mut self, clear_state: &ClearState) -> Result<(), GpuError> {
        self.clears.push(*clear_state);
        self.log.borrow_mut().push("clear".into());
        Ok(())
    }

    fn uniform_state(&self) -> &UniformState {
        &self.uniforms
    }

    fn uniform_state_mut(&mut self) -> &mut UniformState {
        &mut self.uniforms
    }

    fn destroy_released_shader_programs(&mut self) {
        self.evictions += 1;
    }

    fn pick_ids(&mut self) -> &mut PickIdRegistry {
        &mut self.pick_ids
    }

    fn present(&mut self) -> Result<(), GpuError> {
        self.presents += 1;
        self.log.borrow_mut().push("present".into());
        Ok(())
    }
}

// ==================== Recording Primitives ====================

#[derive(Clone, Debug)]
struct Seen {
    mode: SceneMode,
    has_occluder: bool,
    pick: bool,
    frame_number: u64,
}

struct MockPrimitive {
    name: &'static str,
    log: Log,
    seen: Rc<RefCell<Vec<Seen>>>,
    pick: Option<(PickId, (u32, u32))>,
}

impl MockPrimitive {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            seen: Rc::new(RefCell::new(Vec::new())),
            pick: None,
        }
    }
}

impl Drop for MockPrimitive {
    fn drop(&mut self) {
        self.log.borrow_mut().push(format!("drop primitive {}", self.name));
    }
}

impl Primitive<MockContext> for MockPrimitive {
    fn update(&mut self, _context: &mut MockContext, frame_state: &FrameState) -> Result<(), SceneError> {
        self.seen.borrow_mut().push(Seen {
            mode: frame_state.mode(),
            has_occluder: frame_state.occluder().is_some(),
            pick: frame_state.is_pick(),
            frame_number: frame_state.frame_number(),
        });
        self.log.borrow_mut().push(format!("update {}", self.name));
        Ok(())
    }

    fn render(&mut self, context: &mut MockContext) -> Result<(), SceneError> {
        let target = if context.bound.is_some() { "offscreen" } else { "default" };
        self.log.borrow_mut().push(format!("render {} {}", self.name, target));
        Ok(())
    }

    fn render_for_pick(&mut self, context: &mut MockContext, _framebuffer: &MockFramebuffer) -> Result<(), SceneError> {
        if let Some((id, pixel)) = self.pick {
            context.pick_pixels.insert(pixel, id.color());
        }
        Ok(())
    }
}

struct MockGlobe {
    inner: MockPrimitive,
    ellipsoid: Ellipsoid,
}

impl Primitive<MockContext> for MockGlobe {
    fn update(&mut self, context: &mut MockContext, frame_state: &FrameState) -> Result<(), SceneError> {
        self.inner.update(context, frame_state)
    }

    fn render(&mut self, context: &mut MockContext) -> Result<(), SceneError> {
        self.inner.render(context)
    }
}

impl CentralBody<MockContext> for MockGlobe {
    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

/// Primitive whose update fails while `fail` is set
struct FlakyPrimitive {
    fail: Rc<Cell<bool>>,
    log: Log,
}

impl Primitive<MockContext> for FlakyPrimitive {
    fn update(&mut self, _context: &mut MockContext, _frame_state: &FrameState) -> Result<(), SceneError> {
        if self.fail.get() {
            self.log.borrow_mut().push("update flaky failed".into());
            return Err(SceneError::Primitive("flaky".into()));
        }
        Ok(())
    }

    fn render(&mut self, _context: &mut MockContext) -> Result<(), SceneError> {
        Ok(())
    }
}

/// Camera that logs updates and matrix reads, and reports when it is dropped
struct LoggingCamera {
    inner: Camera,
    log: Log,
}

impl Drop for LoggingCamera {
    fn drop(&mut self) {
        self.log.borrow_mut().push("drop camera".into());
    }
}

impl SceneCamera for LoggingCamera {
    fn update(&mut self, size: (u32, u32)) {
        self.log.borrow_mut().push("camera update".into());
        self.inner.update(size)
    }

    fn view_matrix(&self) -> Mat4 {
        self.log.borrow_mut().push("camera view matrix".into());
        self.inner.view_matrix()
    }

    fn projection_matrix(&self) -> Mat4 {
        self.log.borrow_mut().push("camera projection matrix".into());
        self.inner.projection_matrix()
    }

    fn infinite_projection_matrix(&self) -> Option<Mat4> {
        self.inner.infinite_projection_matrix()
    }

    fn position_wc(&self) -> Cartesian3 {
        self.inner.position_wc()
    }

    fn pick(&self, window_position: Cartesian2, space: ViewSpace<'_>) -> Option<Cartesian3> {
        self.inner.pick(window_position, space)
    }

    fn view_extent(&mut self, extent: &Extent, space: ViewSpace<'_>) {
        self.inner.view_extent(extent, space)
    }
}

fn new_scene(log: &Log) -> Scene<MockContext> {
    let camera = LoggingCamera { inner: Camera::new(800, 600), log: log.clone() };
    Scene::with_camera(MockContext::new(log), Box::new(camera)).unwrap()
}

fn add_globe(scene: &mut Scene<MockContext>, log: &Log) -> Rc<RefCell<Vec<Seen>>> {
    let inner = MockPrimitive::new("globe", log);
    let seen = inner.seen.clone();
    let globe = MockGlobe { inner, ellipsoid: Ellipsoid::WGS84 };
    scene.primitives_mut().unwrap().set_central_body(Some(Box::new(globe)));
    seen
}

// ==================== Frame Pipeline Tests ====================

/// Test that a frame runs its steps in order
#[test]
fn test_render_frame_step_order() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.primitives_mut().unwrap().add(Box::new(MockPrimitive::new("a", &log)));
    let animation_log = log.clone();
    scene
        .animations_mut()
        .unwrap()
        .add(Animation::new(Duration::from_secs(60), move |_| {
            animation_log.borrow_mut().push("animation update".into());
        }));

    scene.render_frame().unwrap();

    let animation = position_of(&log, "animation update");
    let camera = position_of(&log, "camera update");
    let update = position_of(&log, "update a");
    let bind = position_of(&log, "bind offscreen");
    let clear = position_of(&log, "clear");
    let render = position_of(&log, "render a offscreen");
    let unbind = position_of(&log, "bind default");
    let effect_update = position_of(&log, "effect update pass-through 800x600");
    let effect_render = position_of(&log, "effect render pass-through default");
    let present = position_of(&log, "present");

    assert!(animation < camera);
    assert!(camera < update);
    assert!(update < bind);
    assert!(bind < clear);
    assert!(clear < render);
    assert!(render < unbind);
    assert!(unbind < effect_update);
    assert!(effect_update < effect_render);
    assert!(effect_render < present);
}

/// Test that the clear uses opaque black and depth 1.0
#[test]
fn test_render_frame_clears_to_black() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.render_frame().unwrap();

    let context = scene.context().unwrap();
    assert_eq!(context.clears, vec![ClearState::default()]);
    assert_eq!(context.presents, 1);
}

/// Test that camera matrices end up in the uniform state
#[test]
fn test_uniform_state_loaded_from_camera() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.render_frame().unwrap();

    let camera = scene.camera().unwrap();
    let uniforms = scene.context().unwrap().uniform_state();
    assert_eq!(uniforms.view(), camera.view_matrix());
    assert_eq!(uniforms.projection(), camera.projection_matrix());
    assert_eq!(Some(uniforms.infinite_projection()), camera.infinite_projection_matrix());
}

/// Test that the animation callback runs after the camera update and before primitive updates
#[test]
fn test_animation_callback_order() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.primitives_mut().unwrap().add(Box::new(MockPrimitive::new("a", &log)));

    let callback_log = log.clone();
    scene
        .set_animation(Some(Box::new(
            move |_camera: &dyn SceneCamera, primitives: &mut CompositePrimitive<MockContext>| {
                callback_log
                    .borrow_mut()
                    .push(format!("animate {}", primitives.len()));
            },
        )))
        .unwrap();
    scene.render_frame().unwrap();

    let camera = position_of(&log, "camera update");
    let projection = position_of(&log, "camera projection matrix");
    let view = position_of(&log, "camera view matrix");
    let animate = position_of(&log, "animate 1");
    let update = position_of(&log, "update a");
    assert!(camera < projection);
    assert!(projection < animate);
    assert!(view < animate);
    assert!(animate < update);
}

/// Test that a failing primitive stops the frame before compositing and presenting
#[test]
fn test_failed_frame_skips_compositing() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.set_shader_eviction_interval(2).unwrap();
    let fail = Rc::new(Cell::new(false));
    scene
        .primitives_mut()
        .unwrap()
        .add(Box::new(FlakyPrimitive { fail: fail.clone(), log: log.clone() }));

    scene.render_frame().unwrap();
    log.borrow_mut().clear();

    fail.set(true);
    assert_eq!(scene.render_frame(), Err(SceneError::Primitive("flaky".into())));

    position_of(&log, "update flaky failed");
    assert!(!log.borrow().iter().any(|e| e.starts_with("effect ")));
    assert!(!log.borrow().iter().any(|e| e == "present"));
    let context = scene.context().unwrap();
    assert_eq!(context.presents, 1);
    assert_eq!(context.evictions, 0);

    // The failed frame does not count towards the eviction interval.
    fail.set(false);
    scene.render_frame().unwrap();
    assert_eq!(scene.context().unwrap().evictions, 1);
}

/// Test that the offscreen target is created once and recreated on resize
#[test]
fn test_offscreen_target_follows_drawing_buffer_size() {
    let log = new_log();
    let mut scene = new_scene(&log);

    for _ in 0..3 {
        scene.render_frame().unwrap();
    }
    assert_eq!(scene.context().unwrap().framebuffers_created, 1);

    scene.context_mut().unwrap().size = (1024, 768);
    scene.render_frame().unwrap();

    assert_eq!(scene.context().unwrap().framebuffers_created, 2);
    position_of(&log, "resize toon 1024x768");
    position_of(&log, "effect update pass-through 1024x768");
}

/// Test that zero-sized drawing buffers fail the frame
#[test]
fn test_zero_sized_drawing_buffer_is_an_error() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.context_mut().unwrap().size = (0, 600);

    let result = scene.render_frame();
    assert_eq!(
        result,
        Err(SceneError::Gpu(GpuError::InvalidSize { width: 0, height: 600 }))
    );
}

fn evictions_after(frames: usize) -> usize {
    let log = new_log();
    let mut scene = new_scene(&log);
    for _ in 0..frames {
        scene.render_frame().unwrap();
    }
    scene.context().unwrap().evictions
}

/// Test that released shader programs are destroyed every 120 frames
#[test]
fn test_shader_eviction_cadence() {
    assert_eq!(evictions_after(119), 0);
    assert_eq!(evictions_after(120), 1);
    assert_eq!(evictions_after(239), 1);
    assert_eq!(evictions_after(240), 2);
    assert_eq!(evictions_after(241), 2);
}

// ==================== Frame State Tests ====================

/// Test that only a 3D scene with a central body gets an occluder
#[test]
fn test_occluder_presence_by_mode() {
    let log = new_log();
    let mut scene = new_scene(&log);
    let seen = add_globe(&mut scene, &log);

    for mode in [SceneMode::Scene3D, SceneMode::Scene2D, SceneMode::ColumbusView, SceneMode::Morphing] {
        scene.set_mode(mode).unwrap();
        scene.render_frame().unwrap();
    }

    let seen = seen.borrow();
    let occluders: Vec<bool> = seen.iter().map(|s| s.has_occluder).collect();
    assert_eq!(occluders, vec![true, false, false, false]);
    assert_eq!(seen[1].mode, SceneMode::Scene2D);
}

/// Test that a 3D scene without a central body has no occluder
#[test]
fn test_no_occluder_without_central_body() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.render_frame().unwrap();
    assert!(scene.frame_state().unwrap().occluder().is_none());
}

/// Test that rebuilding with unchanged scene state gives the same frame state
#[test]
fn test_frame_state_rebuild_is_deterministic() {
    let log = new_log();
    let mut scene = new_scene(&log);
    add_globe(&mut scene, &log);

    scene.render_frame().unwrap();
    let first = scene.frame_state().unwrap().clone();
    scene.render_frame().unwrap();
    let second = scene.frame_state().unwrap();

    assert_eq!(first.mode(), second.mode());
    assert_eq!(first.occluder(), second.occluder());
    assert_eq!(first.camera(), second.camera());
    assert_eq!(first.morph_time(), second.morph_time());
    assert_eq!(first.frame_number() + 1, second.frame_number());
}

/// Test that the occluder is built for the camera position
#[test]
fn test_occluder_uses_camera_position() {
    let log = new_log();
    let mut scene = new_scene(&log);
    add_globe(&mut scene, &log);
    scene.render_frame().unwrap();

    let camera_position = scene.camera().unwrap().position_wc();
    let occluder = *scene.frame_state().unwrap().occluder().unwrap();
    assert_eq!(occluder.camera_position(), camera_position);
    assert_eq!(occluder.sphere().radius, Ellipsoid::WGS84.minimum_radius());
}

// ==================== Pick Tests ====================

fn add_pin(scene: &mut Scene<MockContext>, log: &Log, pixel: (u32, u32)) -> Rc<RefCell<Vec<Seen>>> {
    let id = scene
        .context_mut()
        .unwrap()
        .pick_ids()
        .allocate(PickedObject::new("pin").with_position(Cartesian3::UNIT_X));
    let mut pin = MockPrimitive::new("pin", log);
    pin.pick = Some((id, pixel));
    let seen = pin.seen.clone();
    scene.primitives_mut().unwrap().add(Box::new(pin));
    seen
}

/// Test that pick flips window y into framebuffer space
#[test]
fn test_pick_flips_y() {
    let log = new_log();
    let mut scene = new_scene(&log);
    // Window (10, 20) in an 800x600 buffer is framebuffer texel (10, 579).
    add_pin(&mut scene, &log, (10, 579));

    let picked = scene.pick(Some(Cartesian2::new(10.5, 20.2))).unwrap();
    let picked = picked.expect("pin should be picked");
    assert_eq!(picked.name, "pin");
    assert_eq!(picked.position, Some(Cartesian3::UNIT_X));

    let miss = scene.pick(Some(Cartesian2::new(10.0, 579.0))).unwrap();
    assert!(miss.is_none());
}

/// Test that the pick pass is flagged in the frame state
#[test]
fn test_pick_sets_pick_pass() {
    let log = new_log();
    let mut scene = new_scene(&log);
    let seen = add_pin(&mut scene, &log, (0, 0));

    scene.render_frame().unwrap();
    scene.pick(Some(Cartesian2::new(1.0, 1.0))).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert!(!seen[0].pick);
    assert!(seen[1].pick);
    assert_eq!(seen[1].frame_number, seen[0].frame_number);
}

/// Test that the pick framebuffer is created on first pick and reused
#[test]
fn test_pick_framebuffer_created_lazily() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.render_frame().unwrap();
    assert_eq!(scene.context().unwrap().pick_framebuffers_created, 0);

    scene.pick(Some(Cartesian2::new(5.0, 5.0))).unwrap();
    scene.pick(Some(Cartesian2::new(6.0, 6.0))).unwrap();
    assert_eq!(scene.context().unwrap().pick_framebuffers_created, 1);

    let begin = position_of(&log, "pick begin");
    let end = position_of(&log, "pick end");
    assert!(begin < end);
}

/// Test that the pick target is bound and cleared before primitives update
#[test]
fn test_pick_begins_before_update() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.primitives_mut().unwrap().add(Box::new(MockPrimitive::new("a", &log)));

    scene.pick(Some(Cartesian2::new(5.0, 5.0))).unwrap();

    let begin = position_of(&log, "pick begin");
    let update = position_of(&log, "update a");
    let end = position_of(&log, "pick end");
    assert!(begin < update);
    assert!(update < end);
}

/// Test that a failing primitive still ends the pick pass
#[test]
fn test_failed_pick_ends_pass() {
    let log = new_log();
    let mut scene = new_scene(&log);
    let fail = Rc::new(Cell::new(true));
    scene
        .primitives_mut()
        .unwrap()
        .add(Box::new(FlakyPrimitive { fail, log: log.clone() }));

    assert_eq!(
        scene.pick(Some(Cartesian2::new(5.0, 5.0))),
        Err(SceneError::Primitive("flaky".into()))
    );
    assert!(position_of(&log, "update flaky failed") < position_of(&log, "pick end"));
}

/// Test that positions outside the window pick nothing
#[test]
fn test_pick_outside_window() {
    let log = new_log();
    let mut scene = new_scene(&log);
    add_pin(&mut scene, &log, (0, 0));

    assert!(scene.pick(Some(Cartesian2::new(-3.0, 5.0))).unwrap().is_none());
    assert!(scene.pick(Some(Cartesian2::new(5.0, 600.0))).unwrap().is_none());
}

/// Test that the pick background decodes to no object
#[test]
fn test_pick_background() {
    let log = new_log();
    let mut scene = new_scene(&log);
    assert!(scene.pick(Some(Cartesian2::new(400.0, 300.0))).unwrap().is_none());
}

// ==================== Mode Dispatch Tests ====================

/// Test that missing arguments fail without touching the scene
#[test]
fn test_missing_arguments() {
    let log = new_log();
    let mut scene = new_scene(&log);
    let before = scene.camera().unwrap().position_wc();

    assert_eq!(scene.pick(None), Err(SceneError::MissingArgument("window_position")));
    assert_eq!(
        scene.pick_ground_point(None, None),
        Err(SceneError::MissingArgument("window_position"))
    );
    assert_eq!(scene.view_region(None, None), Err(SceneError::MissingArgument("extent")));

    assert_eq!(scene.camera().unwrap().position_wc(), before);
    assert_eq!(scene.context().unwrap().pick_framebuffers_created, 0);
}

/// Test that ground picks default to WGS84 in 3D
#[test]
fn test_pick_ground_point_3d() {
    let log = new_log();
    let scene = new_scene(&log);
    let center = Some(Cartesian2::new(400.0, 300.0));

    let hit = scene.pick_ground_point(center, None).unwrap().unwrap();
    assert!(hit.approx_eq(Cartesian3::new(6_378_137.0, 0.0, 0.0), 1e-3));

    let sphere = Ellipsoid::new(6.0e6, 6.0e6, 6.0e6);
    let hit = scene.pick_ground_point(center, Some(&sphere)).unwrap().unwrap();
    assert!(hit.approx_eq(Cartesian3::new(6.0e6, 0.0, 0.0), 1e-3));
}

/// Test that the flat modes pick through the scene's projection
#[test]
fn test_pick_ground_point_2d() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.set_mode(SceneMode::Scene2D).unwrap();
    scene
        .view_region(Some(&Extent::from_degrees(-20.0, -10.0, 20.0, 10.0)), None)
        .unwrap();

    // The ellipsoid argument is ignored outside 3D.
    let hit = scene
        .pick_ground_point(Some(Cartesian2::new(400.0, 300.0)), Some(&Ellipsoid::UNIT_SPHERE))
        .unwrap()
        .unwrap();
    assert!(hit.approx_eq(Cartesian3::new(6_378_137.0, 0.0, 0.0), 1e-3));
}

/// Test that switching to a flat mode with a region frames that region
#[test]
fn test_switch_mode_frames_region() {
    let log = new_log();
    let mut scene = new_scene(&log);
    let region = Extent::from_degrees(0.0, 0.0, 20.0, 20.0);

    scene.switch_mode(SceneMode::Scene2D, Some(&region)).unwrap();
    assert_eq!(scene.mode(), Ok(SceneMode::Scene2D));

    let hit = scene
        .pick_ground_point(Some(Cartesian2::new(400.0, 300.0)), None)
        .unwrap()
        .expect("map should fill the view");
    assert!(hit.y > 0.0);
    assert!(hit.z > 0.0);

    scene.switch_mode(SceneMode::Scene3D, None).unwrap();
    assert_eq!(scene.morph_time(), Ok(1.0));
}

/// Test that mode-dependent operations are no-ops while morphing
#[test]
fn test_morphing_dispatch_is_noop() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.set_mode(SceneMode::Morphing).unwrap();
    let before = scene.camera().unwrap().position_wc();

    let hit = scene.pick_ground_point(Some(Cartesian2::new(400.0, 300.0)), None).unwrap();
    assert!(hit.is_none());

    scene.view_region(Some(&Extent::from_degrees(0.0, 0.0, 10.0, 10.0)), None).unwrap();
    assert_eq!(scene.camera().unwrap().position_wc(), before);
}

/// Test that view_region moves the camera in 3D
#[test]
fn test_view_region_3d() {
    let log = new_log();
    let mut scene = new_scene(&log);
    let before = scene.camera().unwrap().position_wc();

    scene
        .view_region(Some(&Extent::from_degrees(100.0, 20.0, 110.0, 30.0)), None)
        .unwrap();
    assert_ne!(scene.camera().unwrap().position_wc(), before);
}

// ==================== Post Effect Tests ====================

/// Test that cycling through every effect returns to the start
#[test]
fn test_post_effect_cycle() {
    let log = new_log();
    let mut scene = new_scene(&log);
    assert_eq!(scene.post_effects().unwrap().len(), 12);

    let mut kinds = Vec::new();
    for _ in 0..12 {
        kinds.push(scene.select_next_post_effect().unwrap());
    }
    assert_eq!(kinds.first(), Some(&PostEffectKind::Luminance));
    assert_eq!(kinds.last(), Some(&PostEffectKind::PassThrough));

    assert_eq!(scene.select_previous_post_effect().unwrap(), PostEffectKind::Combined);
}

/// Test that the frame composites through the selected effect
#[test]
fn test_frame_uses_active_effect() {
    let log = new_log();
    let mut scene = new_scene(&log);
    while scene.post_effects().unwrap().active().kind() != PostEffectKind::Toon {
        scene.select_next_post_effect().unwrap();
    }
    scene.render_frame().unwrap();
    position_of(&log, "effect render toon default");
}

/// Test that "increase" lowers t and "decrease" raises it
#[test]
fn test_post_effect_parameter_direction() {
    let log = new_log();
    let mut scene = new_scene(&log);

    let lowered = scene.increase_post_effect_parameter().unwrap();
    assert!((lowered - 0.45).abs() < 1e-6);

    scene.select_next_post_effect().unwrap();
    let raised = scene.decrease_post_effect_parameter().unwrap();
    assert!((raised - 0.55).abs() < 1e-6);
}

// ==================== Teardown Tests ====================

/// Test that destroy releases camera, pick framebuffer, primitives, then context
#[test]
fn test_destroy_order() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.primitives_mut().unwrap().add(Box::new(MockPrimitive::new("a", &log)));
    scene.render_frame().unwrap();
    scene.pick(Some(Cartesian2::new(1.0, 1.0))).unwrap();

    scene.destroy().unwrap();

    let drops: Vec<String> = log
        .borrow()
        .iter()
        .filter(|e| e.starts_with("drop "))
        .cloned()
        .collect();
    assert_eq!(
        drops,
        vec!["drop camera", "drop pick framebuffer", "drop primitive a", "drop context"]
    );
    assert!(scene.is_destroyed());
}

/// Test that a destroyed scene rejects further use
#[test]
fn test_destroyed_scene_fails_fast() {
    let log = new_log();
    let mut scene = new_scene(&log);
    scene.destroy().unwrap();

    assert_eq!(scene.destroy(), Err(SceneError::Destroyed));
    assert_eq!(scene.render_frame(), Err(SceneError::Destroyed));
    assert_eq!(scene.pick(Some(Cartesian2::ZERO)), Err(SceneError::Destroyed));
    assert_eq!(scene.pick_ground_point(Some(Cartesian2::ZERO), None), Err(SceneError::Destroyed));
    assert!(scene.select_next_post_effect().is_err());

    assert_eq!(scene.set_mode(SceneMode::Scene2D), Err(SceneError::Destroyed));
    assert_eq!(scene.set_morph_time(0.3), Err(SceneError::Destroyed));
    assert_eq!(scene.mode(), Err(SceneError::Destroyed));
    assert_eq!(scene.morph_time(), Err(SceneError::Destroyed));
    assert_eq!(scene.frame_number(), Err(SceneError::Destroyed));
    assert!(scene.projection().is_err());
    assert!(scene
        .set_projection(EquidistantCylindricalProjection::new(Ellipsoid::WGS84))
        .is_err());
}

/// Test that mode changes set the matching morph time
#[test]
fn test_mode_sets_morph_time() {
    let log = new_log();
    let mut scene = new_scene(&log);
    assert_eq!(scene.morph_time(), Ok(1.0));

    scene.set_mode(SceneMode::ColumbusView).unwrap();
    assert_eq!(scene.mode(), Ok(SceneMode::ColumbusView));
    assert_eq!(scene.morph_time(), Ok(0.0));

    scene.set_mode(SceneMode::Morphing).unwrap();
    scene.set_morph_time(1.7).unwrap();
    assert_eq!(scene.morph_time(), Ok(1.0));
}

/// Test that the sun position reaches the uniform state
#[test]
fn test_sun_position() {
    let log = new_log();
    let mut scene = new_scene(&log);
    let sun = Cartesian3::new(1.5e11, 0.0, 0.0);
    scene.set_sun_position(sun).unwrap();
    assert_eq!(scene.sun_position().unwrap(), sun);
}
