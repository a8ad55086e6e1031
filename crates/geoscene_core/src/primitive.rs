//! Renderable primitives and the composite that holds them

use geoscene_math::Ellipsoid;
use slotmap::{new_key_type, SlotMap};

use crate::error::SceneError;
use crate::frame_state::FrameState;
use crate::gpu::GpuContext;

new_key_type! {
    /// Handle to a primitive in a [`CompositePrimitive`]
    pub struct PrimitiveKey;
}

/// Something the scene updates and draws each frame
pub trait Primitive<C: GpuContext> {
    /// Prepare GPU resources for the frame described by `frame_state`
    fn update(&mut self, context: &mut C, frame_state: &FrameState) -> Result<(), SceneError>;

    /// Draw into the currently bound framebuffer
    fn render(&mut self, context: &mut C) -> Result<(), SceneError>;

    /// Draw pick ids into the pick framebuffer; primitives that can't be picked draw nothing
    fn render_for_pick(&mut self, _context: &mut C, _framebuffer: &C::Framebuffer) -> Result<(), SceneError> {
        Ok(())
    }
}

/// The body the scene is built around (the globe)
pub trait CentralBody<C: GpuContext>: Primitive<C> {
    fn ellipsoid(&self) -> &Ellipsoid;
}

/// Ordered collection of primitives with an optional central body
///
/// The central body is always updated and drawn first; the others follow in
/// insertion order.
pub struct CompositePrimitive<C: GpuContext> {
    central_body: Option<Box<dyn CentralBody<C>>>,
    primitives: SlotMap<PrimitiveKey, Box<dyn Primitive<C>>>,
    order: Vec<PrimitiveKey>,
    pub show: bool,
}

impl<C: GpuContext> Default for CompositePrimitive<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: GpuContext> CompositePrimitive<C> {
    pub fn new() -> Self {
        Self {
            central_body: None,
            primitives: SlotMap::with_key(),
            order: Vec::new(),
            show: true,
        }
    }

    /// Replace the central body, returning the previous one
    pub fn set_central_body(
        &mut self,
        central_body: Option<Box<dyn CentralBody<C>>>,
    ) -> Option<Box<dyn CentralBody<C>>> {
        std::mem::replace(&mut self.central_body, central_body)
    }

    pub fn central_body(&self) -> Option<&dyn CentralBody<C>> {
        self.central_body.as_deref()
    }

    /// Ellipsoid of the central body, if there is one
    pub fn central_body_ellipsoid(&self) -> Option<&Ellipsoid> {
        self.central_body.as_ref().map(|body| body.ellipsoid())
    }

    pub fn add(&mut self, primitive: Box<dyn Primitive<C>>) -> PrimitiveKey {
        let key = self.primitives.insert(primitive);
        self.order.push(key);
        key
    }

    pub fn remove(&mut self, key: PrimitiveKey) -> Option<Box<dyn Primitive<C>>> {
        let primitive = self.primitives.remove(key)?;
        self.order.retain(|k| *k != key);
        Some(primitive)
    }

    pub fn contains(&self, key: PrimitiveKey) -> bool {
        self.primitives.contains_key(key)
    }

    pub fn get_mut(&mut self, key: PrimitiveKey) -> Option<&mut (dyn Primitive<C> + 'static)> {
        self.primitives.get_mut(key).map(|p| p.as_mut())
    }

    /// Number of primitives, not counting the central body
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Remove every primitive; the central body stays
    pub fn clear(&mut self) {
        self.primitives.clear();
        self.order.clear();
    }
}

impl<C: GpuContext> Primitive<C> for CompositePrimitive<C> {
    fn update(&mut self, context: &mut C, frame_state: &FrameState) -> Result<(), SceneError> {
        if !self.show {
            return Ok(());
        }
        if let Some(body) = self.central_body.as_mut() {
            body.update(context, frame_state)?;
        }
        for key in &self.order {
            if let Some(primitive) = self.primitives.get_mut(*key) {
                primitive.update(context, frame_state)?;
            }
        }
        Ok(())
    }

    fn render(&mut self, context: &mut C) -> Result<(), SceneError> {
        if !self.show {
            return Ok(());
        }
        if let Some(body) = self.central_body.as_mut() {
            body.render(context)?;
        }
        for key in &self.order {
            if let Some(primitive) = self.primitives.get_mut(*key) {
                primitive.render(context)?;
            }
        }
        Ok(())
    }

    fn render_for_pick(&mut self, context: &mut C, framebuffer: &C::Framebuffer) -> Result<(), SceneError> {
        if !self.show {
            return Ok(());
        }
        if let Some(body) = self.central_body.as_mut() {
            body.render_for_pick(context, framebuffer)?;
        }
        for key in &self.order {
            if let Some(primitive) = self.primitives.get_mut(*key) {
                primitive.render_for_pick(context, framebuffer)?;
            }
        }
        Ok(())
    }
}
