//! Post effects and the cyclic chain that selects between them
//!
//! Each effect is a full-screen pass reading the scene's offscreen color and
//! depth. Exactly one effect is active per frame; the chain cycles through
//! them and adjusts the active effect's single tunable parameter `t`.

use std::fmt;

use crate::error::GpuError;
use crate::gpu::{GpuContext, Viewport};

/// Amount one increase/decrease step moves the active parameter
pub const PARAMETER_STEP: f32 = 0.05;

/// The available full-screen effects, in selection order
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PostEffectKind {
    PassThrough = 0,
    Luminance,
    BlackAndWhite,
    EightBit,
    NightVision,
    Brightness,
    Contrast,
    Toon,
    Fog,
    DepthOfField,
    AmbientOcclusion,
    Combined,
}

impl PostEffectKind {
    /// Every effect, in the order the chain cycles through them
    pub const ALL: [PostEffectKind; 12] = [
        PostEffectKind::PassThrough,
        PostEffectKind::Luminance,
        PostEffectKind::BlackAndWhite,
        PostEffectKind::EightBit,
        PostEffectKind::NightVision,
        PostEffectKind::Brightness,
        PostEffectKind::Contrast,
        PostEffectKind::Toon,
        PostEffectKind::Fog,
        PostEffectKind::DepthOfField,
        PostEffectKind::AmbientOcclusion,
        PostEffectKind::Combined,
    ];

    /// Index used to select the effect in the shader
    pub fn shader_index(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            PostEffectKind::PassThrough => "pass-through",
            PostEffectKind::Luminance => "luminance",
            PostEffectKind::BlackAndWhite => "black and white",
            PostEffectKind::EightBit => "8-bit",
            PostEffectKind::NightVision => "night vision",
            PostEffectKind::Brightness => "brightness",
            PostEffectKind::Contrast => "contrast",
            PostEffectKind::Toon => "toon",
            PostEffectKind::Fog => "fog",
            PostEffectKind::DepthOfField => "depth of field",
            PostEffectKind::AmbientOcclusion => "ambient occlusion",
            PostEffectKind::Combined => "combined",
        }
    }
}

impl fmt::Display for PostEffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something with a single scalar parameter
pub trait Tunable {
    fn parameter(&self) -> f32;
    fn set_parameter(&mut self, value: f32);
}

impl<T: Tunable + ?Sized> Tunable for Box<T> {
    fn parameter(&self) -> f32 {
        (**self).parameter()
    }

    fn set_parameter(&mut self, value: f32) {
        (**self).set_parameter(value)
    }
}

/// A full-screen pass compositing the offscreen target to the drawing buffer
pub trait PostEffect<C: GpuContext>: Tunable {
    fn kind(&self) -> PostEffectKind;

    /// Match a new drawing-buffer size
    fn resize(&mut self, viewport: Viewport);

    /// Point the effect at this frame's offscreen color and depth
    fn update(&mut self, context: &mut C, source: &C::Framebuffer) -> Result<(), GpuError>;

    /// Draw to the currently bound target
    fn render(&mut self, context: &mut C) -> Result<(), GpuError>;
}

/// An ordered, non-empty, cyclic selection of effects
#[derive(Debug)]
pub struct PostEffectChain<E> {
    effects: Vec<E>,
    index: usize,
    step: f32,
}

#[allow(clippy::len_without_is_empty)]
impl<E: Tunable> PostEffectChain<E> {
    /// Create a chain with the first effect active; `None` if `effects` is empty
    pub fn new(effects: Vec<E>) -> Option<Self> {
        if effects.is_empty() {
            return None;
        }
        Some(Self {
            effects,
            index: 0,
            step: PARAMETER_STEP,
        })
    }

    /// Override the parameter step
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn set_step(&mut self, step: f32) {
        self.step = step;
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Index of the active effect
    pub fn index(&self) -> usize {
        self.index
    }

    /// Make the effect at `index` active; false (and no change) if out of range
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.effects.len() {
            self.index = index;
            true
        } else {
            false
        }
    }

    /// Advance to the next effect, wrapping to the first
    pub fn select_next(&mut self) {
        self.index = (self.index + 1) % self.effects.len();
    }

    /// Step back to the previous effect, wrapping to the last
    pub fn select_previous(&mut self) {
        self.index = (self.index + self.effects.len() - 1) % self.effects.len();
    }

    /// "Increase" lowers `t` by one step
    pub fn increase_parameter(&mut self) {
        let step = self.step;
        let effect = self.active_mut();
        effect.set_parameter(effect.parameter() - step);
    }

    /// "Decrease" raises `t` by one step
    pub fn decrease_parameter(&mut self) {
        let step = self.step;
        let effect = self.active_mut();
        effect.set_parameter(effect.parameter() + step);
    }

    pub fn active(&self) -> &E {
        &self.effects[self.index]
    }

    pub fn active_mut(&mut self) -> &mut E {
        &mut self.effects[self.index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.effects.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, E> {
        self.effects.iter_mut()
    }
}
