//! Render orchestration for a 3D globe viewer
//!
//! This crate drives frames without knowing which graphics API draws them.
//!
//! ## Architecture
//!
//! - [`Scene`] - owns the context, camera, primitives and post effects; runs
//!   frames, picks, and mode-dependent camera queries
//! - [`FrameState`] - read-only per-frame snapshot handed to every primitive
//! - [`PostEffectChain`] - cyclic selection of full-screen effects
//! - [`GpuContext`] - the seam to the graphics backend
//! - [`Primitive`] / [`CompositePrimitive`] - things that update and draw
//! - [`SceneCamera`] / [`Camera`] - matrices plus ground picking and view fitting

mod error;
mod scene_mode;
pub mod animation;
pub mod camera;
pub mod frame_state;
pub mod gpu;
pub mod pick;
pub mod post_effect;
pub mod primitive;
pub mod scene;

pub use error::{GpuError, SceneError};
pub use scene_mode::SceneMode;
pub use animation::{Animation, AnimationCollection};
pub use camera::{Camera, CameraPose, SceneCamera, ViewSpace};
pub use frame_state::{compute_occluder, CameraSnapshot, FrameInputs, FrameState, Passes};
pub use gpu::{
    ClearState, Framebuffer, GpuContext, PickFramebuffer, PixelDatatype, PixelFormat,
    TextureDescription, UniformState, Viewport,
};
pub use pick::{window_to_framebuffer, PickColor, PickId, PickIdRegistry, PickedObject, PixelPosition};
pub use post_effect::{PostEffect, PostEffectChain, PostEffectKind, Tunable, PARAMETER_STEP};
pub use primitive::{CentralBody, CompositePrimitive, Primitive, PrimitiveKey};
pub use scene::{AnimateFn, PostEffects, Scene, SHADER_EVICTION_INTERVAL};
