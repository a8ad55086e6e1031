//! Application systems
//!
//! The window and the scene renderer, kept out of main.rs so they can be tested.

mod render;
mod window;

pub use render::{RenderError, RenderSystem};
pub use window::{format_title, WindowError, WindowSystem};
