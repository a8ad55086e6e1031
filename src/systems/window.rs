//! Viewer window
//!
//! The title tracks the scene mode and, when enabled, the active post effect.

use std::sync::Arc;
use winit::{
    dpi::LogicalSize,
    event_loop::ActiveEventLoop,
    window::{Fullscreen, Window},
};

use geoscene_core::{PostEffectKind, SceneMode};

use crate::config::WindowConfig;

/// Window title showing the mode and, optionally, the active effect
pub fn format_title(base: &str, mode: SceneMode, effect: Option<(PostEffectKind, f32)>) -> String {
    match effect {
        Some((kind, t)) => format!("{} - {} - {} (t = {:.2})", base, mode, kind, t),
        None => format!("{} - {}", base, mode),
    }
}

/// Borderless fullscreen when `enabled`
fn fullscreen_mode(enabled: bool) -> Option<Fullscreen> {
    enabled.then_some(Fullscreen::Borderless(None))
}

/// The window the globe is presented to
pub struct WindowSystem {
    window: Arc<Window>,
    base_title: String,
}

impl WindowSystem {
    pub fn create(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<Self, WindowError> {
        let attrs = Window::default_attributes()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_fullscreen(fullscreen_mode(config.fullscreen));

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| WindowError::CreationFailed(e.to_string()))?;
        log::info!("Window created ({}x{})", config.width, config.height);

        Ok(Self {
            window: Arc::new(window),
            base_title: config.title.clone(),
        })
    }

    /// Shared handle, the surface keeps one alive
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn toggle_fullscreen(&self) {
        let enable = self.window.fullscreen().is_none();
        self.window.set_fullscreen(fullscreen_mode(enable));
    }

    pub fn update_title(&self, mode: SceneMode, effect: Option<(PostEffectKind, f32)>) {
        self.window.set_title(&format_title(&self.base_title, mode, effect));
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

#[derive(Debug)]
pub enum WindowError {
    CreationFailed(String),
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::CreationFailed(msg) => write!(f, "Window creation failed: {}", msg),
        }
    }
}

impl std::error::Error for WindowError {}
