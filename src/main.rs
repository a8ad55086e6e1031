//! GeoScene - globe viewer
//!
//! Opens a window, renders a WGS84 globe through the scene's post-effect
//! chain, and maps keys and clicks to scene actions.

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use geoscene::config::ViewerConfig;
use geoscene::input::{InputAction, InputMapper};
use geoscene::systems::{RenderError, RenderSystem, WindowSystem};
use geoscene_math::Cartesian2;

/// Main application state
struct App {
    config: ViewerConfig,
    window: Option<WindowSystem>,
    render: Option<RenderSystem>,
    /// Last cursor position in window pixels, origin top-left
    cursor_position: Option<Cartesian2>,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            window: None,
            render: None,
            cursor_position: None,
        }
    }

    fn refresh_title(&self) {
        let (Some(window), Some(render)) = (&self.window, &self.render) else {
            return;
        };
        let Ok(mode) = render.mode() else {
            return;
        };
        let effect = if self.config.debug.show_effect_in_title {
            render.active_effect().ok()
        } else {
            None
        };
        window.update_title(mode, effect);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(render) = &mut self.render {
            render.destroy();
        }
        self.render = None;
        event_loop.exit();
    }

    fn handle_action(&mut self, event_loop: &ActiveEventLoop, action: InputAction) {
        if action == InputAction::Exit {
            self.shutdown(event_loop);
            return;
        }
        if action == InputAction::ToggleFullscreen {
            if let Some(window) = &self.window {
                window.toggle_fullscreen();
            }
            return;
        }

        let Some(render) = &mut self.render else {
            return;
        };
        let result = match action {
            InputAction::NextPostEffect => render
                .next_effect()
                .map(|kind| log::info!("Post effect: {}", kind)),
            InputAction::PreviousPostEffect => render
                .previous_effect()
                .map(|kind| log::info!("Post effect: {}", kind)),
            InputAction::IncreaseParameter => render
                .increase_parameter()
                .map(|t| log::info!("Effect parameter: {:.2}", t)),
            InputAction::DecreaseParameter => render
                .decrease_parameter()
                .map(|t| log::info!("Effect parameter: {:.2}", t)),
            InputAction::SwitchMode(mode) => render.set_mode(mode),
            InputAction::ViewHomeRegion => render.view_home_region(),
            InputAction::Pick => match self.cursor_position {
                Some(position) => render.pick(position).map(|(object, ground)| {
                    match object {
                        Some(object) => log::info!("Picked {}", object.name),
                        None => log::info!("Picked nothing"),
                    }
                    if let Some(point) = ground {
                        log::info!("Ground point: ({:.1}, {:.1}, {:.1})", point.x, point.y, point.z);
                    }
                }),
                None => Ok(()),
            },
            InputAction::Exit | InputAction::ToggleFullscreen => Ok(()),
        };

        if let Err(e) = result {
            log::warn!("{:?} failed: {}", action, e);
        }
        self.refresh_title();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match WindowSystem::create(event_loop, &self.config.window) {
            Ok(window) => window,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        match RenderSystem::new(window.window().clone(), &self.config) {
            Ok(render) => self.render = Some(render),
            Err(e) => {
                log::error!("Failed to create renderer: {}", e);
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
        self.refresh_title();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(render) = &mut self.render {
                    if let Err(e) = render.resize(physical_size.width, physical_size.height) {
                        log::warn!("Resize failed: {}", e);
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_position = Some(Cartesian2::new(position.x, position.y));
            }

            WindowEvent::CursorLeft { .. } => {
                self.cursor_position = None;
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if let Some(action) = InputMapper::map_keyboard(key, event.state) {
                        self.handle_action(event_loop, action);
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(action) = InputMapper::map_mouse_button(button, state) {
                    self.handle_action(event_loop, action);
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(render) = &mut self.render {
                    match render.render_frame() {
                        Ok(()) | Err(RenderError::SurfaceLost) => {}
                        Err(RenderError::OutOfMemory) => {
                            log::error!("GPU out of memory");
                            self.shutdown(event_loop);
                            return;
                        }
                        Err(e) => log::warn!("{}", e),
                    }
                }

                // Request next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

fn main() {
    let config = ViewerConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}. Using defaults.", e);
        ViewerConfig::default()
    });

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();
    log::info!("Starting GeoScene");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}
