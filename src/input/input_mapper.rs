//! Input mapping from raw events to viewer actions
//!
//! Keys:
//! - `N` / `P`: next / previous post effect
//! - `=` / `-`: increase / decrease the active effect's parameter
//! - `1` / `2` / `3`: 3D, 2D, Columbus view
//! - `V`: fly to the home region
//! - `F`: fullscreen
//! - `Escape`: exit
//!
//! A left click picks the object and ground point under the cursor.

use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

use geoscene_core::SceneMode;

/// Actions the viewer responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Exit application
    Exit,
    /// Toggle fullscreen mode (F key)
    ToggleFullscreen,
    NextPostEffect,
    PreviousPostEffect,
    IncreaseParameter,
    DecreaseParameter,
    /// Switch the scene to a mode (1/2/3 keys)
    SwitchMode(SceneMode),
    /// Fit the home region into view (V key)
    ViewHomeRegion,
    /// Pick at the cursor (left click)
    Pick,
}

/// Maps raw input events to viewer actions
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Only presses map to anything; releases return `None`.
    pub fn map_keyboard(key: KeyCode, state: ElementState) -> Option<InputAction> {
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::Escape => Some(InputAction::Exit),
            KeyCode::KeyF => Some(InputAction::ToggleFullscreen),
            KeyCode::KeyN => Some(InputAction::NextPostEffect),
            KeyCode::KeyP => Some(InputAction::PreviousPostEffect),
            KeyCode::Equal | KeyCode::NumpadAdd => Some(InputAction::IncreaseParameter),
            KeyCode::Minus | KeyCode::NumpadSubtract => Some(InputAction::DecreaseParameter),
            KeyCode::Digit1 => Some(InputAction::SwitchMode(SceneMode::Scene3D)),
            KeyCode::Digit2 => Some(InputAction::SwitchMode(SceneMode::Scene2D)),
            KeyCode::Digit3 => Some(InputAction::SwitchMode(SceneMode::ColumbusView)),
            KeyCode::KeyV => Some(InputAction::ViewHomeRegion),
            _ => None,
        }
    }

    /// Map mouse button to an action
    pub fn map_mouse_button(button: MouseButton, state: ElementState) -> Option<InputAction> {
        if button == MouseButton::Left && state == ElementState::Pressed {
            Some(InputAction::Pick)
        } else {
            None
        }
    }
}
