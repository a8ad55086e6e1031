//! Viewer configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`GEOSCENE_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use geoscene_core::{ClearState, SceneMode, PARAMETER_STEP, SHADER_EVICTION_INTERVAL};
use geoscene_math::{Cartesian3, Extent};

/// Main viewer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Camera configuration
    #[serde(default)]
    pub camera: CameraConfig,
    /// Scene configuration
    #[serde(default)]
    pub scene: SceneConfig,
    /// Rendering configuration
    #[serde(default)]
    pub rendering: RenderingConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl ViewerConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`GEOSCENE_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // GEOSCENE_SCENE__MODE=2d -> scene.mode = "2d"
        figment = figment.merge(Env::prefixed("GEOSCENE_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "GeoScene".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f64,
    /// Near clipping plane in meters
    pub near: f64,
    /// Far clipping plane in meters
    pub far: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 1.0,
            far: 500_000_000.0,
        }
    }
}

/// Mode the scene starts in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartMode {
    #[default]
    #[serde(rename = "3d")]
    Scene3D,
    #[serde(rename = "2d")]
    Scene2D,
    #[serde(rename = "columbus")]
    ColumbusView,
}

impl From<StartMode> for SceneMode {
    fn from(mode: StartMode) -> Self {
        match mode {
            StartMode::Scene3D => SceneMode::Scene3D,
            StartMode::Scene2D => SceneMode::Scene2D,
            StartMode::ColumbusView => SceneMode::ColumbusView,
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Initial scene mode ("3d", "2d" or "columbus")
    pub mode: StartMode,
    /// Index of the post effect active at startup
    pub post_effect: usize,
    /// Amount one increase/decrease changes an effect parameter by
    pub parameter_step: f32,
    /// Frames between sweeps of released shader programs
    pub shader_eviction_interval: u32,
    /// Region the view key flies to, [west, south, east, north] in degrees
    pub home_region: [f64; 4],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mode: StartMode::Scene3D,
            post_effect: 0,
            parameter_step: PARAMETER_STEP,
            shader_eviction_interval: SHADER_EVICTION_INTERVAL,
            home_region: [-10.0, 35.0, 30.0, 60.0],
        }
    }
}

impl SceneConfig {
    pub fn home_extent(&self) -> Extent {
        let [west, south, east, north] = self.home_region;
        Extent::from_degrees(west, south, east, north)
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Clear color of the offscreen target [r, g, b, a]
    pub clear_color: [f32; 4],
    /// Sun position in world coordinates (meters)
    pub sun_position: [f64; 3],
    /// Shade the globe by the sun direction
    pub lighting: bool,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            sun_position: [1.5e11, 0.0, 0.0],
            lighting: true,
        }
    }
}

impl RenderingConfig {
    pub fn clear_state(&self) -> ClearState {
        ClearState {
            color: Some(self.clear_color),
            ..ClearState::default()
        }
    }

    pub fn sun(&self) -> Cartesian3 {
        let [x, y, z] = self.sun_position;
        Cartesian3::new(x, y, z)
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace), overridden by `RUST_LOG`
    pub log_level: String,
    /// Show the active effect and its parameter in the window title
    pub show_effect_in_title: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_effect_in_title: true,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
