//! Scene display modes

use std::fmt;

/// How the globe is presented
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SceneMode {
    /// Perspective view of the full ellipsoid
    #[default]
    Scene3D,
    /// Flat map, orthographic top-down view
    Scene2D,
    /// Flat map seen through a perspective camera
    ColumbusView,
    /// Transitioning between modes; mode-specific operations are unavailable
    Morphing,
}

impl SceneMode {
    /// Morph time a settled scene in this mode has (1.0 = 3D, 0.0 = flat)
    pub fn morph_time(self) -> Option<f64> {
        match self {
            SceneMode::Scene3D => Some(1.0),
            SceneMode::Scene2D | SceneMode::ColumbusView => Some(0.0),
            SceneMode::Morphing => None,
        }
    }
}

impl fmt::Display for SceneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SceneMode::Scene3D => "3D",
            SceneMode::Scene2D => "2D",
            SceneMode::ColumbusView => "Columbus view",
            SceneMode::Morphing => "morphing",
        };
        f.write_str(name)
    }
}
