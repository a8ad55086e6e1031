//! Error types for scene orchestration and the GPU layer beneath it

use std::fmt;

/// Failure reported by a GPU backend
#[derive(Debug, Clone, PartialEq)]
pub enum GpuError {
    /// A texture or framebuffer was requested with a zero dimension
    InvalidSize { width: u32, height: u32 },
    /// Backend refused to create a resource
    ResourceCreation(String),
    /// GPU ran out of memory
    OutOfMemory,
    /// Presentation surface was lost and must be reconfigured
    SurfaceLost,
    /// Other presentation surface failure
    Surface(String),
    /// Reading pixels back from the GPU failed
    Readback(String),
    /// No adapter or device could be obtained
    DeviceRequest(String),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::InvalidSize { width, height } => {
                write!(f, "Invalid texture size {}x{}", width, height)
            }
            GpuError::ResourceCreation(msg) => write!(f, "GPU resource creation failed: {}", msg),
            GpuError::OutOfMemory => write!(f, "GPU out of memory"),
            GpuError::SurfaceLost => write!(f, "Surface lost"),
            GpuError::Surface(msg) => write!(f, "Surface error: {}", msg),
            GpuError::Readback(msg) => write!(f, "Pixel readback failed: {}", msg),
            GpuError::DeviceRequest(msg) => write!(f, "GPU device request failed: {}", msg),
        }
    }
}

impl std::error::Error for GpuError {}

/// Error type for scene operations
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A required argument was not supplied; nothing was changed
    MissingArgument(&'static str),
    /// The scene was torn down; no further operations are allowed
    Destroyed,
    /// The GPU layer produced no post effects to composite with
    NoPostEffects,
    /// A primitive failed during update or draw
    Primitive(String),
    /// GPU layer failure, propagated unchanged
    Gpu(GpuError),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::MissingArgument(name) => write!(f, "{} is required", name),
            SceneError::Destroyed => write!(f, "Scene has been destroyed"),
            SceneError::NoPostEffects => write!(f, "Scene needs at least one post effect"),
            SceneError::Primitive(msg) => write!(f, "Primitive error: {}", msg),
            SceneError::Gpu(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Gpu(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GpuError> for SceneError {
    fn from(err: GpuError) -> Self {
        SceneError::Gpu(err)
    }
}
