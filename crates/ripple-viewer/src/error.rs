use thiserror::Error;

/// Failures while bringing up or running the viewer.
///
/// Everything except [`ViewerError::Config`] means the platform cannot host
/// the effect; callers log it and keep running without the ripple field.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("no compatible GPU adapter")]
    NoAdapter,
    #[error("failed to create the rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("GPU device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no usable texture format")]
    NoSurfaceFormat,
    #[error("shader or pipeline validation failed: {0}")]
    ShaderCompile(String),
    #[error("invalid ripple configuration: {0}")]
    Config(#[from] ripple::ConfigError),
}

impl ViewerError {
    /// True when the failure is a missing platform capability rather than a
    /// mistake in the requested configuration.
    pub fn is_unsupported(&self) -> bool {
        !matches!(self, ViewerError::Config(_))
    }
}
