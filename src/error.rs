use thiserror::Error;

use crate::shader::ShaderBuildError;

/// One-shot bootstrap failures: event loop, window, surface, adapter, device.
/// None of these are retried; the process reports the message and exits -1.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("failed to create the event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to open the window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create the rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter found")]
    NoAdapter,

    #[error("failed to acquire the graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Anything that can go wrong before the render loop starts running.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Initialization(#[from] InitializationError),

    #[error(transparent)]
    ShaderBuild(#[from] ShaderBuildError),
}
