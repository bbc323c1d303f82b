use std::io;

use thiserror::Error;

use crate::resources;

pub const VERTEX_SHADER_FILE: &str = "pyramid.vert.wgsl";
pub const FRAGMENT_SHADER_FILE: &str = "pyramid.frag.wgsl";

/// Shader construction failures, fatal during setup: unreadable source,
/// WGSL validation failure, or a pipeline that disagrees with the shader
/// interface.
#[derive(Debug, Error)]
pub enum ShaderBuildError {
    #[error("failed to read shader source {file}: {source}")]
    Read {
        file: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("shader {label:?} failed to compile: {message}")]
    Compile { label: &'static str, message: String },

    #[error("pipeline does not match the shader interface: {message}")]
    Link { message: String },
}

/// The compiled vertex and fragment stages of the one program this demo runs.
pub struct ShaderPair {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

impl ShaderPair {
    pub fn build(device: &wgpu::Device) -> Result<Self, ShaderBuildError> {
        Ok(Self {
            vertex: compile(device, "pyramid vertex", VERTEX_SHADER_FILE)?,
            fragment: compile(device, "pyramid fragment", FRAGMENT_SHADER_FILE)?,
        })
    }
}

fn compile(
    device: &wgpu::Device,
    label: &'static str,
    file: &'static str,
) -> Result<wgpu::ShaderModule, ShaderBuildError> {
    let source = resources::load_text(file).map_err(|source| ShaderBuildError::Read { file, source })?;

    // create_shader_module reports WGSL validation failures through the
    // device error scope rather than a Result.
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(ShaderBuildError::Compile {
            label,
            message: error.to_string(),
        }),
        None => Ok(module),
    }
}

/// Runs `build` under a validation error scope and converts any captured
/// validation failure into a link error. Used around pipeline creation so an
/// interface mismatch fails setup loudly instead of binding an invalid handle.
pub fn validated<T>(
    device: &wgpu::Device,
    build: impl FnOnce() -> T,
) -> Result<T, ShaderBuildError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(ShaderBuildError::Link {
            message: error.to_string(),
        }),
        None => Ok(value),
    }
}
