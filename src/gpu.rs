use cgmath::Matrix4;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::TransformUniform;
use crate::error::{InitializationError, SetupError};
use crate::frame_loop::{FrameError, FrameSink};
use crate::mesh::{GpuMesh, Mesh};
use crate::shader::{self, ShaderPair};
use crate::texture;

/// Owns every device-side resource: surface, device and queue, pipeline, the
/// uploaded mesh, the transform uniform, and the depth attachment. Built once
/// before the loop starts; dropping it releases everything, which the loop
/// does exactly once on its terminal transition.
pub struct GpuState {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
    mesh: GpuMesh,
    depth_texture: texture::Texture,
}

impl GpuState {
    /// Bootstraps the device context for `window`, builds the shader pair and
    /// pipeline, and uploads `mesh`.
    ///
    /// The caller must keep `window` alive for as long as this state exists;
    /// `Application` owns both and declares this state first so it drops
    /// before the window.
    pub fn new(window: &Window, mesh: &Mesh) -> Result<Self, SetupError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // SAFETY: the surface must not outlive the window; see above.
        let surface = unsafe { instance.create_surface(window) }
            .map_err(InitializationError::Surface)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(InitializationError::NoAdapter)?;
        log::info!("rendering on {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("main device"),
                features: wgpu::Features::empty(),
                limits: wgpu::Limits::default(),
            },
            None,
        ))
        .map_err(InitializationError::Device)?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        // The shader emits linear color; an sRGB surface keeps it from being
        // displayed darker than intended.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shaders = ShaderPair::build(&device)?;

        log::debug!(
            "uploading {} triangles ({} vertices)",
            mesh.triangle_count(),
            mesh.vertex_count()
        );
        let mesh = GpuMesh::upload(&device, mesh);

        // The combined transform, rewritten every frame.
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Buffer"),
            contents: bytemuck::cast_slice(&[TransformUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let transform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("transform_bind_group_layout"),
            });

        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &transform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
            label: Some("transform_bind_group"),
        });

        let depth_texture =
            texture::Texture::create_depth_texture(&device, &config, "depth_texture");

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&transform_bind_group_layout],
                push_constant_ranges: &[],
            });

        // A pipeline whose layout disagrees with the shader interface fails
        // validation here, during setup, instead of binding nothing at draw
        // time.
        let render_pipeline = shader::validated(&device, || {
            create_render_pipeline(&device, &render_pipeline_layout, config.format, &shaders)
        })?;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            transform_buffer,
            transform_bind_group,
            mesh,
            depth_texture,
        })
    }

    /// Applies a window resize: reconfigure the surface and rebuild the depth
    /// attachment. The projection is fixed at startup and left alone.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.reconfigure();
        }
    }
}

impl FrameSink for GpuState {
    fn submit_frame(&mut self, transform: Matrix4<f32>) -> Result<(), FrameError> {
        let output = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                return Err(FrameError::SurfaceLost)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(FrameError::OutOfMemory),
            Err(error) => {
                log::warn!("dropping a frame: {error:?}");
                return Err(FrameError::Transient);
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut uniform = TransformUniform::default();
        uniform.set_transform(transform);
        self.queue
            .write_buffer(&self.transform_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // begin_render_pass borrows the encoder mutably, so the pass lives in
        // its own scope; every binding it holds ends with it.
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.transform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.mesh.position_buffer().slice(..));
            render_pass.set_vertex_buffer(1, self.mesh.color_buffer().slice(..));
            render_pass.draw(0..self.mesh.vertex_count(), 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, &self.config, "depth_texture");
    }
}

fn create_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    shaders: &ShaderPair,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shaders.vertex,
            entry_point: "vs_main",
            buffers: &[GpuMesh::position_layout(), GpuMesh::color_layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shaders.fragment,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState {
                    alpha: wgpu::BlendComponent::REPLACE,
                    color: wgpu::BlendComponent::REPLACE,
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // The camera orbits below the base plane, so both faces of the
            // base triangles must stay visible.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: texture::Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
