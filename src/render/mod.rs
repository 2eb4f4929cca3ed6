//! wgpu renderer
//!
//! Draws the skybox, then every actor of the [`Scene`] (opaque ones first),
//! then the egui overlay. Actor shaders come from
//! [`ShaderInjection::build`](crate::shader::ShaderInjection::build); actors
//! whose shader declares custom uniforms get them refreshed through a
//! callback before every frame's draws are recorded.

mod actor;
mod cubemap;
mod pipelines;

use std::sync::Arc;

use self::actor::GpuActor;
use self::cubemap::GpuCubeMap;
use self::pipelines::{skybox_pipeline, BindGroupLayouts, DEPTH_FORMAT};
use crate::egui_integration::EguiIntegration;
use crate::error::{ViewerError, ViewerResult};
use crate::resources::{CubeMapData, TextureData, CUBE_FACES};
use crate::scene::{ActorId, CameraUniformData, LightUniformData, Scene};
use crate::shader::UniformBlock;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.12,
    a: 1.0,
};

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    layouts: BindGroupLayouts,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    skybox_pipeline: wgpu::RenderPipeline,
    skybox_bind_group: Option<wgpu::BindGroup>,
    environment: GpuCubeMap,
    environment_bind_group: wgpu::BindGroup,
    environment_enabled: bool,
    actors: Vec<GpuActor>,
    egui: EguiIntegration,
}

impl Renderer {
    /// Create the surface, device and shared pipeline state for `window`
    pub fn new(window: Arc<winit::window::Window>, vsync: bool) -> ViewerResult<Self> {
        pollster::block_on(Self::new_async(window, vsync))
    }

    async fn new_async(window: Arc<winit::window::Window>, vsync: bool) -> ViewerResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| ViewerError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ViewerError::Adapter)?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Found adapter: {} ({:?} backend)",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| ViewerError::Device(e.to_string()))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| ViewerError::Surface("surface reports no formats".into()))?;

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let (width, height) = clamp_size(&device, size.width, size.height);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, width, height);
        let layouts = BindGroupLayouts::new(&device);

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniformData>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Buffer"),
            size: std::mem::size_of::<LightUniformData>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &layouts.frame,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        // Actors always bind group 2; without an environment it holds a black cube
        let black = CubeMapData::from_faces(
            CUBE_FACES.map(|face| TextureData::solid_color(1, 1, [0, 0, 0, 255], face)),
        );
        let environment = GpuCubeMap::upload(&device, &queue, &black, "Empty Environment");
        let environment_bind_group = environment.bind_group(&device, &layouts.cube, "Environment Bind Group");

        let skybox_pipeline = skybox_pipeline(&device, &layouts, surface_format);
        let egui = EguiIntegration::new(&device, surface_format, &window);

        log::info!("Renderer ready: {width}x{height} {surface_format:?}, vsync {vsync}");

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            depth_view,
            layouts,
            camera_buffer,
            light_buffer,
            frame_bind_group,
            skybox_pipeline,
            skybox_bind_group: None,
            environment,
            environment_bind_group,
            environment_enabled: false,
            actors: Vec::new(),
            egui,
        })
    }

    /// Upload the scene's actors and cube maps. Replaces anything uploaded
    /// before.
    pub fn prepare_scene(&mut self, scene: &Scene) -> ViewerResult<()> {
        self.actors.clear();
        for (id, actor) in scene.actors() {
            if let Some(gpu) = GpuActor::new(&self.device, &self.layouts, self.surface_config.format, id, actor)? {
                self.actors.push(gpu);
            }
        }

        self.environment_enabled = false;
        let mut environment_view = None;
        if let Some(cubemap) = scene.environment() {
            self.environment = GpuCubeMap::upload(&self.device, &self.queue, cubemap, "Environment");
            self.environment_bind_group =
                self.environment
                    .bind_group(&self.device, &self.layouts.cube, "Environment Bind Group");
            self.environment_enabled = true;
            environment_view = Some(cubemap);
        }

        self.skybox_bind_group = scene.skybox().map(|skybox| {
            let shared = environment_view.is_some_and(|env| Arc::ptr_eq(env, skybox));
            if shared {
                self.environment
                    .bind_group(&self.device, &self.layouts.cube, "Skybox Bind Group")
            } else {
                GpuCubeMap::upload(&self.device, &self.queue, skybox, "Skybox").bind_group(
                    &self.device,
                    &self.layouts.cube,
                    "Skybox Bind Group",
                )
            }
        });

        Ok(())
    }

    pub fn egui(&self) -> &EguiIntegration {
        &self.egui
    }

    pub fn egui_mut(&mut self) -> &mut EguiIntegration {
        &mut self.egui
    }

    /// Current surface size
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (width, height) = clamp_size(&self.device, width, height);
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    /// Render one frame.
    ///
    /// `on_upload` is called once per actor with custom uniforms, right before
    /// its buffers are written for this frame.
    pub fn render(
        &mut self,
        scene: &Scene,
        mut on_upload: impl FnMut(ActorId, &mut UniformBlock),
    ) -> ViewerResult<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(ViewerError::Surface(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let environment = self
            .environment_enabled
            .then(|| (self.environment.max_mip(), scene.environment_intensity));
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&scene.camera.uniform_data()),
        );
        self.queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::bytes_of(&scene.light.to_gpu_data(environment)),
        );

        for gpu in &mut self.actors {
            let Some(actor) = scene.actor(gpu.id) else {
                continue;
            };
            gpu.upload(
                &self.queue,
                &actor.properties.uniform_data(),
                actor.properties.is_translucent(),
                &mut on_upload,
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            if let Some(skybox) = &self.skybox_bind_group {
                pass.set_pipeline(&self.skybox_pipeline);
                pass.set_bind_group(1, skybox, &[]);
                pass.draw(0..3, 0..1);
            }

            pass.set_bind_group(2, &self.environment_bind_group, &[]);
            let (translucent, opaque): (Vec<&GpuActor>, Vec<&GpuActor>) =
                self.actors.iter().partition(|a| a.is_translucent());
            for gpu in opaque.into_iter().chain(translucent) {
                gpu.draw(&mut pass);
            }
        }

        let size = self.size();
        self.egui
            .render(&self.device, &self.queue, &mut encoder, &view, size);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Clamp to device limits while maintaining aspect ratio
fn clamp_size(device: &wgpu::Device, width: u32, height: u32) -> (u32, u32) {
    let max_size = device.limits().max_texture_dimension_2d;
    if width > max_size || height > max_size {
        let scale = (max_size as f32 / width as f32).min(max_size as f32 / height as f32);
        (
            ((width as f32 * scale) as u32).max(1),
            ((height as f32 * scale) as u32).max(1),
        )
    } else {
        (width.max(1), height.max(1))
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
