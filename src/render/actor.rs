//! GPU-side state of one actor

use wgpu::util::DeviceExt;

use super::pipelines::{ActorPipelines, BindGroupLayouts};
use crate::error::ViewerResult;
use crate::resources::MaterialUniformData;
use crate::scene::{Actor, ActorId};
use crate::shader::{ShaderInjection, UniformBlock};

/// Custom uniforms of an actor whose shader declares them
struct CustomUniforms {
    block: UniformBlock,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct GpuActor {
    pub id: ActorId,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
    custom: Option<CustomUniforms>,
    pipelines: ActorPipelines,
    translucent: bool,
}

impl GpuActor {
    /// Compose the actor's shader and create its buffers and pipelines.
    /// Returns `None` for an actor without geometry.
    pub fn new(
        device: &wgpu::Device,
        layouts: &BindGroupLayouts,
        color_format: wgpu::TextureFormat,
        id: ActorId,
        actor: &Actor,
    ) -> ViewerResult<Option<Self>> {
        let mesh = &actor.mesh;
        if mesh.is_empty() {
            log::warn!("Actor '{}' has no triangles, skipping", mesh.name);
            return Ok(None);
        }

        let composed = match &actor.shader {
            Some(injection) => injection.build()?,
            None => ShaderInjection::new().build()?,
        };
        let label = format!("Actor {} ({})", id.index(), mesh.name);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(composed.source.as_str().into()),
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: bytemuck::bytes_of(&actor.properties.uniform_data()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &layouts.material,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
        });

        let mut custom_layout = None;
        let custom = composed.uniforms.map(|block| {
            let layout = layouts.custom(device, block.binding());
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Custom Uniform Buffer"),
                contents: block.bytes(),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Custom Uniform Bind Group"),
                layout: &layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: block.binding(),
                    resource: buffer.as_entire_binding(),
                }],
            });
            custom_layout = Some(layout);
            CustomUniforms {
                block,
                buffer,
                bind_group,
            }
        });

        let pipelines = ActorPipelines::new(
            device,
            &shader,
            layouts,
            custom_layout.as_ref(),
            color_format,
            &label,
        );

        log::info!(
            "Prepared {label}: {} vertices, {} custom uniforms",
            mesh.vertex_count(),
            custom.as_ref().map_or(0, |c| c.block.len())
        );

        Ok(Some(Self {
            id,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
            material_buffer,
            material_bind_group,
            custom,
            pipelines,
            translucent: actor.properties.is_translucent(),
        }))
    }

    /// Write the material and let `on_upload` fill the custom uniforms
    pub fn upload(
        &mut self,
        queue: &wgpu::Queue,
        material: &MaterialUniformData,
        translucent: bool,
        on_upload: &mut dyn FnMut(ActorId, &mut UniformBlock),
    ) {
        self.translucent = translucent;
        queue.write_buffer(&self.material_buffer, 0, bytemuck::bytes_of(material));
        if let Some(custom) = &mut self.custom {
            on_upload(self.id, &mut custom.block);
            queue.write_buffer(&custom.buffer, 0, custom.block.bytes());
        }
    }

    pub fn is_translucent(&self) -> bool {
        self.translucent
    }

    /// Record the draw. Groups 0 and 2 must already be bound.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        let pipeline = if self.translucent {
            &self.pipelines.translucent
        } else {
            &self.pipelines.opaque
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(1, &self.material_bind_group, &[]);
        if let Some(custom) = &self.custom {
            pass.set_bind_group(crate::shader::CUSTOM_UNIFORM_GROUP, &custom.bind_group, &[]);
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
