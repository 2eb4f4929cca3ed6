//! Cube texture upload

use crate::resources::CubeMapData;

/// A cube texture on the GPU with the view and sampler the shaders bind
pub struct GpuCubeMap {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub mip_level_count: u32,
}

impl GpuCubeMap {
    /// Upload every face of every mip level of `cubemap`
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, cubemap: &CubeMapData, label: &str) -> Self {
        let mip_level_count = cubemap.mip_level_count();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: cubemap.size,
                height: cubemap.size,
                depth_or_array_layers: 6,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, faces) in cubemap.levels.iter().enumerate() {
            for (layer, face) in faces.iter().enumerate() {
                queue.write_texture(
                    wgpu::ImageCopyTexture {
                        texture: &texture,
                        mip_level: mip_level as u32,
                        origin: wgpu::Origin3d {
                            x: 0,
                            y: 0,
                            z: layer as u32,
                        },
                        aspect: wgpu::TextureAspect::All,
                    },
                    &face.data,
                    wgpu::ImageDataLayout {
                        offset: 0,
                        bytes_per_row: Some(face.width * 4),
                        rows_per_image: Some(face.height),
                    },
                    wgpu::Extent3d {
                        width: face.width,
                        height: face.height,
                        depth_or_array_layers: 1,
                    },
                );
            }
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::debug!(
            "Uploaded cube map '{label}' ({0}x{0}, {mip_level_count} mips)",
            cubemap.size
        );

        Self {
            _texture: texture,
            view,
            sampler,
            mip_level_count,
        }
    }

    /// Highest mip level, as sampled by the shader's roughness lookup
    pub fn max_mip(&self) -> f32 {
        self.mip_level_count.saturating_sub(1) as f32
    }

    pub fn bind_group(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}
