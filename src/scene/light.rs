//! Scene lighting

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Directional light (like the sun)
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Direction the light travels
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.3, -0.5, -1.0).normalize(),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize(),
            color,
            intensity,
        }
    }

    /// Convert to GPU data. `environment` is the max mip level and the
    /// intensity of image-based lighting, when it is enabled.
    pub fn to_gpu_data(&self, environment: Option<(f32, f32)>) -> LightUniformData {
        let environment = match environment {
            Some((max_mip, intensity)) => Vec4::new(max_mip, intensity, 1.0, 0.0),
            None => Vec4::ZERO,
        };
        LightUniformData {
            direction: self.direction.extend(0.0),
            color: self.color.extend(self.intensity),
            environment,
        }
    }
}

/// Light uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniformData {
    /// xyz = direction
    pub direction: Vec4,
    /// xyz = color, w = intensity
    pub color: Vec4,
    /// x = max mip level, y = intensity, z = enabled flag
    pub environment: Vec4,
}
