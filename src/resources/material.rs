//! Material definitions for PBR rendering
//!
//! [`PbrProperties`] is the built-in material model every actor carries. The
//! extended BRDF terms (sheen and clearcoat) have no slot there; they live in
//! [`MaterialParameters`] and reach the GPU through injected shader uniforms.

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Shading interpolation model of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    Flat,
    Gouraud,
    #[default]
    Phong,
    Pbr,
}

impl Interpolation {
    fn shader_index(self) -> f32 {
        match self {
            Interpolation::Flat => 0.0,
            Interpolation::Gouraud => 1.0,
            Interpolation::Phong => 2.0,
            Interpolation::Pbr => 3.0,
        }
    }
}

/// Material parameters that can be driven by a slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialParameter {
    Metallic,
    Specular,
    SpecularTint,
    Roughness,
    Sheen,
    SheenTint,
    Clearcoat,
    ClearcoatGloss,
    Opacity,
}

impl MaterialParameter {
    /// Every parameter, in panel order
    pub const ALL: [MaterialParameter; 9] = [
        MaterialParameter::Metallic,
        MaterialParameter::Specular,
        MaterialParameter::SpecularTint,
        MaterialParameter::Roughness,
        MaterialParameter::Sheen,
        MaterialParameter::SheenTint,
        MaterialParameter::Clearcoat,
        MaterialParameter::ClearcoatGloss,
        MaterialParameter::Opacity,
    ];

    /// The parameters forwarded as custom shader uniforms
    pub const EXTENDED: [MaterialParameter; 4] = [
        MaterialParameter::Sheen,
        MaterialParameter::SheenTint,
        MaterialParameter::Clearcoat,
        MaterialParameter::ClearcoatGloss,
    ];

    /// Whether the built-in material model has a slot for this parameter
    pub fn is_native(self) -> bool {
        matches!(
            self,
            MaterialParameter::Metallic
                | MaterialParameter::Specular
                | MaterialParameter::SpecularTint
                | MaterialParameter::Roughness
                | MaterialParameter::Opacity
        )
    }

    /// Name of the shader uniform carrying this parameter, for non-native ones
    pub fn uniform_name(self) -> Option<&'static str> {
        match self {
            MaterialParameter::Sheen => Some("sheen"),
            MaterialParameter::SheenTint => Some("sheenTint"),
            MaterialParameter::Clearcoat => Some("clearcoat"),
            MaterialParameter::ClearcoatGloss => Some("clearcoatGloss"),
            _ => None,
        }
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            MaterialParameter::Metallic => "Metallic",
            MaterialParameter::Specular => "Specular",
            MaterialParameter::SpecularTint => "Specular Tint",
            MaterialParameter::Roughness => "Roughness",
            MaterialParameter::Sheen => "Sheen",
            MaterialParameter::SheenTint => "Sheen Tint",
            MaterialParameter::Clearcoat => "Clearcoat",
            MaterialParameter::ClearcoatGloss => "Clearcoat Gloss",
            MaterialParameter::Opacity => "Opacity",
        }
    }
}

/// Extended BRDF coefficients, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialParameters {
    pub sheen: f32,
    pub sheen_tint: f32,
    pub clearcoat: f32,
    pub clearcoat_gloss: f32,
}

impl MaterialParameters {
    /// Read an extended parameter. Native parameters return `None`.
    pub fn get(&self, parameter: MaterialParameter) -> Option<f32> {
        match parameter {
            MaterialParameter::Sheen => Some(self.sheen),
            MaterialParameter::SheenTint => Some(self.sheen_tint),
            MaterialParameter::Clearcoat => Some(self.clearcoat),
            MaterialParameter::ClearcoatGloss => Some(self.clearcoat_gloss),
            _ => None,
        }
    }

    /// Write an extended parameter. Returns `false` for native parameters.
    pub fn set(&mut self, parameter: MaterialParameter, value: f32) -> bool {
        let slot = match parameter {
            MaterialParameter::Sheen => &mut self.sheen,
            MaterialParameter::SheenTint => &mut self.sheen_tint,
            MaterialParameter::Clearcoat => &mut self.clearcoat,
            MaterialParameter::ClearcoatGloss => &mut self.clearcoat_gloss,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// Built-in material property object of an actor
#[derive(Debug, Clone, PartialEq)]
pub struct PbrProperties {
    pub interpolation: Interpolation,
    pub metallic: f32,
    pub roughness: f32,
    pub specular: f32,
    pub specular_tint: f32,
    pub opacity: f32,
}

impl Default for PbrProperties {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::default(),
            metallic: 0.0,
            roughness: 0.5,
            specular: 0.5,
            specular_tint: 0.0,
            opacity: 1.0,
        }
    }
}

impl PbrProperties {
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Read a native parameter. Extended parameters return `None`.
    pub fn get(&self, parameter: MaterialParameter) -> Option<f32> {
        match parameter {
            MaterialParameter::Metallic => Some(self.metallic),
            MaterialParameter::Specular => Some(self.specular),
            MaterialParameter::SpecularTint => Some(self.specular_tint),
            MaterialParameter::Roughness => Some(self.roughness),
            MaterialParameter::Opacity => Some(self.opacity),
            _ => None,
        }
    }

    /// Write a native parameter. Returns `false` for extended parameters.
    pub fn set(&mut self, parameter: MaterialParameter, value: f32) -> bool {
        let slot = match parameter {
            MaterialParameter::Metallic => &mut self.metallic,
            MaterialParameter::Specular => &mut self.specular,
            MaterialParameter::SpecularTint => &mut self.specular_tint,
            MaterialParameter::Roughness => &mut self.roughness,
            MaterialParameter::Opacity => &mut self.opacity,
            _ => return false,
        };
        *slot = value;
        true
    }

    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }

    /// Create a uniform data struct for GPU
    pub fn uniform_data(&self) -> MaterialUniformData {
        MaterialUniformData {
            params: Vec4::new(
                self.metallic,
                self.roughness,
                self.specular,
                self.specular_tint,
            ),
            opacity_model: Vec4::new(
                self.opacity,
                self.interpolation.shader_index(),
                0.0,
                0.0,
            ),
        }
    }
}

/// Material uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniformData {
    pub params: Vec4,        // x=metallic, y=roughness, z=specular, w=specular tint
    pub opacity_model: Vec4, // x=opacity, y=interpolation model, zw=padding
}
