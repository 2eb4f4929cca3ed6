//! bxdf-viewer - interactive PBR viewer with an extended BRDF
//!
//! Renders an object with sheen and clearcoat terms injected into the
//! built-in PBR shader, lit by an environment cube map that also serves as the
//! skybox. A slider panel edits the material live.
//!
//! # Layout
//! - [`control`]: parameter state and the per-draw uniform upload
//! - [`shader`]: shader injection and uniform reflection (naga)
//! - [`scene`]: actors, camera and the demo mesh builders
//! - [`ui`]: the egui slider panel
//! - [`render`]: the wgpu renderer (skybox, actors, egui overlay)
//! - [`show_manager`]: window and event loop

pub mod control;
pub mod egui_integration;
pub mod error;
pub mod geometry;
pub mod render;
pub mod resources;
pub mod scene;
pub mod shader;
pub mod show_manager;
pub mod ui;
pub mod window;

use std::path::PathBuf;

pub use error::{ViewerError, ViewerResult};
pub use scene::MeshKind;
pub use show_manager::{ShowManager, ViewerHandler};
pub use window::Window;

/// Locations of the on-disk assets
#[derive(Debug, Clone)]
pub struct AssetPaths {
    /// Directory holding `skybox-{px,nx,py,ny,pz,nz}.jpg`
    pub textures: PathBuf,
    /// Directory holding the injected shader fragments
    pub shaders: PathBuf,
    /// glTF file used by [`MeshKind::Surface`]
    pub surface: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            textures: PathBuf::from("assets/textures"),
            shaders: PathBuf::from("assets/shaders"),
            surface: PathBuf::from("assets/surface.gltf"),
        }
    }
}

/// Configuration for the viewer
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Enable vsync
    pub vsync: bool,
    /// Which object to shade
    pub mesh: MeshKind,
    pub assets: AssetPaths,
    /// Distance of the initial camera from the origin, along +Z
    pub camera_distance: f32,
    /// Seed for the terrain colors and sample order
    pub terrain_seed: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "BxDF PBR".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            mesh: MeshKind::default(),
            assets: AssetPaths::default(),
            camera_distance: 50.0,
            terrain_seed: 0,
        }
    }
}
