//! Resource management
//!
//! Handles loading and generation of meshes, textures, and materials.

mod material;
mod mesh;
mod surface;
mod texture;

pub use material::*;
pub use mesh::*;
pub use surface::*;
pub use texture::*;
