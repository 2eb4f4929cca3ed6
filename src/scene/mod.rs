//! Scene management
//!
//! The [`Scene`] owns the actors, the camera, the key light and the
//! environment cube maps. The renderer reads it once per frame.

mod builders;
mod camera;
mod camera_controller;
mod light;

pub use builders::*;
pub use camera::*;
pub use camera_controller::*;
pub use light::*;

use std::sync::Arc;

use crate::resources::{CubeMapData, Mesh, PbrProperties};
use crate::shader::ShaderInjection;

/// Handle of an actor inside its [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(usize);

impl ActorId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A renderable object: mesh, material properties and optional shader code
#[derive(Debug, Clone)]
pub struct Actor {
    pub mesh: Mesh,
    pub properties: PbrProperties,
    pub shader: Option<ShaderInjection>,
}

impl Actor {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            properties: PbrProperties::default(),
            shader: None,
        }
    }

    pub fn with_properties(mut self, properties: PbrProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Replace the built-in shader with one extended by `injection`
    pub fn with_shader(mut self, injection: ShaderInjection) -> Self {
        self.shader = Some(injection);
        self
    }
}

/// The scene containing all renderable content
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub light: DirectionalLight,
    /// Scale of the image-based lighting contribution
    pub environment_intensity: f32,
    actors: Vec<Actor>,
    environment: Option<Arc<CubeMapData>>,
    skybox: Option<Arc<CubeMapData>>,
    size: (u32, u32),
}

impl Scene {
    pub fn new(size: (u32, u32)) -> Self {
        let mut camera = Camera::default();
        camera.set_aspect(size.0 as f32, size.1 as f32);
        Self {
            camera,
            light: DirectionalLight::default(),
            environment_intensity: 1.0,
            actors: Vec::new(),
            environment: None,
            skybox: None,
            size,
        }
    }

    /// Add an actor and return its handle
    pub fn add(&mut self, actor: Actor) -> ActorId {
        let id = ActorId(self.actors.len());
        log::debug!(
            "Added actor {} '{}' ({} triangles)",
            id.0,
            actor.mesh.name,
            actor.mesh.triangle_count()
        );
        self.actors.push(actor);
        id
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.0)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id.0)
    }

    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.actors.iter().enumerate().map(|(i, a)| (ActorId(i), a))
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Current window size in pixels
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub(crate) fn set_size(&mut self, size: (u32, u32)) {
        self.size = size;
        self.camera.set_aspect(size.0 as f32, size.1 as f32);
    }

    /// Light every actor with `cubemap` (image-based lighting)
    pub fn set_environment_texture(&mut self, cubemap: Arc<CubeMapData>) {
        self.environment = Some(cubemap);
    }

    pub fn set_skybox(&mut self, cubemap: Arc<CubeMapData>) {
        self.skybox = Some(cubemap);
    }

    pub fn environment(&self) -> Option<&Arc<CubeMapData>> {
        self.environment.as_ref()
    }

    pub fn skybox(&self) -> Option<&Arc<CubeMapData>> {
        self.skybox.as_ref()
    }

    pub fn uses_image_based_lighting(&self) -> bool {
        self.environment.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::TextureData;
    use glam::{Vec3, Vec4};

    #[test]
    fn actors_are_addressed_by_id() {
        let mut scene = Scene::new((800, 600));
        let a = scene.add(Actor::new(Mesh::sphere(Vec3::ZERO, 1.0, 8, 8, Vec4::ONE)));
        let b = scene.add(Actor::new(Mesh::new("empty")));

        assert_ne!(a, b);
        assert_eq!(scene.actor_count(), 2);
        scene.actor_mut(b).unwrap().properties.opacity = 0.5;
        assert_eq!(scene.actor(b).unwrap().properties.opacity, 0.5);
        assert_eq!(scene.actor(a).unwrap().properties.opacity, 1.0);
    }

    #[test]
    fn environment_enables_image_based_lighting() {
        let mut scene = Scene::new((640, 480));
        assert!(!scene.uses_image_based_lighting());

        let face = TextureData::solid_color(1, 1, [0; 4], "face");
        let cube = Arc::new(CubeMapData::from_faces(std::array::from_fn(|_| face.clone())));
        scene.set_environment_texture(cube.clone());
        scene.set_skybox(cube);

        assert!(scene.uses_image_based_lighting());
        assert!(Arc::ptr_eq(scene.environment().unwrap(), scene.skybox().unwrap()));
    }

    #[test]
    fn resize_updates_the_camera_aspect() {
        let mut scene = Scene::new((800, 600));
        scene.set_size((1000, 500));
        assert_eq!(scene.size(), (1000, 500));
        assert_eq!(scene.camera.projection.aspect, 2.0);
    }
}
