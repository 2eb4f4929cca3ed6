//! BxDF PBR demo
//!
//! Shades a mesh with the built-in PBR model extended by sheen and clearcoat
//! terms, lit by the skybox cube map. Sliders on the right edit the material.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use bxdf_viewer::control::{PanelLayout, ParameterControl, UniformWriter, PANEL_SIZE};
use bxdf_viewer::resources::{CubeMapData, Interpolation, PbrProperties};
use bxdf_viewer::scene::{Actor, ActorId, MeshKind, Scene};
use bxdf_viewer::shader::{load_shader_fragment, InjectionBlock, ShaderInjection};
use bxdf_viewer::ui::MaterialPanel;
use bxdf_viewer::{AssetPaths, ShowManager, ViewerConfig, ViewerHandler, ViewerResult};

#[derive(Parser, Debug)]
#[command(
    name = "bxdf-viewer",
    about = "PBR viewer with sheen and clearcoat sliders",
    version
)]
struct Args {
    /// Object to shade: surface, spheres or terrain.
    #[arg(long, default_value_t = MeshKind::Spheres)]
    mesh: MeshKind,

    /// Directory with skybox-{px,nx,py,ny,pz,nz}.jpg.
    #[arg(long, default_value = "assets/textures")]
    textures: PathBuf,

    /// Directory with bxdf_dec.frag and bxdf_impl.frag.
    #[arg(long, default_value = "assets/shaders")]
    shaders: PathBuf,

    /// glTF file used by --mesh surface.
    #[arg(long, default_value = "assets/surface.gltf")]
    surface: PathBuf,

    /// Initial window width in pixels.
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in pixels.
    #[arg(long, default_value = "720")]
    height: u32,

    /// Disable vertical sync (may cause tearing).
    #[arg(long)]
    no_vsync: bool,

    /// Seed for the terrain sample order and colors.
    #[arg(long, default_value = "0")]
    seed: u64,
}

impl From<Args> for ViewerConfig {
    fn from(args: Args) -> Self {
        Self {
            width: args.width,
            height: args.height,
            vsync: !args.no_vsync,
            mesh: args.mesh,
            assets: AssetPaths {
                textures: args.textures,
                shaders: args.shaders,
                surface: args.surface,
            },
            terrain_seed: args.seed,
            ..Default::default()
        }
    }
}

/// Slider panel wired to the shaded actor
struct BxdfDemo {
    control: ParameterControl,
    panel: MaterialPanel,
    layout: PanelLayout,
    actor: ActorId,
}

impl ViewerHandler for BxdfDemo {
    fn on_ui(&mut self, ctx: &egui::Context, scene: &mut Scene) {
        let Some(actor) = scene.actor_mut(self.actor) else {
            return;
        };
        let mut binding = self.control.bind(&mut actor.properties);
        self.panel.show(ctx, &self.layout, &mut binding);
    }

    fn on_uniform_upload(&mut self, actor: ActorId, uniforms: &mut dyn UniformWriter) {
        if actor == self.actor {
            self.control.on_uniform_upload(uniforms);
        }
    }

    fn on_window_resize(&mut self, size: (u32, u32)) {
        self.layout.on_window_resize(size);
    }
}

fn run(config: ViewerConfig) -> ViewerResult<()> {
    let manager = ShowManager::new(config.clone())?;
    let size = manager.size();
    let ui_size = manager.logical_size();

    let mesh = config.mesh.builder(&config).build()?;
    let properties = PbrProperties {
        interpolation: Interpolation::Pbr,
        metallic: 0.0,
        roughness: 0.0,
        specular: 0.0,
        specular_tint: 0.0,
        opacity: 0.5,
    };

    let injection = ShaderInjection::new()
        .with_declaration(load_shader_fragment(&config.assets.shaders, "bxdf_dec.frag")?)
        .with_block(
            InjectionBlock::Light,
            load_shader_fragment(&config.assets.shaders, "bxdf_impl.frag")?,
        );

    let mut scene = Scene::new(size);
    scene.camera.position.z = config.camera_distance;

    let cubemap = Arc::new(CubeMapData::load(&config.assets.textures, "skybox", "jpg"));
    scene.set_environment_texture(Arc::clone(&cubemap));
    scene.set_skybox(cubemap);

    let actor = scene.add(Actor::new(mesh).with_properties(properties.clone()).with_shader(injection));

    let control = ParameterControl::default();
    let panel = MaterialPanel::new(&control, &properties);
    let mut demo = BxdfDemo {
        control,
        panel,
        layout: PanelLayout::anchored_right(ui_size, PANEL_SIZE),
        actor,
    };

    log::info!("Showing {} with sheen and clearcoat", config.mesh);
    manager.start(scene, &mut demo)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::from(Args::parse());
    if let Err(e) = run(config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
