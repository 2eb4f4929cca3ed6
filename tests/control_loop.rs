//! Slider -> control state -> shader uniform path, without a GPU

use std::path::{Path, PathBuf};

use bxdf_viewer::control::{PanelLayout, ParameterControl, PANEL_SIZE};
use bxdf_viewer::resources::{CubeMapData, Interpolation, MaterialParameter, PbrProperties, CUBE_FACES};
use bxdf_viewer::shader::{load_shader_fragment, InjectionBlock, ShaderInjection, UniformBlock};
use bxdf_viewer::ui::MaterialPanel;
use rstest::rstest;

fn shader_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/shaders")
}

fn bxdf_uniforms() -> UniformBlock {
    let dir = shader_dir();
    let injection = ShaderInjection::new()
        .with_declaration(load_shader_fragment(&dir, "bxdf_dec.frag").unwrap())
        .with_block(
            InjectionBlock::Light,
            load_shader_fragment(&dir, "bxdf_impl.frag").unwrap(),
        );
    injection
        .build()
        .unwrap()
        .uniforms
        .expect("bxdf fragments declare a uniform block")
}

fn demo_properties() -> PbrProperties {
    PbrProperties {
        interpolation: Interpolation::Pbr,
        metallic: 0.0,
        roughness: 0.0,
        specular: 0.0,
        specular_tint: 0.0,
        opacity: 0.5,
    }
}

#[test]
fn slider_values_reach_the_shader_exactly() {
    let mut control = ParameterControl::default();
    let mut properties = demo_properties();
    let mut panel = MaterialPanel::new(&control, &properties);

    {
        let mut binding = control.bind(&mut properties);
        assert!(panel.set_slider(MaterialParameter::Sheen, 0.3, &mut binding));
        assert!(panel.set_slider(MaterialParameter::ClearcoatGloss, 0.7, &mut binding));
    }

    let mut uniforms = bxdf_uniforms();
    control.on_uniform_upload(&mut uniforms);

    assert_eq!(uniforms.get_f32("sheen"), Some(0.3));
    assert_eq!(uniforms.get_f32("clearcoatGloss"), Some(0.7));
    assert_eq!(uniforms.get_f32("sheenTint"), Some(0.0));
    assert_eq!(uniforms.get_f32("clearcoat"), Some(0.0));
    assert_eq!(properties, demo_properties());
}

#[test]
fn native_slider_skips_the_uniform_block() {
    let mut control = ParameterControl::default();
    let mut properties = demo_properties();
    let mut panel = MaterialPanel::new(&control, &properties);

    {
        let mut binding = control.bind(&mut properties);
        panel.set_slider(MaterialParameter::Roughness, 0.6, &mut binding);
    }
    assert_eq!(properties.roughness, 0.6);

    let mut uniforms = bxdf_uniforms();
    let before = uniforms.bytes().to_vec();
    control.on_uniform_upload(&mut uniforms);
    assert_eq!(uniforms.bytes(), before.as_slice());
}

#[test]
fn panel_follows_the_right_edge() {
    let mut layout = PanelLayout::anchored_right((1280, 720), PANEL_SIZE);
    let start = layout.position;

    layout.on_window_resize((1480, 720));
    layout.on_window_resize((1480, 720));

    assert_eq!(layout.position.x - start.x, 200.0);
    assert_eq!(layout.position.y, start.y);
}

fn write_face(dir: &Path, face: &str, size: u32, color: [u8; 3]) {
    let image = image::RgbImage::from_pixel(size, size, image::Rgb(color));
    image.save(dir.join(format!("skybox-{face}.png"))).unwrap();
}

#[rstest]
#[case(&["nz"])]
#[case(&["px", "py", "pz"])]
fn missing_faces_become_empty(#[case] missing: &[&str]) {
    let dir = tempfile::tempdir().unwrap();
    for face in CUBE_FACES.iter().filter(|f| !missing.contains(*f)) {
        write_face(dir.path(), face, 4, [200, 100, 50]);
    }

    let cubemap = CubeMapData::load(dir.path(), "skybox", "png");

    assert_eq!(cubemap.size, 4);
    assert_eq!(cubemap.missing, missing.to_vec());
    for (face, texture) in CUBE_FACES.iter().zip(cubemap.faces()) {
        assert_eq!((texture.width, texture.height), (4, 4));
        let empty = texture.data.iter().all(|&b| b == 0);
        assert_eq!(empty, missing.contains(face), "face {face}");
    }
}

#[test]
fn empty_directory_still_yields_a_cube() {
    let dir = tempfile::tempdir().unwrap();
    let cubemap = CubeMapData::load(dir.path(), "skybox", "jpg");

    assert_eq!(cubemap.missing.len(), 6);
    assert_eq!(cubemap.size, 1);
    assert_eq!(cubemap.mip_level_count(), 1);
}
