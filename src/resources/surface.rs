//! Reference surface import from glTF 2.0

use std::path::Path;

use glam::{Mat3, Mat4, Vec3, Vec4};

use super::{Mesh, Vertex};
use crate::error::{ViewerError, ViewerResult};

/// Load every triangle primitive of the default scene into a single mesh.
///
/// Node transforms are baked into the vertices. Vertex colors come from
/// `COLOR_0` when present, otherwise white. Missing normals are computed.
pub fn load_surface(path: &Path) -> ViewerResult<Mesh> {
    let (document, buffers, _images) =
        gltf::import(path).map_err(|e| ViewerError::asset(path, e))?;

    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("surface");
    let mut mesh = Mesh::new(name);

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| ViewerError::asset(path, "no scene"))?;

    for node in scene.nodes() {
        load_node(&node, Mat4::IDENTITY, &buffers, &mut mesh);
    }

    if mesh.is_empty() {
        return Err(ViewerError::asset(path, "no triangle primitives"));
    }
    log::info!(
        "Loaded surface {} ({} vertices, {} triangles)",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

fn load_node(node: &gltf::Node<'_>, parent: Mat4, buffers: &[gltf::buffer::Data], mesh: &mut Mesh) {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(source) = node.mesh() {
        for primitive in source.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!("Skipping non-triangle primitive in mesh {}", source.index());
                continue;
            }
            if let Some(part) = read_primitive(&primitive, transform, buffers) {
                mesh.merge(&part);
            }
        }
    }

    for child in node.children() {
        load_node(&child, transform, buffers, mesh);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    transform: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Option<Mesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

    let positions: Vec<Vec3> = reader
        .read_positions()?
        .map(|p| transform.transform_point3(Vec3::from(p)))
        .collect();
    let colors: Vec<Vec4> = reader
        .read_colors(0)
        .map(|c| c.into_rgba_f32().map(Vec4::from).collect())
        .unwrap_or_default();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let triangles: Vec<[u32; 3]> = indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect();

    let mut part = Mesh::from_triangles("primitive", &positions, &colors, &triangles);

    if let Some(normals) = reader.read_normals() {
        let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
        for (vertex, n) in part.vertices.iter_mut().zip(normals) {
            let normal = (normal_matrix * Vec3::from(n)).try_normalize();
            if let Some(normal) = normal {
                *vertex = Vertex::new(vertex.position, normal, vertex.color());
            }
        }
    }
    Some(part)
}
