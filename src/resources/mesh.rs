//! Mesh data structures and generation

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Vertex layout shared by every actor.
///
/// `color` is stored as a plain array: a SIMD `Vec4` is 16-byte aligned and
/// would leave a gap after `normal`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, color: Vec4) -> Self {
        Self {
            position,
            normal,
            color: color.to_array(),
        }
    }

    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }
}

/// A triangle mesh with per-vertex colors
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub name: String,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            name: name.to_string(),
        }
    }

    /// Build a mesh from raw positions, colors and triangles. Normals are
    /// computed from the faces.
    pub fn from_triangles(name: &str, positions: &[Vec3], colors: &[Vec4], triangles: &[[u32; 3]]) -> Self {
        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let color = colors.get(i).copied().unwrap_or(Vec4::ONE);
                Vertex::new(position, Vec3::ZERO, color)
            })
            .collect();
        let mut mesh = Self {
            vertices,
            indices: triangles.iter().flatten().copied().collect(),
            name: name.to_string(),
        };
        mesh.compute_normals();
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Get vertex data as bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Get index data as bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Axis-aligned bounds, `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.min(v.position), max.max(v.position))
        }))
    }

    /// Recompute smooth vertex normals as the area-weighted average of the
    /// adjacent face normals
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= normals.len() || b >= normals.len() || c >= normals.len() {
                continue;
            }
            let pa = self.vertices[a].position;
            let face = (self.vertices[b].position - pa).cross(self.vertices[c].position - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal.try_normalize().unwrap_or(Vec3::Z);
        }
    }

    /// Append another mesh, offsetting its indices
    pub fn merge(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Create a UV sphere with `theta` segments around the pole axis and
    /// `phi` rings from pole to pole
    pub fn sphere(center: Vec3, radius: f32, theta: u32, phi: u32, color: Vec4) -> Self {
        let mut mesh = Mesh::new("sphere");
        let theta = theta.max(3);
        let phi = phi.max(2);

        let segment_angle = 2.0 * std::f32::consts::PI / theta as f32;
        let ring_angle = std::f32::consts::PI / phi as f32;

        for ring in 0..=phi {
            let polar = ring as f32 * ring_angle;
            let y = polar.cos();
            let ring_radius = polar.sin();

            for segment in 0..=theta {
                let azimuth = segment as f32 * segment_angle;
                let normal = Vec3::new(ring_radius * azimuth.cos(), y, ring_radius * azimuth.sin());
                mesh.vertices
                    .push(Vertex::new(center + normal * radius, normal, color));
            }
        }

        for ring in 0..phi {
            for segment in 0..theta {
                let current = ring * (theta + 1) + segment;
                let next = current + theta + 1;

                mesh.indices.extend_from_slice(&[
                    current,
                    current + 1,
                    next,
                    current + 1,
                    next + 1,
                    next,
                ]);
            }
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 40);
        assert_eq!(std::mem::offset_of!(Vertex, position), 0);
        assert_eq!(std::mem::offset_of!(Vertex, normal), 12);
        assert_eq!(std::mem::offset_of!(Vertex, color), 24);
    }

    #[test]
    fn sphere_lies_on_its_radius() {
        let center = Vec3::new(1.0, -2.0, 3.0);
        let mesh = Mesh::sphere(center, 2.0, 32, 32, Vec4::ONE);

        assert_eq!(mesh.vertex_count(), 33 * 33);
        assert_eq!(mesh.triangle_count(), 32 * 32 * 2);
        for v in &mesh.vertices {
            assert!(((v.position - center).length() - 2.0).abs() < 1e-4);
            assert!((v.normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn merge_offsets_indices() {
        let mut a = Mesh::sphere(Vec3::ZERO, 1.0, 4, 3, Vec4::ONE);
        let b = Mesh::sphere(Vec3::X * 5.0, 1.0, 4, 3, Vec4::ONE);
        let base = a.vertex_count() as u32;
        a.merge(&b);

        assert_eq!(a.vertex_count(), 2 * b.vertex_count());
        assert_eq!(a.indices[b.index_count()], b.indices[0] + base);
        assert!(a.indices.iter().all(|&i| (i as usize) < a.vertex_count()));
    }

    #[test]
    fn computed_normals_follow_winding() {
        let mesh = Mesh::from_triangles(
            "quad",
            &[Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)],
            &[],
            &[[0, 1, 2], [1, 3, 2]],
        );
        for v in &mesh.vertices {
            assert!((v.normal - Vec3::Z).length() < 1e-6);
            assert_eq!(v.color(), Vec4::ONE);
        }
        assert_eq!(mesh.bounds(), Some((Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0))));
    }
}
