//! Interpolating (Butterfly) and approximating (Loop) subdivision of
//! colored triangle meshes

use std::collections::{BTreeSet, HashMap};

use glam::{Vec3, Vec4};

/// Smoothing scheme applied to the terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubdivisionScheme {
    /// Modified butterfly; keeps the original vertices in place
    Butterfly,
    /// Loop; moves every vertex toward the limit surface
    #[default]
    Loop,
}

/// Indexed triangle mesh with one color per vertex
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec4>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Apply `iterations` rounds of `scheme`. Each round splits every
    /// triangle into four.
    pub fn subdivide(&self, scheme: SubdivisionScheme, iterations: u32) -> TriMesh {
        let mut mesh = self.clone();
        for _ in 0..iterations {
            mesh = subdivide_once(&mesh, scheme);
        }
        log::debug!(
            "{scheme:?} subdivision x{iterations}: {} -> {} triangles",
            self.triangles.len(),
            mesh.triangles.len()
        );
        mesh
    }

    fn blend(&self, stencil: &[(u32, f32)]) -> (Vec3, Vec4) {
        stencil.iter().fold((Vec3::ZERO, Vec4::ZERO), |(p, c), &(v, w)| {
            let color = self.colors.get(v as usize).copied().unwrap_or(Vec4::ONE);
            (p + self.positions[v as usize] * w, c + color * w)
        })
    }
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}

struct Topology {
    /// Vertices opposite each undirected edge, one per adjacent triangle
    opposite: HashMap<(u32, u32), Vec<u32>>,
    neighbors: Vec<BTreeSet<u32>>,
}

impl Topology {
    fn new(mesh: &TriMesh) -> Self {
        let mut opposite: HashMap<(u32, u32), Vec<u32>> = HashMap::new();
        let mut neighbors = vec![BTreeSet::new(); mesh.positions.len()];
        for &[a, b, c] in &mesh.triangles {
            for (u, v, w) in [(a, b, c), (b, c, a), (c, a, b)] {
                opposite.entry(edge_key(u, v)).or_default().push(w);
                neighbors[u as usize].insert(v);
                neighbors[v as usize].insert(u);
            }
        }
        Self {
            opposite,
            neighbors,
        }
    }

    fn is_boundary(&self, a: u32, b: u32) -> bool {
        self.opposite
            .get(&edge_key(a, b))
            .map_or(true, |o| o.len() != 2)
    }

    /// Vertex across edge `(a, b)` from `not`
    fn wing(&self, a: u32, b: u32, not: u32) -> Option<u32> {
        let opposite = self.opposite.get(&edge_key(a, b))?;
        if opposite.len() != 2 {
            return None;
        }
        opposite.iter().copied().find(|&v| v != not)
    }
}

fn loop_beta(valence: usize) -> f32 {
    if valence == 3 {
        3.0 / 16.0
    } else {
        3.0 / (8.0 * valence as f32)
    }
}

fn even_stencil(topology: &Topology, v: u32, scheme: SubdivisionScheme) -> Vec<(u32, f32)> {
    if scheme == SubdivisionScheme::Butterfly {
        return vec![(v, 1.0)];
    }
    let ring = &topology.neighbors[v as usize];
    let boundary: Vec<u32> = ring
        .iter()
        .copied()
        .filter(|&n| topology.is_boundary(v, n))
        .collect();

    match boundary.as_slice() {
        [] if !ring.is_empty() => {
            let beta = loop_beta(ring.len());
            let mut stencil = vec![(v, 1.0 - ring.len() as f32 * beta)];
            stencil.extend(ring.iter().map(|&n| (n, beta)));
            stencil
        }
        [b0, b1] => vec![(v, 0.75), (*b0, 0.125), (*b1, 0.125)],
        _ => vec![(v, 1.0)],
    }
}

fn odd_stencil(topology: &Topology, a: u32, b: u32, scheme: SubdivisionScheme) -> Vec<(u32, f32)> {
    let opposite = topology
        .opposite
        .get(&edge_key(a, b))
        .map(Vec::as_slice)
        .unwrap_or_default();
    let &[c, d] = opposite else {
        return vec![(a, 0.5), (b, 0.5)];
    };
    let loop_rule = vec![(a, 0.375), (b, 0.375), (c, 0.125), (d, 0.125)];
    if scheme == SubdivisionScheme::Loop {
        return loop_rule;
    }

    let wings = [
        topology.wing(a, c, b),
        topology.wing(b, c, a),
        topology.wing(a, d, b),
        topology.wing(b, d, a),
    ];
    match wings {
        [Some(e1), Some(e2), Some(e3), Some(e4)] => vec![
            (a, 0.5),
            (b, 0.5),
            (c, 0.125),
            (d, 0.125),
            (e1, -0.0625),
            (e2, -0.0625),
            (e3, -0.0625),
            (e4, -0.0625),
        ],
        _ => loop_rule,
    }
}

fn subdivide_once(mesh: &TriMesh, scheme: SubdivisionScheme) -> TriMesh {
    let topology = Topology::new(mesh);
    let mut out = TriMesh::default();

    for v in 0..mesh.positions.len() as u32 {
        let (p, c) = mesh.blend(&even_stencil(&topology, v, scheme));
        out.positions.push(p);
        out.colors.push(c);
    }

    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut midpoint = |a: u32, b: u32, out: &mut TriMesh| -> u32 {
        *midpoints.entry(edge_key(a, b)).or_insert_with(|| {
            let (p, c) = mesh.blend(&odd_stencil(&topology, a, b, scheme));
            out.positions.push(p);
            out.colors.push(c);
            out.positions.len() as u32 - 1
        })
    };

    for &[a, b, c] in &mesh.triangles {
        let ab = midpoint(a, b, &mut out);
        let bc = midpoint(b, c, &mut out);
        let ca = midpoint(c, a, &mut out);
        out.triangles
            .extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Unit square split along its diagonal
    fn square() -> TriMesh {
        TriMesh {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
            colors: vec![Vec4::new(1.0, 0.0, 0.0, 1.0); 4],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
        }
    }

    /// Closed tetrahedron, every vertex interior with valence 3
    fn tetrahedron() -> TriMesh {
        TriMesh {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            colors: vec![Vec4::ONE, Vec4::ZERO, Vec4::ONE, Vec4::ZERO],
            triangles: vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        }
    }

    #[rstest]
    #[case(SubdivisionScheme::Loop, 1)]
    #[case(SubdivisionScheme::Loop, 3)]
    #[case(SubdivisionScheme::Butterfly, 2)]
    fn triangle_count_quadruples(#[case] scheme: SubdivisionScheme, #[case] iterations: u32) {
        let mesh = square().subdivide(scheme, iterations);
        assert_eq!(mesh.triangles.len(), 2 * 4usize.pow(iterations));
        assert_eq!(mesh.positions.len(), mesh.colors.len());
    }

    #[test]
    fn one_round_adds_a_vertex_per_edge() {
        let mesh = square().subdivide(SubdivisionScheme::Loop, 1);
        // 4 corners + 5 edges
        assert_eq!(mesh.positions.len(), 9);
    }

    #[test]
    fn butterfly_interpolates_original_vertices() {
        let source = tetrahedron();
        let mesh = source.subdivide(SubdivisionScheme::Butterfly, 1);
        assert_eq!(&mesh.positions[..4], source.positions.as_slice());
    }

    #[test]
    fn loop_moves_interior_vertices() {
        let source = tetrahedron();
        let mesh = source.subdivide(SubdivisionScheme::Loop, 1);
        // valence 3: (1 - 3 * 3/16) * v + 3/16 * sum(neighbors)
        let expected = (Vec3::X + Vec3::Y + Vec3::Z) * (3.0 / 16.0);
        assert!((mesh.positions[0] - expected).length() < 1e-6);
    }

    #[test]
    fn boundary_edges_use_the_midpoint() {
        let mesh = square().subdivide(SubdivisionScheme::Butterfly, 1);
        assert!(mesh.positions.contains(&Vec3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn colors_follow_the_stencil() {
        let uniform = square().subdivide(SubdivisionScheme::Loop, 2);
        for color in &uniform.colors {
            assert!((*color - Vec4::new(1.0, 0.0, 0.0, 1.0)).length() < 1e-5);
        }

        let mixed = tetrahedron().subdivide(SubdivisionScheme::Loop, 1);
        // edge (0, 2) joins two white vertices; both opposite vertices are black
        let edge = mixed.triangles[0][1] as usize;
        assert!((mixed.colors[edge] - Vec4::splat(0.75)).length() < 1e-6);
    }
}
