//! Demo geometry: a reference surface, a grid of spheres and a procedural
//! terrain

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use glam::{Vec2, Vec3, Vec4};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::ViewerResult;
use crate::geometry::{triangulate, SubdivisionScheme, TriMesh};
use crate::resources::{load_surface, Mesh};
use crate::ViewerConfig;

/// Produces the mesh of the shaded actor
pub trait MeshBuilder {
    fn build(&self) -> ViewerResult<Mesh>;
}

/// Which demo object to shade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshKind {
    Surface,
    #[default]
    Spheres,
    Terrain,
}

impl MeshKind {
    /// Builder for this kind, configured from `config`
    pub fn builder(self, config: &ViewerConfig) -> Box<dyn MeshBuilder> {
        match self {
            MeshKind::Surface => Box::new(SurfaceBuilder {
                path: config.assets.surface.clone(),
            }),
            MeshKind::Spheres => Box::new(SpheresBuilder::default()),
            MeshKind::Terrain => Box::new(TerrainBuilder {
                seed: config.terrain_seed,
                ..Default::default()
            }),
        }
    }
}

impl FromStr for MeshKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "surface" => Ok(MeshKind::Surface),
            "spheres" => Ok(MeshKind::Spheres),
            "terrain" => Ok(MeshKind::Terrain),
            other => Err(format!(
                "unknown mesh '{other}' (expected surface, spheres or terrain)"
            )),
        }
    }
}

impl fmt::Display for MeshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeshKind::Surface => "surface",
            MeshKind::Spheres => "spheres",
            MeshKind::Terrain => "terrain",
        };
        f.write_str(name)
    }
}

/// Reference surface loaded from a glTF file
#[derive(Debug, Clone)]
pub struct SurfaceBuilder {
    pub path: PathBuf,
}

impl MeshBuilder for SurfaceBuilder {
    fn build(&self) -> ViewerResult<Mesh> {
        load_surface(&self.path)
    }
}

const SPHERE_CENTERS: [[f32; 3]; 9] = [
    [-5.0, 5.0, 0.0],
    [0.0, 5.0, 0.0],
    [5.0, 5.0, 0.0],
    [-5.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [5.0, 0.0, 0.0],
    [-5.0, -5.0, 0.0],
    [0.0, -5.0, 0.0],
    [5.0, -5.0, 0.0],
];

const SPHERE_COLORS: [[f32; 3]; 9] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.5, 0.5, 0.5],
    [1.0, 1.0, 1.0],
];

/// Nine colored spheres on a 3x3 grid
#[derive(Debug, Clone)]
pub struct SpheresBuilder {
    pub radius: f32,
    /// Longitudinal segments
    pub theta: u32,
    /// Rings from pole to pole
    pub phi: u32,
}

impl Default for SpheresBuilder {
    fn default() -> Self {
        Self {
            radius: 2.0,
            theta: 32,
            phi: 32,
        }
    }
}

impl MeshBuilder for SpheresBuilder {
    fn build(&self) -> ViewerResult<Mesh> {
        let mut mesh = Mesh::new("spheres");
        for (center, color) in SPHERE_CENTERS.iter().zip(SPHERE_COLORS) {
            mesh.merge(&Mesh::sphere(
                Vec3::from(*center),
                self.radius,
                self.theta,
                self.phi,
                Vec3::from(color).extend(1.0),
            ));
        }
        Ok(mesh)
    }
}

/// Height field sampled on an integer grid, triangulated in the plane and
/// optionally smoothed
#[derive(Debug, Clone)]
pub struct TerrainBuilder {
    /// Samples span `[-size, size)` along both axes
    pub size: i32,
    pub smoothing: Option<SubdivisionScheme>,
    pub subdivisions: u32,
    pub seed: u64,
}

impl Default for TerrainBuilder {
    fn default() -> Self {
        Self {
            size: 11,
            smoothing: Some(SubdivisionScheme::Loop),
            subdivisions: 3,
            seed: 0,
        }
    }
}

/// Terrain height at grid coordinate `(i, j)`
pub fn terrain_height(i: f32, j: f32) -> f32 {
    let fact1 = -i.sin() * j.cos();
    let fact2 = -(1.0 - (i * i + j * j).sqrt() / std::f32::consts::PI).abs().exp();
    -(fact1 * fact2).abs()
}

impl TerrainBuilder {
    /// Sampled, shuffled and triangulated height field before smoothing
    pub fn sample(&self) -> TriMesh {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);

        let mut positions = Vec::new();
        for i in -self.size..self.size {
            for j in -self.size..self.size {
                let (x, y) = (i as f32, j as f32);
                positions.push(Vec3::new(x, y, terrain_height(x, y)));
            }
        }
        positions.shuffle(&mut rng);
        let colors = positions
            .iter()
            .map(|_| Vec4::new(rng.gen(), rng.gen(), rng.gen(), 1.0))
            .collect();

        let planar: Vec<Vec2> = positions.iter().map(|p| p.truncate()).collect();
        let triangles = triangulate(&planar);

        TriMesh {
            positions,
            colors,
            triangles,
        }
    }
}

impl MeshBuilder for TerrainBuilder {
    fn build(&self) -> ViewerResult<Mesh> {
        let mut terrain = self.sample();
        if let Some(scheme) = self.smoothing {
            terrain = terrain.subdivide(scheme, self.subdivisions);
        }
        Ok(Mesh::from_triangles(
            "terrain",
            &terrain.positions,
            &terrain.colors,
            &terrain.triangles,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn nine_spheres() {
        let builder = SpheresBuilder::default();
        let mesh = builder.build().unwrap();
        let single = Mesh::sphere(Vec3::ZERO, 2.0, 32, 32, Vec4::ONE);

        assert_eq!(mesh.vertex_count(), 9 * single.vertex_count());
        let black = mesh.vertices[6 * single.vertex_count()];
        assert_eq!(black.color(), Vec4::new(0.0, 0.0, 0.0, 1.0));
        let (min, max) = mesh.bounds().unwrap();
        assert!(min.abs_diff_eq(Vec3::new(-7.0, -7.0, -2.0), 1e-4));
        assert!(max.abs_diff_eq(Vec3::new(7.0, 7.0, 2.0), 1e-4));
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(3.0, -7.0)]
    #[case(-11.0, 10.0)]
    fn terrain_never_rises_above_zero(#[case] i: f32, #[case] j: f32) {
        assert!(terrain_height(i, j) <= 0.0);
    }

    #[test]
    fn terrain_sample_covers_the_grid() {
        let builder = TerrainBuilder {
            seed: 3,
            ..Default::default()
        };
        let terrain = builder.sample();

        assert_eq!(terrain.positions.len(), 22 * 22);
        assert_eq!(terrain.triangles.len(), 2 * 21 * 21);
        assert!(terrain
            .colors
            .iter()
            .all(|c| (0.0..1.0).contains(&c.x) && c.w == 1.0));
    }

    #[test]
    fn terrain_is_reproducible_per_seed() {
        let a = TerrainBuilder { seed: 9, ..Default::default() }.sample();
        let b = TerrainBuilder { seed: 9, ..Default::default() }.sample();
        let c = TerrainBuilder { seed: 10, ..Default::default() }.sample();
        assert_eq!(a, b);
        assert_ne!(a.positions, c.positions);
    }

    #[rstest]
    #[case(None, 0, 2 * 21 * 21)]
    #[case(Some(SubdivisionScheme::Loop), 1, 4 * 2 * 21 * 21)]
    #[case(Some(SubdivisionScheme::Butterfly), 2, 16 * 2 * 21 * 21)]
    fn smoothing_refines_the_terrain(
        #[case] smoothing: Option<SubdivisionScheme>,
        #[case] subdivisions: u32,
        #[case] triangles: usize,
    ) {
        let builder = TerrainBuilder {
            smoothing,
            subdivisions,
            ..Default::default()
        };
        assert_eq!(builder.build().unwrap().triangle_count(), triangles);
    }

    #[test]
    fn mesh_kind_parses_case_insensitively() {
        assert_eq!("Terrain".parse::<MeshKind>(), Ok(MeshKind::Terrain));
        assert!("cube".parse::<MeshKind>().is_err());
        assert_eq!(MeshKind::Surface.to_string(), "surface");
    }
}
