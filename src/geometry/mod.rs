//! Procedural geometry helpers used by the scene builders

mod delaunay;
mod subdivision;

pub use delaunay::triangulate;
pub use subdivision::{SubdivisionScheme, TriMesh};
