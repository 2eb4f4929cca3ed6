//! 2D Delaunay triangulation (Bowyer-Watson)

use std::collections::BTreeSet;

use glam::{DVec2, Vec2};

/// Twice the signed area of `abc`; positive when counter-clockwise
fn orient(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Positive when `d` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `abc`
fn in_circle(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> f64 {
    let (a, b, c) = (a - d, b - d, c - d);
    let (la, lb, lc) = (a.length_squared(), b.length_squared(), c.length_squared());
    a.x * (b.y * lc - lb * c.y) - a.y * (b.x * lc - lb * c.x) + la * (b.x * c.y - b.y * c.x)
}

/// Triangulate `points` in the plane.
///
/// Returns counter-clockwise triangles indexing into `points`. Duplicate
/// points are skipped; fewer than three distinct points yield no triangles.
pub fn triangulate(points: &[Vec2]) -> Vec<[u32; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }

    let mut verts: Vec<DVec2> = points.iter().map(|p| p.as_dvec2()).collect();
    let (min, max) = verts
        .iter()
        .fold((verts[0], verts[0]), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    let center = (min + max) * 0.5;
    let extent = (max - min).max_element().max(1.0);

    // Super triangle, far enough that its vertices stay out of every
    // circumcircle of the real points
    let n = verts.len();
    verts.push(center + DVec2::new(-100.0 * extent, -extent));
    verts.push(center + DVec2::new(100.0 * extent, -extent));
    verts.push(center + DVec2::new(0.0, 100.0 * extent));

    let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];

    for (i, &p) in verts.iter().enumerate().take(n) {
        let (bad, keep): (Vec<[usize; 3]>, Vec<[usize; 3]>) = triangles
            .into_iter()
            .partition(|&[a, b, c]| in_circle(verts[a], verts[b], verts[c], p) > 0.0);
        triangles = keep;

        if bad.is_empty() {
            log::debug!("Skipping duplicate point {i} at ({}, {})", p.x, p.y);
            continue;
        }

        // Shared edges of the cavity appear once in each direction. New
        // triangles follow the order of `bad` so the output is reproducible.
        let edges: Vec<(usize, usize)> = bad
            .iter()
            .flat_map(|&[a, b, c]| [(a, b), (b, c), (c, a)])
            .collect();
        let lookup: BTreeSet<(usize, usize)> = edges.iter().copied().collect();
        for &(a, b) in &edges {
            if lookup.contains(&(b, a)) {
                continue;
            }
            if orient(verts[a], verts[b], p) > 0.0 {
                triangles.push([a, b, i]);
            }
        }
    }

    triangles
        .into_iter()
        .filter(|t| t.iter().all(|&v| v < n))
        .map(|[a, b, c]| [a as u32, b as u32, c as u32])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn area(points: &[Vec2], tris: &[[u32; 3]]) -> f64 {
        tris.iter()
            .map(|&[a, b, c]| {
                orient(
                    points[a as usize].as_dvec2(),
                    points[b as usize].as_dvec2(),
                    points[c as usize].as_dvec2(),
                ) * 0.5
            })
            .sum()
    }

    fn assert_delaunay(points: &[Vec2], tris: &[[u32; 3]]) {
        for &[a, b, c] in tris {
            let (pa, pb, pc) = (
                points[a as usize].as_dvec2(),
                points[b as usize].as_dvec2(),
                points[c as usize].as_dvec2(),
            );
            assert!(orient(pa, pb, pc) > 0.0, "triangle is not counter-clockwise");
            for (i, p) in points.iter().enumerate() {
                if [a, b, c].contains(&(i as u32)) {
                    continue;
                }
                assert!(
                    in_circle(pa, pb, pc, p.as_dvec2()) <= 1e-9,
                    "point {i} inside circumcircle of {a} {b} {c}"
                );
            }
        }
    }

    #[test]
    fn too_few_points() {
        assert!(triangulate(&[Vec2::ZERO, Vec2::X]).is_empty());
    }

    #[test]
    fn grid_is_fully_covered() {
        let mut points = Vec::new();
        for i in -11..11 {
            for j in -11..11 {
                points.push(Vec2::new(i as f32, j as f32));
            }
        }
        let tris = triangulate(&points);

        assert_eq!(tris.len(), 2 * 21 * 21);
        assert!((area(&points, &tris) - 21.0 * 21.0).abs() < 1e-9);
        assert_delaunay(&points, &tris);
    }

    #[test]
    fn random_points_satisfy_empty_circumcircle() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let points: Vec<Vec2> = (0..200)
            .map(|_| Vec2::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)))
            .collect();
        let tris = triangulate(&points);

        assert!(!tris.is_empty());
        assert_delaunay(&points, &tris);
        let used: HashSet<u32> = tris.iter().flatten().copied().collect();
        assert_eq!(used.len(), points.len());
    }

    #[test]
    fn output_order_is_reproducible() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut points: Vec<Vec2> = (0..12)
            .flat_map(|i| (0..12).map(move |j| Vec2::new(i as f32, j as f32)))
            .collect();
        for i in (1..points.len()).rev() {
            points.swap(i, rng.gen_range(0..=i));
        }

        let first = triangulate(&points);
        for _ in 0..8 {
            assert_eq!(triangulate(&points), first);
        }
    }

    #[test]
    fn duplicates_are_ignored() {
        let points = [Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::X, Vec2::ONE];
        let tris = triangulate(&points);
        assert_eq!(tris.len(), 2);
        assert!(tris.iter().flatten().all(|&v| v != 3));
    }
}
