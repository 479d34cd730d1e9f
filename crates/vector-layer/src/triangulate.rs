//! Polygon triangulation by ear clipping.

use geo_common::{Coord, GeoError, GeoResult};

/// Flattened polygon ready for ear clipping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatPolygon {
    /// Vertices of all kept rings, exterior first.
    pub vertices: Vec<Coord>,
    /// Vertex index where each hole ring starts.
    pub hole_indices: Vec<usize>,
}

/// Drop the repeated first vertex that closes a GeoJSON ring.
pub fn drop_closing_duplicate(ring: &[Coord]) -> &[Coord] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Flatten rings, skipping any with fewer than 3 distinct vertices.
///
/// Returns `None` when the exterior ring is degenerate.
pub fn flatten_rings(rings: &[Vec<Coord>]) -> Option<FlatPolygon> {
    let mut flat = FlatPolygon::default();
    for (ring_i, ring) in rings.iter().enumerate() {
        let ring = drop_closing_duplicate(ring);
        if ring.len() < 3 {
            if ring_i == 0 {
                return None;
            }
            continue;
        }
        if ring_i > 0 {
            flat.hole_indices.push(flat.vertices.len());
        }
        flat.vertices.extend_from_slice(ring);
    }
    Some(flat)
}

/// Triangulate 2D vertices with optional holes.
///
/// Triangles index into `vertices` and wind counter-clockwise.
pub fn triangulate(vertices: &[Coord], hole_indices: &[usize]) -> GeoResult<Vec<[u32; 3]>> {
    let coords_2d: Vec<f64> = vertices.iter().flat_map(|c| [c[0], c[1]]).collect();
    let indices = earcutr::earcut(&coords_2d, hole_indices, 2)
        .map_err(|_| GeoError::UnsupportedGeometry("polygon could not be triangulated".to_string()))?;

    Ok(indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (t[0], t[1], t[2]);
            if cross(vertices[a], vertices[b], vertices[c]) < 0.0 {
                [a as u32, c as u32, b as u32]
            } else {
                [a as u32, b as u32, c as u32]
            }
        })
        .collect())
}

/// Total area covered by `triangles`.
pub fn triangles_area(vertices: &[Coord], triangles: &[[u32; 3]]) -> f64 {
    triangles
        .iter()
        .map(|&[a, b, c]| {
            cross(vertices[a as usize], vertices[b as usize], vertices[c as usize]).abs() / 2.0
        })
        .sum()
}

fn cross(a: Coord, b: Coord, c: Coord) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}
