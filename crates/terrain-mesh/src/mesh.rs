//! Terrain mesh container and its placement in local space.

use serde::Serialize;

use crate::normals::compute_vertex_normals;

/// Axis-aligned rectangle in local scene space that a terrain covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocalExtent {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl LocalExtent {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// `[0, width] x [0, height]`.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new([0.0, 0.0], [width, height])
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// Width over height of the covered rectangle.
    pub fn ratio(&self) -> f64 {
        self.width() / self.height()
    }

    /// Local position of a normalized raster position.
    ///
    /// `u` runs west to east and `v` north to south, both in `[0, 1]`.
    pub fn at(&self, u: f64, v: f64) -> [f64; 2] {
        [
            self.min[0] + u * self.width(),
            self.max[1] - v * self.height(),
        ]
    }
}

/// Indexed triangle mesh. Triangles wind counter-clockwise seen from +z.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TerrainMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Build a mesh and compute its vertex normals.
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let normals = compute_vertex_normals(&positions, &indices);
        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Min/max of the height channel.
    pub fn height_range(&self) -> Option<(f32, f32)> {
        self.positions.iter().fold(None, |acc, p| match acc {
            None => Some((p[2], p[2])),
            Some((lo, hi)) => Some((lo.min(p[2]), hi.max(p[2]))),
        })
    }

    /// Sum of triangle areas projected onto the xy plane.
    pub fn planar_area(&self) -> f64 {
        self.indices
            .chunks_exact(3)
            .map(|t| {
                let a = self.positions[t[0] as usize];
                let b = self.positions[t[1] as usize];
                let c = self.positions[t[2] as usize];
                signed_area(a, b, c).abs()
            })
            .sum()
    }

    /// Translate all positions.
    pub fn translate(&mut self, offset: [f32; 3]) {
        for p in &mut self.positions {
            p[0] += offset[0];
            p[1] += offset[1];
            p[2] += offset[2];
        }
    }
}

/// Signed xy area of a triangle, positive when counter-clockwise.
pub(crate) fn signed_area(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> f64 {
    let (ax, ay) = (a[0] as f64, a[1] as f64);
    let (bx, by) = (b[0] as f64, b[1] as f64);
    let (cx, cy) = (c[0] as f64, c[1] as f64);
    ((bx - ax) * (cy - ay) - (by - ay) * (cx - ax)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_at_is_north_up() {
        let extent = LocalExtent::new([10.0, 20.0], [110.0, 70.0]);
        assert_eq!(extent.at(0.0, 0.0), [10.0, 70.0]);
        assert_eq!(extent.at(1.0, 1.0), [110.0, 20.0]);
    }

    #[test]
    fn test_mesh_counts_and_area() {
        let mesh = TerrainMesh::new(
            vec![[0.0, 0.0, 1.0], [2.0, 0.0, 3.0], [0.0, 2.0, 2.0]],
            vec![0, 1, 2],
        );
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.height_range(), Some((1.0, 3.0)));
        assert_eq!(mesh.planar_area(), 2.0);
    }
}
