//! Right-triangulated irregular network (RTIN) terrain simplification.
//!
//! The square height field of side `2^k + 1` is covered by a binary tree of
//! right isoceles triangles. Every triangle's split point (the midpoint of
//! its hypotenuse) stores the maximum height error found in its subtree; a
//! mesh for a given tolerance descends the tree only where that error
//! exceeds the tolerance.
//!
//! Triangle `i` in the flat tree layout has id `i + 2`; ids 2 and 3 are the
//! two roots splitting the square along its diagonal, and the children of
//! id `n` are `2n` and `2n + 1`.

use elevation::{resample_grid, InterpolationMethod, SamplerConfig};
use geo_common::{ElevationGrid, GeoError, GeoResult};
use tracing::debug;

use crate::config::TerrainConfig;
use crate::mesh::{signed_area, LocalExtent, TerrainMesh};

/// Precomputed triangle tree for one grid size.
#[derive(Debug, Clone)]
pub struct Rtin {
    grid_size: usize,
    num_triangles: usize,
    num_parent_triangles: usize,
    /// `[ax, ay, bx, by]` hypotenuse endpoints per triangle.
    coords: Vec<[u16; 4]>,
}

impl Rtin {
    /// Build the triangle tree for a `grid_size x grid_size` height field.
    pub fn new(grid_size: usize) -> GeoResult<Self> {
        let tile_size = grid_size.wrapping_sub(1);
        if grid_size < 3 || !tile_size.is_power_of_two() || grid_size > u16::MAX as usize {
            return Err(GeoError::Config(format!(
                "RTIN grid size must be 2^k + 1, got {}",
                grid_size
            )));
        }

        let num_triangles = tile_size * tile_size * 2 - 2;
        let num_parent_triangles = num_triangles - tile_size * tile_size;
        let ts = tile_size as u32;

        let mut coords = Vec::with_capacity(num_triangles);
        for i in 0..num_triangles {
            let mut id = i + 2;
            let (mut ax, mut ay, mut bx, mut by, mut cx, mut cy) = (0u32, 0u32, 0u32, 0u32, 0u32, 0u32);
            if id & 1 == 1 {
                bx = ts;
                by = ts;
                cx = ts;
            } else {
                ax = ts;
                ay = ts;
                cy = ts;
            }

            loop {
                id >>= 1;
                if id <= 1 {
                    break;
                }
                let mx = (ax + bx) >> 1;
                let my = (ay + by) >> 1;
                if id & 1 == 1 {
                    bx = ax;
                    by = ay;
                    ax = cx;
                    ay = cy;
                } else {
                    ax = bx;
                    ay = by;
                    bx = cx;
                    by = cy;
                }
                cx = mx;
                cy = my;
            }

            coords.push([ax as u16, ay as u16, bx as u16, by as u16]);
        }

        Ok(Self {
            grid_size,
            num_triangles,
            num_parent_triangles,
            coords,
        })
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Compute the error tree for a row-major height field.
    ///
    /// `terrain` must hold `grid_size^2` finite values.
    pub fn create_tile(&self, terrain: Vec<f32>) -> GeoResult<RtinTile<'_>> {
        let size = self.grid_size;
        if terrain.len() != size * size {
            return Err(GeoError::decode(format!(
                "RTIN terrain has {} values, expected {}",
                terrain.len(),
                size * size
            )));
        }

        let mut errors = vec![0.0f32; size * size];
        for i in (0..self.num_triangles).rev() {
            let [ax, ay, bx, by] = self.coords[i].map(|v| v as i64);
            let mx = (ax + bx) >> 1;
            let my = (ay + by) >> 1;
            let cx = mx + my - ay;
            let cy = my + ax - mx;

            let at = |x: i64, y: i64| (y as usize) * size + x as usize;

            let interpolated = (terrain[at(ax, ay)] + terrain[at(bx, by)]) / 2.0;
            let middle = at(mx, my);
            let middle_error = (interpolated - terrain[middle]).abs();
            errors[middle] = errors[middle].max(middle_error);

            if i < self.num_parent_triangles {
                let left = at((ax + cx) >> 1, (ay + cy) >> 1);
                let right = at((bx + cx) >> 1, (by + cy) >> 1);
                errors[middle] = errors[middle].max(errors[left]).max(errors[right]);
            }
        }

        Ok(RtinTile {
            rtin: self,
            terrain,
            errors,
        })
    }
}

/// A height field with its precomputed error tree.
#[derive(Debug, Clone)]
pub struct RtinTile<'a> {
    rtin: &'a Rtin,
    terrain: Vec<f32>,
    errors: Vec<f32>,
}

/// Simplified mesh in raster coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RtinMesh {
    /// `[x, y]` raster cell per vertex, y = 0 at the north edge.
    pub vertices: Vec<[u16; 2]>,
    /// Vertex index triples.
    pub triangles: Vec<[u32; 3]>,
}

struct MeshBuilder<'t> {
    size: usize,
    errors: &'t [f32],
    max_error: f32,
    indices: Vec<u32>,
    mesh: RtinMesh,
}

impl MeshBuilder<'_> {
    fn vertex(&mut self, x: i64, y: i64) -> u32 {
        let slot = y as usize * self.size + x as usize;
        if self.indices[slot] == 0 {
            self.mesh.vertices.push([x as u16, y as u16]);
            self.indices[slot] = self.mesh.vertices.len() as u32;
        }
        self.indices[slot] - 1
    }

    fn process(&mut self, ax: i64, ay: i64, bx: i64, by: i64, cx: i64, cy: i64) {
        let mx = (ax + bx) >> 1;
        let my = (ay + by) >> 1;

        let splittable = (ax - cx).abs() + (ay - cy).abs() > 1;
        if splittable && self.errors[my as usize * self.size + mx as usize] > self.max_error {
            self.process(cx, cy, ax, ay, mx, my);
            self.process(bx, by, cx, cy, mx, my);
        } else {
            let a = self.vertex(ax, ay);
            let b = self.vertex(bx, by);
            let c = self.vertex(cx, cy);
            self.mesh.triangles.push([a, b, c]);
        }
    }
}

impl RtinTile<'_> {
    /// Maximum error over the whole tile.
    pub fn max_error(&self) -> f32 {
        let size = self.rtin.grid_size;
        let max = size - 1;
        let center = (max / 2) * size + max / 2;
        self.errors[center]
    }

    pub fn terrain(&self) -> &[f32] {
        &self.terrain
    }

    /// Extract the coarsest mesh whose triangles all stay within `max_error`.
    pub fn mesh(&self, max_error: f32) -> RtinMesh {
        let size = self.rtin.grid_size;
        let max = (size - 1) as i64;

        let mut builder = MeshBuilder {
            size,
            errors: &self.errors,
            max_error,
            indices: vec![0; size * size],
            mesh: RtinMesh::default(),
        };
        builder.process(0, 0, max, max, max, 0);
        builder.process(max, max, 0, 0, 0, max);
        builder.mesh
    }

    /// Place a raster-space mesh into local space with heights attached.
    pub fn to_terrain_mesh(&self, mesh: &RtinMesh, extent: LocalExtent) -> TerrainMesh {
        let size = self.rtin.grid_size;
        let max = (size - 1) as f64;

        let positions: Vec<[f32; 3]> = mesh
            .vertices
            .iter()
            .map(|&[x, y]| {
                let [lx, ly] = extent.at(x as f64 / max, y as f64 / max);
                let z = self.terrain[y as usize * size + x as usize];
                [lx as f32, ly as f32, z]
            })
            .collect();

        let mut indices = Vec::with_capacity(mesh.triangles.len() * 3);
        for &[a, b, c] in &mesh.triangles {
            let area = signed_area(
                positions[a as usize],
                positions[b as usize],
                positions[c as usize],
            );
            if area < 0.0 {
                indices.extend_from_slice(&[a, c, b]);
            } else {
                indices.extend_from_slice(&[a, b, c]);
            }
        }

        TerrainMesh::new(positions, indices)
    }
}

/// Build an adaptive terrain mesh.
///
/// Heights are scaled first, no-data cells take the floor, and rasters that
/// are not square `2^k + 1` are bilinearly resampled to `grid_size`.
pub fn build_adaptive_mesh(
    grid: &ElevationGrid,
    heights: &SamplerConfig,
    config: &TerrainConfig,
    extent: LocalExtent,
) -> GeoResult<TerrainMesh> {
    config.validate().map_err(GeoError::Config)?;

    let floor = heights.scale(heights.floor) as f32;
    let scaled: Vec<f32> = grid
        .raster()
        .iter()
        .map(|&v| {
            if v.is_nan() {
                floor
            } else {
                heights.scale(v as f64) as f32
            }
        })
        .collect();

    let (w, h) = (grid.width(), grid.height());
    let rtin_ready = w == h && (w - 1).is_power_of_two();
    let (terrain, size) = if rtin_ready {
        (scaled, w)
    } else {
        debug!(
            from_width = w,
            from_height = h,
            grid_size = config.grid_size,
            "Resampling raster for RTIN"
        );
        let size = config.grid_size;
        (
            resample_grid(&scaled, w, h, size, size, InterpolationMethod::Bilinear),
            size,
        )
    };

    let rtin = Rtin::new(size)?;
    let tile = rtin.create_tile(terrain)?;
    let mesh = tile.mesh(config.max_error);

    debug!(
        grid_size = size,
        max_error = config.max_error,
        vertices = mesh.vertices.len(),
        triangles = mesh.triangles.len(),
        "Built adaptive terrain"
    );

    Ok(tile.to_terrain_mesh(&mesh, extent))
}
