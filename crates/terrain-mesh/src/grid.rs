//! Regular lattice terrain.

use elevation::SamplerConfig;
use geo_common::{ElevationGrid, GeoError, GeoResult};
use tracing::debug;

use crate::config::TerrainConfig;
use crate::mesh::{LocalExtent, TerrainMesh};

/// Build a `(ws + 1) x (hs + 1)` lattice over `extent`, displacing each
/// vertex by the nearest raster cell.
///
/// Lattice row 0 is the north edge, like raster row 0. A lattice point maps
/// to raster indices by `floor(g * (dim - 1) / segments)`. No-data cells
/// take the sampler floor. Derived height segments follow the aspect ratio
/// of `extent`, so cells stay square in local space whatever the DEM CRS.
pub fn build_grid_mesh(
    grid: &ElevationGrid,
    heights: &SamplerConfig,
    config: &TerrainConfig,
    extent: LocalExtent,
) -> GeoResult<TerrainMesh> {
    config.validate().map_err(GeoError::Config)?;

    let ws = config.width_segments;
    let hs = config.height_segments_for(extent.ratio());
    let (w, h) = (grid.width(), grid.height());
    let floor = heights.scale(heights.floor);

    let mut positions = Vec::with_capacity((ws + 1) * (hs + 1));
    for gy in 0..=hs {
        let raster_y = gy * (h - 1) / hs;
        for gx in 0..=ws {
            let raster_x = gx * (w - 1) / ws;
            let z = match grid.value(raster_x, raster_y) {
                Some(v) if !v.is_nan() => heights.scale(v as f64),
                _ => floor,
            };
            let [x, y] = extent.at(gx as f64 / ws as f64, gy as f64 / hs as f64);
            positions.push([x as f32, y as f32, z as f32]);
        }
    }

    let stride = (ws + 1) as u32;
    let mut indices = Vec::with_capacity(ws * hs * 6);
    for gy in 0..hs as u32 {
        for gx in 0..ws as u32 {
            let a = gy * stride + gx;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    debug!(
        width_segments = ws,
        height_segments = hs,
        vertices = positions.len(),
        "Built lattice terrain"
    );

    Ok(TerrainMesh::new(positions, indices))
}
