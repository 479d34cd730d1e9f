//! Terrain mesh generation.
//!
//! Two modes turn an [`ElevationGrid`](geo_common::ElevationGrid) into a
//! triangle mesh in local scene space:
//!
//! - [`grid`]: a regular `(width_segments + 1) x (height_segments + 1)`
//!   lattice displaced by nearest-cell elevation.
//! - [`rtin`]: a right-triangulated irregular network refined until every
//!   triangle's height error is below a tolerance.

pub mod config;
pub mod grid;
pub mod mesh;
pub mod normals;
pub mod rtin;

pub use config::{TerrainConfig, TerrainMode};
pub use grid::build_grid_mesh;
pub use mesh::{LocalExtent, TerrainMesh};
pub use rtin::{build_adaptive_mesh, Rtin, RtinMesh, RtinTile};

use elevation::SamplerConfig;
use geo_common::{ElevationGrid, GeoResult};

/// Generate a terrain mesh in the configured mode.
pub fn generate_terrain(
    grid: &ElevationGrid,
    heights: &SamplerConfig,
    config: &TerrainConfig,
    extent: LocalExtent,
) -> GeoResult<TerrainMesh> {
    match config.mode {
        TerrainMode::Grid => build_grid_mesh(grid, heights, config, extent),
        TerrainMode::Adaptive => build_adaptive_mesh(grid, heights, config, extent),
    }
}
