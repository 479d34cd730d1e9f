//! Elevation model loading and sampling.
//!
//! A DEM arrives through a [`RasterSource`] as a [`DecodedRaster`], becomes
//! an immutable [`ElevationGrid`](geo_common::ElevationGrid) once its CRS is
//! resolved, and is then queried through an [`ElevationSampler`] from any
//! registered CRS.

pub mod config;
pub mod decode;
pub mod interpolation;
pub mod loader;
pub mod sampler;

pub use config::SamplerConfig;
pub use decode::{decode_geotiff, DecodedRaster};
pub use interpolation::{resample_grid, InterpolationMethod};
pub use loader::{grid_from_decoded, load_elevation_grid, RasterSource};
pub use sampler::{ElevationSampler, SamplerView};
