//! Common types shared across the terrain scene pipeline.

pub mod bounds;
pub mod crs;
pub mod error;
pub mod grid;

pub use bounds::{AxisLabels, AxisRange, Bounds};
pub use crs::{default_axis_labels, normalize_crs_name, CrsDefinition, CrsRegistry};
pub use error::{GeoError, GeoResult};
pub use grid::ElevationGrid;

/// A planar coordinate pair `[x, y]` in some named CRS.
pub type Coord = [f64; 2];
