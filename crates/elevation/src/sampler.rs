//! Elevation lookup at arbitrary coordinates.
//!
//! A query coordinate is first reprojected into the grid's CRS, then mapped
//! to fractional raster indices:
//!
//! ```text
//! col = (x - x.min) / x_range * (width - 1)
//! row = (y.max - y) / y_range * (height - 1)
//! ```
//!
//! The row axis is inverted because raster row 0 is the north edge. Indices
//! outside the grid clamp to the nearest edge cell; there is no
//! extrapolation and no error for out-of-range queries.

use std::sync::Arc;

use geo_common::{Coord, CrsRegistry, ElevationGrid, GeoError, GeoResult};
use projection::CrsConverter;

use crate::config::SamplerConfig;
use crate::interpolation::interpolate;

/// Samples one elevation grid.
#[derive(Debug, Clone)]
pub struct ElevationSampler {
    grid: Arc<ElevationGrid>,
    registry: Arc<CrsRegistry>,
    config: SamplerConfig,
}

impl ElevationSampler {
    pub fn new(
        grid: Arc<ElevationGrid>,
        registry: Arc<CrsRegistry>,
        config: SamplerConfig,
    ) -> GeoResult<Self> {
        config.validate().map_err(GeoError::Config)?;
        Ok(Self {
            grid,
            registry,
            config,
        })
    }

    pub fn grid(&self) -> &Arc<ElevationGrid> {
        &self.grid
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// CRS the grid is georeferenced in.
    pub fn crs_name(&self) -> &str {
        self.grid.bounds().crs_name()
    }

    /// Scaled elevation of the floor value, used where no data exists.
    pub fn floor_elevation(&self) -> f64 {
        self.config.scale(self.config.floor)
    }

    /// Scaled min/max over valid cells.
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        self.grid
            .elevation_range()
            .map(|(lo, hi)| (self.config.scale(lo as f64), self.config.scale(hi as f64)))
    }

    /// Bind the sampler to a query CRS, building the converter once.
    pub fn view(&self, query_crs: &str) -> GeoResult<SamplerView<'_>> {
        let converter = CrsConverter::new(&self.registry, query_crs, self.crs_name())?;
        Ok(SamplerView {
            sampler: self,
            converter,
        })
    }

    /// Sample at `coord` given in `query_crs`.
    ///
    /// `Ok(None)` means the grid holds no data there.
    pub fn sample_at(&self, coord: Coord, query_crs: &str) -> GeoResult<Option<f64>> {
        self.view(query_crs)?.sample(coord)
    }

    /// Sample at a coordinate already in the grid's CRS.
    pub fn sample_native(&self, coord: Coord) -> Option<f64> {
        let (col, row) = self.raster_position(coord);
        let raw = interpolate(
            self.grid.raster(),
            self.grid.width(),
            self.grid.height(),
            col,
            row,
            self.config.interpolation,
        );

        if raw.is_nan() {
            None
        } else {
            Some(self.config.scale(raw as f64))
        }
    }

    /// Fractional `(col, row)` of a grid-CRS coordinate, before clamping.
    pub fn raster_position(&self, coord: Coord) -> (f64, f64) {
        let bounds = self.grid.bounds();
        let col = (coord[0] - bounds.x().min) / bounds.x_range() * (self.grid.width() - 1) as f64;
        let row = (bounds.y().max - coord[1]) / bounds.y_range() * (self.grid.height() - 1) as f64;
        (col, row)
    }
}

/// A sampler bound to one query CRS.
#[derive(Debug)]
pub struct SamplerView<'a> {
    sampler: &'a ElevationSampler,
    converter: CrsConverter,
}

impl SamplerView<'_> {
    pub fn sample(&self, coord: Coord) -> GeoResult<Option<f64>> {
        let native = self.converter.forward(coord)?;
        Ok(self.sampler.sample_native(native))
    }

    /// Sample, substituting the floor elevation for no-data.
    pub fn sample_or_floor(&self, coord: Coord) -> GeoResult<f64> {
        Ok(self
            .sample(coord)?
            .unwrap_or_else(|| self.sampler.floor_elevation()))
    }
}
