//! Elevation raster with its georeferenced extent.

use crate::bounds::Bounds;
use crate::error::{GeoError, GeoResult};

/// A row-major elevation raster.
///
/// Rows are always stored north-up: row 0 is the `y.max` edge of `bounds`,
/// column 0 is the `x.min` edge. No-data cells hold `NaN`.
#[derive(Debug, Clone)]
pub struct ElevationGrid {
    raster: Vec<f32>,
    width: usize,
    height: usize,
    bounds: Bounds,
}

impl ElevationGrid {
    /// Create a grid from a north-up buffer.
    pub fn new(raster: Vec<f32>, width: usize, height: usize, bounds: Bounds) -> GeoResult<Self> {
        if width < 2 || height < 2 {
            return Err(GeoError::decode(format!(
                "elevation grid must be at least 2x2, got {}x{}",
                width, height
            )));
        }
        if raster.len() != width * height {
            return Err(GeoError::decode(format!(
                "raster length {} does not match {}x{}",
                raster.len(),
                width,
                height
            )));
        }

        Ok(Self {
            raster,
            width,
            height,
            bounds,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn raster(&self) -> &[f32] {
        &self.raster
    }

    /// Flat buffer index for a column/row pair.
    pub fn flat_index(&self, col: usize, row: usize) -> usize {
        row * self.width + col
    }

    /// Raw cell value, `None` outside the grid.
    pub fn value(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.raster[self.flat_index(col, row)])
    }

    /// Minimum and maximum over valid (non-NaN) cells.
    pub fn elevation_range(&self) -> Option<(f32, f32)> {
        self.raster
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Number of no-data cells.
    pub fn nodata_count(&self) -> usize {
        self.raster.iter().filter(|v| v.is_nan()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds::from_extent("EPSG:25832", [0.0, 0.0, 2.0, 2.0]).unwrap()
    }

    #[test]
    fn test_rejects_mismatched_length() {
        let result = ElevationGrid::new(vec![0.0; 8], 3, 3, bounds());
        assert!(matches!(result, Err(GeoError::Decode(_))));
    }

    #[test]
    fn test_rejects_single_row() {
        let result = ElevationGrid::new(vec![0.0; 3], 3, 1, bounds());
        assert!(matches!(result, Err(GeoError::Decode(_))));
    }

    #[test]
    fn test_elevation_range_skips_nodata() {
        let raster = vec![f32::NAN, 4.0, -1.0, 7.5];
        let grid = ElevationGrid::new(raster, 2, 2, bounds()).unwrap();
        assert_eq!(grid.elevation_range(), Some((-1.0, 7.5)));
        assert_eq!(grid.nodata_count(), 1);
        assert_eq!(grid.value(2, 0), None);
    }
}
