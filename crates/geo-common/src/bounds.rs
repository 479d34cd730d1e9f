//! Bounding rectangle tagged with a coordinate reference system.

use serde::Serialize;

use crate::crs::default_axis_labels;
use crate::error::{GeoError, GeoResult};
use crate::Coord;

/// Closed interval along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Length of the interval.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Human-readable axis names for a CRS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
}

impl AxisLabels {
    /// Labels for a projected (metric) CRS.
    pub fn projected() -> Self {
        Self {
            x: "easting".to_string(),
            y: "northing".to_string(),
        }
    }

    /// Labels for a geographic (degree) CRS.
    pub fn geographic() -> Self {
        Self {
            x: "longitude".to_string(),
            y: "latitude".to_string(),
        }
    }
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self::projected()
    }
}

/// An immutable axis-aligned rectangle in a named CRS.
///
/// `x_range`, `y_range` and `ratio` are computed once at construction.
/// Fields are private so a constructed value can never violate
/// `max > min` on either axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bounds {
    crs_name: String,
    axis_labels: AxisLabels,
    x: AxisRange,
    y: AxisRange,
    x_range: f64,
    y_range: f64,
    ratio: f64,
}

impl Bounds {
    /// Create bounds from per-axis ranges.
    ///
    /// Axis labels follow the built-in definition of `crs_name`. Fails with
    /// `InvalidBounds` for empty, inverted or non-finite extents.
    pub fn new(crs_name: impl Into<String>, x: AxisRange, y: AxisRange) -> GeoResult<Self> {
        let crs_name = crs_name.into();
        let labels = default_axis_labels(&crs_name);
        Self::with_labels(crs_name, labels, x, y)
    }

    /// Create bounds with explicit axis labels.
    pub fn with_labels(
        crs_name: impl Into<String>,
        axis_labels: AxisLabels,
        x: AxisRange,
        y: AxisRange,
    ) -> GeoResult<Self> {
        let crs_name = crs_name.into();

        let finite = [x.min, x.max, y.min, y.max].iter().all(|v| v.is_finite());
        if !finite {
            return Err(GeoError::invalid_bounds(
                crs_name,
                format!("non-finite extent x={:?} y={:?}", x, y),
            ));
        }
        if x.max <= x.min {
            return Err(GeoError::invalid_bounds(
                crs_name,
                format!("x.max ({}) must be greater than x.min ({})", x.max, x.min),
            ));
        }
        if y.max <= y.min {
            return Err(GeoError::invalid_bounds(
                crs_name,
                format!("y.max ({}) must be greater than y.min ({})", y.max, y.min),
            ));
        }

        let x_range = x.span();
        let y_range = y.span();

        Ok(Self {
            crs_name,
            axis_labels,
            x,
            y,
            x_range,
            y_range,
            ratio: x_range / y_range,
        })
    }

    /// Create bounds from a `[min_x, min_y, max_x, max_y]` extent, the
    /// layout used by GeoJSON `bbox` members and raster corner extraction.
    pub fn from_extent(crs_name: impl Into<String>, extent: [f64; 4]) -> GeoResult<Self> {
        Self::new(
            crs_name,
            AxisRange::new(extent[0], extent[2]),
            AxisRange::new(extent[1], extent[3]),
        )
    }

    pub fn crs_name(&self) -> &str {
        &self.crs_name
    }

    pub fn axis_labels(&self) -> &AxisLabels {
        &self.axis_labels
    }

    pub fn x(&self) -> AxisRange {
        self.x
    }

    pub fn y(&self) -> AxisRange {
        self.y
    }

    pub fn x_range(&self) -> f64 {
        self.x_range
    }

    pub fn y_range(&self) -> f64 {
        self.y_range
    }

    /// Width over height.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Lower-left corner.
    pub fn min_corner(&self) -> Coord {
        [self.x.min, self.y.min]
    }

    /// Upper-right corner.
    pub fn max_corner(&self) -> Coord {
        [self.x.max, self.y.max]
    }

    /// `[min_x, min_y, max_x, max_y]`
    pub fn extent(&self) -> [f64; 4] {
        [self.x.min, self.y.min, self.x.max, self.y.max]
    }

    pub fn center(&self) -> Coord {
        [
            (self.x.min + self.x.max) / 2.0,
            (self.y.min + self.y.max) / 2.0,
        ]
    }

    /// Check if a point lies inside (boundary inclusive).
    pub fn contains(&self, coord: Coord) -> bool {
        self.x.contains(coord[0]) && self.y.contains(coord[1])
    }

    /// Check if `other` lies entirely inside this rectangle.
    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        self.x.min <= other.x.min
            && self.x.max >= other.x.max
            && self.y.min <= other.y.min
            && self.y.max >= other.y.max
    }

    /// Check if this rectangle overlaps another.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x.min < other.x.max
            && self.x.max > other.x.min
            && self.y.min < other.y.max
            && self.y.max > other.y.min
    }

    /// Smallest rectangle covering both. Both must share a CRS.
    pub fn union(&self, other: &Bounds) -> GeoResult<Bounds> {
        if self.crs_name != other.crs_name {
            return Err(GeoError::projection(format!(
                "cannot union bounds in {} with bounds in {}",
                self.crs_name, other.crs_name
            )));
        }

        Bounds::with_labels(
            self.crs_name.clone(),
            self.axis_labels.clone(),
            AxisRange::new(self.x.min.min(other.x.min), self.x.max.max(other.x.max)),
            AxisRange::new(self.y.min.min(other.y.min), self.y.max.max(other.y.max)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_values() {
        let b = Bounds::from_extent("EPSG:25832", [0.0, 0.0, 200.0, 100.0]).unwrap();
        assert_eq!(b.x_range(), 200.0);
        assert_eq!(b.y_range(), 100.0);
        assert_eq!(b.ratio(), 2.0);
        assert_eq!(b.center(), [100.0, 50.0]);
    }

    #[test]
    fn test_rejects_degenerate_extent() {
        let zero_width = Bounds::from_extent("EPSG:4326", [5.0, 0.0, 5.0, 1.0]);
        assert!(matches!(zero_width, Err(GeoError::InvalidBounds { .. })));

        let inverted = Bounds::from_extent("EPSG:4326", [0.0, 10.0, 1.0, 5.0]);
        assert!(matches!(inverted, Err(GeoError::InvalidBounds { .. })));

        let nan = Bounds::from_extent("EPSG:4326", [0.0, f64::NAN, 1.0, 5.0]);
        assert!(matches!(nan, Err(GeoError::InvalidBounds { .. })));
    }

    #[test]
    fn test_union_requires_same_crs() {
        let a = Bounds::from_extent("EPSG:4326", [0.0, 0.0, 1.0, 1.0]).unwrap();
        let b = Bounds::from_extent("EPSG:25832", [0.0, 0.0, 1.0, 1.0]).unwrap();
        assert!(a.union(&b).is_err());
    }
}
