//! Bounding rectangle reprojection.

use geo_common::{AxisRange, Bounds, CrsRegistry, GeoResult};
use tracing::debug;

use crate::converter::CrsConverter;

/// Reproject `source` into `target_crs` by converting its min and max corners.
///
/// Two-corner reprojection is exact for axis-aligned transforms and a close
/// approximation for conformal projections over modest extents. It is not a
/// full-boundary resampling: a rectangle that curves in the target CRS is
/// under-covered at its edges.
pub fn reproject_bounds(registry: &CrsRegistry, source: &Bounds, target_crs: &str) -> GeoResult<Bounds> {
    let converter = CrsConverter::new(registry, source.crs_name(), target_crs)?;
    reproject_with(&converter, source)
}

/// Reproject using an already-built converter.
pub(crate) fn reproject_with(converter: &CrsConverter, source: &Bounds) -> GeoResult<Bounds> {
    let min = converter.forward(source.min_corner())?;
    let max = converter.forward(source.max_corner())?;

    debug!(
        from = converter.from_crs(),
        to = converter.to_crs(),
        min_x = min[0],
        min_y = min[1],
        max_x = max[0],
        max_y = max[1],
        "Reprojected bounds corners"
    );

    let labels = if converter.is_identity() {
        source.axis_labels().clone()
    } else {
        converter.target_definition().axis_labels()
    };

    Bounds::with_labels(
        converter.to_crs(),
        labels,
        AxisRange::new(min[0], max[0]),
        AxisRange::new(min[1], max[1]),
    )
}
