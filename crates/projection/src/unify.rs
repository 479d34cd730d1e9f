//! Union of independently sourced layer extents in one target CRS.

use geo_common::{Bounds, CrsRegistry, GeoError, GeoResult};
use tracing::debug;

use crate::bounds::reproject_bounds;

/// Reproject every layer extent into `target_crs` and fold them into one
/// covering rectangle.
///
/// Fails with `EmptyInput` when `layers` is empty. A reprojection failure of
/// any layer fails the whole fold; callers drop bad layers beforehand.
pub fn unify_bounds(registry: &CrsRegistry, layers: &[Bounds], target_crs: &str) -> GeoResult<Bounds> {
    let mut reprojected = layers
        .iter()
        .map(|b| reproject_bounds(registry, b, target_crs));

    let first = match reprojected.next() {
        Some(b) => b?,
        None => {
            return Err(GeoError::EmptyInput(format!(
                "no layer bounds to unify into {}",
                target_crs
            )))
        }
    };

    let unified = reprojected.try_fold(first, |acc, next| acc.union(&next?))?;

    debug!(
        layers = layers.len(),
        crs = unified.crs_name(),
        extent = ?unified.extent(),
        "Unified layer bounds"
    );

    Ok(unified)
}
