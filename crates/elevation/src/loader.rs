//! Elevation grid loading from a raster source.

use async_trait::async_trait;
use geo_common::{
    normalize_crs_name, AxisRange, Bounds, CrsRegistry, ElevationGrid, GeoError, GeoResult,
};
use tracing::{info, warn};

use crate::decode::DecodedRaster;

/// Collaborator that turns a URL into a decoded raster.
#[async_trait]
pub trait RasterSource: Send + Sync {
    /// Fetch and decode the raster at `url`.
    async fn fetch_raster(&self, url: &str) -> GeoResult<DecodedRaster>;
}

/// Load a DEM into an immutable elevation grid.
///
/// When the raster carries no CRS, `fallback_crs` is used and the fallback
/// is logged. Without a fallback the load fails with `MissingCrs`.
pub async fn load_elevation_grid(
    source: &dyn RasterSource,
    registry: &CrsRegistry,
    url: &str,
    fallback_crs: Option<&str>,
) -> GeoResult<ElevationGrid> {
    let decoded = source.fetch_raster(url).await?;
    grid_from_decoded(decoded, registry, url, fallback_crs)
}

/// Resolve the CRS of a decoded raster and wrap it into a grid.
pub fn grid_from_decoded(
    decoded: DecodedRaster,
    registry: &CrsRegistry,
    url: &str,
    fallback_crs: Option<&str>,
) -> GeoResult<ElevationGrid> {
    let crs_name = match (&decoded.crs_name, fallback_crs) {
        (Some(name), _) => normalize_crs_name(name),
        (None, Some(fallback)) => {
            warn!(
                url = %url,
                fallback_crs = %fallback,
                "DEM has no embedded CRS, using configured fallback"
            );
            normalize_crs_name(fallback)
        }
        (None, None) => return Err(GeoError::MissingCrs(url.to_string())),
    };

    let labels = registry.get(&crs_name)?.axis_labels();
    let [min_x, min_y, max_x, max_y] = decoded.bounds;
    let bounds = Bounds::with_labels(
        crs_name,
        labels,
        AxisRange::new(min_x, max_x),
        AxisRange::new(min_y, max_y),
    )?;

    let grid = ElevationGrid::new(decoded.raster, decoded.width, decoded.height, bounds)?;

    info!(
        url = %url,
        width = grid.width(),
        height = grid.height(),
        crs = grid.bounds().crs_name(),
        nodata_cells = grid.nodata_count(),
        "Loaded elevation grid"
    );

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource(DecodedRaster);

    #[async_trait]
    impl RasterSource for StaticSource {
        async fn fetch_raster(&self, _url: &str) -> GeoResult<DecodedRaster> {
            Ok(self.0.clone())
        }
    }

    fn raster(crs_name: Option<&str>) -> DecodedRaster {
        DecodedRaster {
            raster: vec![1.0, 2.0, 3.0, 4.0],
            width: 2,
            height: 2,
            crs_name: crs_name.map(str::to_string),
            bounds: [0.0, 0.0, 2.0, 2.0],
        }
    }

    #[tokio::test]
    async fn test_embedded_crs_wins() {
        let registry = CrsRegistry::with_defaults();
        let source = StaticSource(raster(Some("EPSG:25832")));
        let grid = load_elevation_grid(&source, &registry, "dem.tif", Some("EPSG:4326"))
            .await
            .unwrap();
        assert_eq!(grid.bounds().crs_name(), "EPSG:25832");
    }

    #[tokio::test]
    async fn test_missing_crs_without_fallback() {
        let registry = CrsRegistry::with_defaults();
        let source = StaticSource(raster(None));
        let err = load_elevation_grid(&source, &registry, "dem.tif", None)
            .await
            .unwrap_err();
        assert!(matches!(err, GeoError::MissingCrs(ref url) if url == "dem.tif"));
    }

    #[tokio::test]
    async fn test_missing_crs_with_fallback() {
        let registry = CrsRegistry::with_defaults();
        let source = StaticSource(raster(None));
        let grid = load_elevation_grid(&source, &registry, "dem.tif", Some("epsg:25833"))
            .await
            .unwrap();
        assert_eq!(grid.bounds().crs_name(), "EPSG:25833");
    }

    #[tokio::test]
    async fn test_degenerate_extent_is_invalid_bounds() {
        let registry = CrsRegistry::with_defaults();
        let mut decoded = raster(Some("EPSG:25832"));
        decoded.bounds = [0.0, 0.0, 0.0, 2.0];
        let err = load_elevation_grid(&StaticSource(decoded), &registry, "dem.tif", None)
            .await
            .unwrap_err();
        assert!(matches!(err, GeoError::InvalidBounds { .. }));
    }
}
