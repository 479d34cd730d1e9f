//! Mapping from source-CRS coordinates onto a local scene plane.
//!
//! The local plane spans `[0, map_width] x [0, map_height]`, with the
//! target bounds' minimum corner at the origin and `y` growing northward.
//! `map_height` follows from the target aspect ratio so the plane keeps the
//! target CRS proportions.

use geo_common::{Bounds, Coord, CrsRegistry, GeoError, GeoResult};

use crate::bounds::reproject_with;
use crate::converter::CrsConverter;

/// Where the target frame of a projector comes from.
#[derive(Debug, Clone)]
pub enum ProjectorTarget {
    /// Derive target bounds by reprojecting the source bounds.
    Crs(String),
    /// Use supplied bounds (typically the unified bounds of a scene).
    Bounds(Bounds),
}

/// Projects coordinates of one layer into the shared local frame.
#[derive(Debug)]
pub struct GeoProjector {
    source_bounds: Bounds,
    target_bounds: Bounds,
    map_width: f64,
    map_height: f64,
    converter: CrsConverter,
}

impl GeoProjector {
    pub fn new(
        registry: &CrsRegistry,
        source_bounds: Bounds,
        target: ProjectorTarget,
        map_width: f64,
    ) -> GeoResult<Self> {
        if !(map_width.is_finite() && map_width > 0.0) {
            return Err(GeoError::Config(format!(
                "map width must be positive, got {}",
                map_width
            )));
        }

        let target_crs = match &target {
            ProjectorTarget::Crs(name) => name.clone(),
            ProjectorTarget::Bounds(b) => b.crs_name().to_string(),
        };
        let converter = CrsConverter::new(registry, source_bounds.crs_name(), &target_crs)?;

        let target_bounds = match target {
            ProjectorTarget::Crs(_) => reproject_with(&converter, &source_bounds)?,
            ProjectorTarget::Bounds(b) => b,
        };

        let map_height = map_width / target_bounds.ratio();

        Ok(Self {
            source_bounds,
            target_bounds,
            map_width,
            map_height,
            converter,
        })
    }

    pub fn source_bounds(&self) -> &Bounds {
        &self.source_bounds
    }

    pub fn target_bounds(&self) -> &Bounds {
        &self.target_bounds
    }

    pub fn map_width(&self) -> f64 {
        self.map_width
    }

    pub fn map_height(&self) -> f64 {
        self.map_height
    }

    /// CRS of coordinates accepted by `forward_to_local`.
    pub fn source_crs(&self) -> &str {
        self.source_bounds.crs_name()
    }

    /// Map a source-CRS coordinate onto the local plane.
    pub fn forward_to_local(&self, coord: Coord) -> GeoResult<Coord> {
        let target = self.converter.forward(coord)?;
        Ok(self.target_to_local(target))
    }

    /// Map a coordinate already expressed in the target CRS onto the local plane.
    pub fn target_to_local(&self, coord: Coord) -> Coord {
        let tb = &self.target_bounds;
        [
            (coord[0] - tb.x().min) / tb.x_range() * self.map_width,
            (coord[1] - tb.y().min) / tb.y_range() * self.map_height,
        ]
    }

    /// Inverse of `forward_to_local`.
    pub fn local_to_source(&self, local: Coord) -> GeoResult<Coord> {
        let tb = &self.target_bounds;
        let target = [
            tb.x().min + local[0] / self.map_width * tb.x_range(),
            tb.y().min + local[1] / self.map_height * tb.y_range(),
        ];
        self.converter.inverse(target)
    }
}
