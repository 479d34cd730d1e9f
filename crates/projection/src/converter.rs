//! Point conversion between two named coordinate reference systems.
//!
//! A converter is bound to one (from, to) pair resolved against an explicit
//! `CrsRegistry`. It owns its two proj4rs projections, so converters built
//! for different layers never share transform state.
//!
//! Geographic CRSs take and return degrees; proj4rs works in radians, and the
//! conversion happens at this boundary only.

use std::fmt;

use geo_common::{Coord, CrsDefinition, CrsRegistry, GeoError, GeoResult};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

/// A forward/inverse transform between two registered CRSs.
pub struct CrsConverter {
    from: CrsDefinition,
    to: CrsDefinition,
    from_proj: Proj,
    to_proj: Proj,
    identity: bool,
}

impl fmt::Debug for CrsConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrsConverter")
            .field("from", &self.from.name)
            .field("to", &self.to.name)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl CrsConverter {
    /// Build a converter for `from -> to`.
    ///
    /// Fails with `UnknownCrs` if either name is not registered.
    pub fn new(registry: &CrsRegistry, from: &str, to: &str) -> GeoResult<Self> {
        let from = registry.get(from)?.clone();
        let to = registry.get(to)?.clone();
        let from_proj = from.to_proj()?;
        let to_proj = to.to_proj()?;
        let identity = from.name == to.name || from.proj4 == to.proj4;

        Ok(Self {
            from,
            to,
            from_proj,
            to_proj,
            identity,
        })
    }

    pub fn from_crs(&self) -> &str {
        &self.from.name
    }

    pub fn to_crs(&self) -> &str {
        &self.to.name
    }

    pub fn target_definition(&self) -> &CrsDefinition {
        &self.to
    }

    /// True when both ends resolve to the same definition.
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Convert a coordinate from the source CRS into the target CRS.
    pub fn forward(&self, coord: Coord) -> GeoResult<Coord> {
        if self.identity {
            return Ok(coord);
        }
        transform_point(&self.from, &self.from_proj, &self.to, &self.to_proj, coord)
    }

    /// Convert a coordinate from the target CRS back into the source CRS.
    pub fn inverse(&self, coord: Coord) -> GeoResult<Coord> {
        if self.identity {
            return Ok(coord);
        }
        transform_point(&self.to, &self.to_proj, &self.from, &self.from_proj, coord)
    }
}

/// One-shot conversion of a single coordinate.
pub fn convert(registry: &CrsRegistry, from: &str, to: &str, coord: Coord) -> GeoResult<Coord> {
    CrsConverter::new(registry, from, to)?.forward(coord)
}

fn transform_point(
    src: &CrsDefinition,
    src_proj: &Proj,
    dst: &CrsDefinition,
    dst_proj: &Proj,
    coord: Coord,
) -> GeoResult<Coord> {
    let mut point = if src.geographic {
        (coord[0].to_radians(), coord[1].to_radians(), 0.0)
    } else {
        (coord[0], coord[1], 0.0)
    };

    transform(src_proj, dst_proj, &mut point).map_err(|e| {
        GeoError::projection(format!(
            "{} -> {} failed for ({}, {}): {}",
            src.name, dst.name, coord[0], coord[1], e
        ))
    })?;

    let out = if dst.geographic {
        [point.0.to_degrees(), point.1.to_degrees()]
    } else {
        [point.0, point.1]
    };

    if !out[0].is_finite() || !out[1].is_finite() {
        return Err(GeoError::projection(format!(
            "{} -> {} produced a non-finite coordinate for ({}, {})",
            src.name, dst.name, coord[0], coord[1]
        )));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_passthrough() {
        let registry = CrsRegistry::with_defaults();
        let conv = CrsConverter::new(&registry, "EPSG:25832", "epsg:25832").unwrap();
        assert!(conv.is_identity());
        assert_eq!(conv.forward([1.5, 2.5]).unwrap(), [1.5, 2.5]);
    }

    #[test]
    fn test_unknown_crs_fails() {
        let registry = CrsRegistry::with_defaults();
        let err = CrsConverter::new(&registry, "EPSG:4326", "EPSG:99999").unwrap_err();
        assert!(matches!(err, GeoError::UnknownCrs(_)));
    }

    #[test]
    fn test_central_meridian_maps_to_false_easting() {
        // Zone 32 central meridian is 9E; points on it sit at easting 500000.
        let registry = CrsRegistry::with_defaults();
        let out = convert(&registry, "EPSG:4326", "EPSG:25832", [9.0, 51.0]).unwrap();
        assert!((out[0] - 500000.0).abs() < 1e-3, "easting was {}", out[0]);
        assert!(out[1] > 5_600_000.0 && out[1] < 5_700_000.0);
    }

    #[test]
    fn test_forward_inverse() {
        let registry = CrsRegistry::with_defaults();
        let conv = CrsConverter::new(&registry, "EPSG:4326", "EPSG:25832").unwrap();
        let projected = conv.forward([7.1, 51.4]).unwrap();
        let back = conv.inverse(projected).unwrap();
        assert!((back[0] - 7.1).abs() < 1e-7);
        assert!((back[1] - 51.4).abs() < 1e-7);
    }
}
