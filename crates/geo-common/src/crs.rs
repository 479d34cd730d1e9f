//! Named coordinate reference system definitions.
//!
//! A `CrsRegistry` is an explicit value: every converter is built from the
//! registry it is handed, so two scenes (or two tests) never share hidden
//! projection state.

use std::collections::HashMap;

use proj4rs::proj::Proj;

use crate::bounds::AxisLabels;
use crate::error::{GeoError, GeoResult};

/// ETRS89 / UTM zone 32N, the default scene target.
pub const EPSG_25832: &str = "+proj=utm +zone=32 +ellps=GRS80 +units=m +no_defs";

const DEFAULT_DEFINITIONS: &[(&str, &str)] = &[
    ("EPSG:4326", "+proj=longlat +datum=WGS84 +no_defs"),
    ("EPSG:4258", "+proj=longlat +ellps=GRS80 +no_defs"),
    (
        "EPSG:3857",
        "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +no_defs",
    ),
    ("EPSG:25832", EPSG_25832),
    ("EPSG:25833", "+proj=utm +zone=33 +ellps=GRS80 +units=m +no_defs"),
    ("EPSG:32632", "+proj=utm +zone=32 +datum=WGS84 +units=m +no_defs"),
    ("EPSG:32633", "+proj=utm +zone=33 +datum=WGS84 +units=m +no_defs"),
];

/// A registered CRS: its canonical name and PROJ.4 definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrsDefinition {
    pub name: String,
    pub proj4: String,
    pub geographic: bool,
}

impl CrsDefinition {
    /// Build the proj4rs projection for this definition.
    pub fn to_proj(&self) -> GeoResult<Proj> {
        Proj::from_proj_string(&self.proj4).map_err(|e| {
            GeoError::projection(format!("invalid definition for {}: {}", self.name, e))
        })
    }

    pub fn axis_labels(&self) -> AxisLabels {
        if self.geographic {
            AxisLabels::geographic()
        } else {
            AxisLabels::projected()
        }
    }
}

/// Registry of named CRS definitions.
#[derive(Debug, Clone, Default)]
pub struct CrsRegistry {
    definitions: HashMap<String, CrsDefinition>,
}

impl CrsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the common WGS84 / ETRS89 / UTM definitions.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, proj4) in DEFAULT_DEFINITIONS {
            registry.definitions.insert(
                name.to_string(),
                CrsDefinition {
                    name: name.to_string(),
                    proj4: proj4.to_string(),
                    geographic: is_geographic_definition(proj4),
                },
            );
        }
        registry
    }

    /// Register (or replace) a named definition.
    ///
    /// The PROJ.4 string is parsed up front so a broken definition fails
    /// here rather than on first conversion.
    pub fn register(&mut self, name: &str, proj4: &str) -> GeoResult<()> {
        let name = normalize_crs_name(name);
        let definition = CrsDefinition {
            name: name.clone(),
            proj4: proj4.trim().to_string(),
            geographic: is_geographic_definition(proj4),
        };
        definition.to_proj()?;
        self.definitions.insert(name, definition);
        Ok(())
    }

    /// Look up a definition by name. Fails with `UnknownCrs`.
    pub fn get(&self, name: &str) -> GeoResult<&CrsDefinition> {
        self.definitions
            .get(&normalize_crs_name(name))
            .ok_or_else(|| GeoError::UnknownCrs(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(&normalize_crs_name(name))
    }

    /// Check if a registered CRS uses geographic (degree) coordinates.
    pub fn is_geographic(&self, name: &str) -> GeoResult<bool> {
        Ok(self.get(name)?.geographic)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Normalize the CRS spellings found in GeoJSON and GeoTIFF metadata.
///
/// Accepts formats like:
/// - "EPSG:25832" / "epsg:25832"
/// - "urn:ogc:def:crs:EPSG::25832"
/// - "urn:ogc:def:crs:OGC:1.3:CRS84" / "CRS:84" (WGS84 lon/lat)
pub fn normalize_crs_name(name: &str) -> String {
    let upper = name.trim().to_uppercase();

    if upper.ends_with("CRS84") || upper == "CRS:84" {
        return "EPSG:4326".to_string();
    }

    if let Some(rest) = upper.strip_prefix("URN:OGC:DEF:CRS:EPSG:") {
        // Version segment may be empty ("EPSG::25832") or present ("EPSG:6.6:4326")
        if let Some(code) = rest.rsplit(':').next() {
            return format!("EPSG:{}", code);
        }
    }

    upper
}

/// Axis labels for a CRS name without consulting a registry.
///
/// Built-in geographic definitions get longitude/latitude; every other name
/// is treated as projected.
pub fn default_axis_labels(name: &str) -> AxisLabels {
    let name = normalize_crs_name(name);
    let geographic = DEFAULT_DEFINITIONS
        .iter()
        .any(|(n, proj4)| *n == name && is_geographic_definition(proj4));
    if geographic {
        AxisLabels::geographic()
    } else {
        AxisLabels::projected()
    }
}

fn is_geographic_definition(proj4: &str) -> bool {
    proj4.split_whitespace().any(|token| {
        matches!(
            token,
            "+proj=longlat" | "+proj=latlong" | "+proj=lonlat" | "+proj=latlon"
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_crs_name() {
        assert_eq!(normalize_crs_name("EPSG:25832"), "EPSG:25832");
        assert_eq!(normalize_crs_name("epsg:4326"), "EPSG:4326");
        assert_eq!(
            normalize_crs_name("urn:ogc:def:crs:EPSG::25832"),
            "EPSG:25832"
        );
        assert_eq!(
            normalize_crs_name("urn:ogc:def:crs:OGC:1.3:CRS84"),
            "EPSG:4326"
        );
        assert_eq!(normalize_crs_name("CRS:84"), "EPSG:4326");
    }

    #[test]
    fn test_defaults_registered() {
        let registry = CrsRegistry::with_defaults();
        assert!(registry.contains("EPSG:4326"));
        assert!(registry.contains("epsg:25832"));
        assert!(registry.is_geographic("EPSG:4326").unwrap());
        assert!(!registry.is_geographic("EPSG:25832").unwrap());
    }

    #[test]
    fn test_default_axis_labels() {
        assert_eq!(default_axis_labels("EPSG:4326"), AxisLabels::geographic());
        assert_eq!(default_axis_labels("urn:ogc:def:crs:OGC:1.3:CRS84"), AxisLabels::geographic());
        assert_eq!(default_axis_labels("EPSG:4258"), AxisLabels::geographic());
        assert_eq!(default_axis_labels("EPSG:25832"), AxisLabels::projected());
        assert_eq!(default_axis_labels("EPSG:99999"), AxisLabels::projected());
    }

    #[test]
    fn test_unknown_crs() {
        let registry = CrsRegistry::new();
        assert!(matches!(
            registry.get("EPSG:25832"),
            Err(GeoError::UnknownCrs(_))
        ));
    }

    #[test]
    fn test_register_custom_zone() {
        let mut registry = CrsRegistry::new();
        registry
            .register("EPSG:25835", "+proj=utm +zone=35 +ellps=GRS80 +units=m +no_defs")
            .unwrap();
        assert!(registry.contains("EPSG:25835"));
        assert_eq!(registry.names(), vec!["EPSG:25835"]);
    }
}
