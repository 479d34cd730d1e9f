//! Scene configuration.

use std::collections::{BTreeMap, HashSet};

use elevation::SamplerConfig;
use geo_common::{CrsRegistry, GeoResult};
use serde::{Deserialize, Serialize};
use terrain_mesh::{TerrainConfig, TerrainMode};
use tracing::warn;

/// Configuration of one assembled scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// CRS every layer is unified in.
    pub target_crs: String,

    /// Width of the local plane; its height follows the unified aspect ratio.
    pub map_width: f64,

    /// Extra CRS definitions, name to proj4 string.
    pub crs_definitions: BTreeMap<String, String>,

    /// Elevation model; scenes without one are flat.
    pub dem: Option<DemConfig>,

    pub terrain: TerrainConfig,

    /// Vector layers in render order.
    pub layers: Vec<LayerConfig>,

    /// Timeout for remote sources.
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemConfig {
    pub url: String,

    /// CRS assumed when the raster carries none.
    #[serde(default)]
    pub fallback_crs: Option<String>,

    #[serde(default)]
    pub sampler: SamplerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub id: String,
    pub url: String,

    /// Attach DEM elevation to the layer's vertices.
    #[serde(default)]
    pub drape_on_terrain: bool,

    #[serde(default)]
    pub color: Option<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            target_crs: "EPSG:25832".to_string(),
            map_width: 1000.0,
            crs_definitions: BTreeMap::new(),
            dem: None,
            terrain: TerrainConfig::default(),
            layers: Vec::new(),
            fetch_timeout_secs: 60,
        }
    }
}

impl SceneConfig {
    /// Override fields from environment variables.
    ///
    /// `SCENE_TARGET_CRS`, `SCENE_MAP_WIDTH`, `SCENE_DEM_URL`,
    /// `SCENE_VERTICAL_SCALE` and `SCENE_TERRAIN_MODE` are read. Unparseable
    /// numbers are an error.
    /// A DEM added through `SCENE_DEM_URL` takes its sampler settings from
    /// the `DEM_*` variables.
    pub fn apply_env_overrides(&mut self) -> Result<(), String> {
        if let Ok(val) = std::env::var("SCENE_TARGET_CRS") {
            self.target_crs = val;
        }

        if let Ok(val) = std::env::var("SCENE_MAP_WIDTH") {
            self.map_width = val
                .parse()
                .map_err(|_| format!("SCENE_MAP_WIDTH is not a number: {}", val))?;
        }

        if let Ok(url) = std::env::var("SCENE_DEM_URL") {
            match &mut self.dem {
                Some(dem) => dem.url = url,
                None => {
                    self.dem = Some(DemConfig {
                        url,
                        fallback_crs: None,
                        sampler: SamplerConfig::from_env(),
                    })
                }
            }
        }

        if let Ok(val) = std::env::var("SCENE_VERTICAL_SCALE") {
            let scale = val
                .parse()
                .map_err(|_| format!("SCENE_VERTICAL_SCALE is not a number: {}", val))?;
            match &mut self.dem {
                Some(dem) => dem.sampler.vertical_scale = scale,
                None => warn!(
                    vertical_scale = scale,
                    "SCENE_VERTICAL_SCALE is set but no DEM is configured, ignoring"
                ),
            }
        }

        if let Ok(val) = std::env::var("SCENE_TERRAIN_MODE") {
            self.terrain.mode = TerrainMode::from_str(&val);
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.target_crs.trim().is_empty() {
            return Err("target_crs must not be empty".to_string());
        }

        if !(self.map_width.is_finite() && self.map_width > 0.0) {
            return Err(format!("map_width must be > 0, got {}", self.map_width));
        }

        if self.layers.is_empty() {
            return Err("at least one layer must be configured".to_string());
        }

        let mut ids = HashSet::new();
        for layer in &self.layers {
            if layer.id.trim().is_empty() {
                return Err("layer id must not be empty".to_string());
            }
            if layer.url.trim().is_empty() {
                return Err(format!("layer {} has no url", layer.id));
            }
            if !ids.insert(layer.id.as_str()) {
                return Err(format!("duplicate layer id: {}", layer.id));
            }
        }

        if let Some(dem) = &self.dem {
            if dem.url.trim().is_empty() {
                return Err("dem.url must not be empty".to_string());
            }
            dem.sampler.validate()?;
        }

        self.terrain.validate()
    }

    /// Registry with the default CRSs plus `crs_definitions`.
    pub fn registry(&self) -> GeoResult<CrsRegistry> {
        let mut registry = CrsRegistry::with_defaults();
        for (name, proj4) in &self.crs_definitions {
            registry.register(name, proj4)?;
        }
        Ok(registry)
    }

    /// Layers that want elevation attached.
    pub fn draped_layers(&self) -> impl Iterator<Item = &LayerConfig> {
        self.layers.iter().filter(|l| l.drape_on_terrain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(id: &str) -> LayerConfig {
        LayerConfig {
            id: id.to_string(),
            url: format!("{}.geojson", id),
            drape_on_terrain: false,
            color: None,
        }
    }

    #[test]
    fn test_default_needs_layers() {
        let mut config = SceneConfig::default();
        assert!(config.validate().is_err());
        config.layers.push(layer("roads"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_vertical_scale_override() {
        std::env::set_var("SCENE_VERTICAL_SCALE", "4");

        let mut flat = SceneConfig {
            layers: vec![layer("a")],
            ..Default::default()
        };
        flat.apply_env_overrides().unwrap();
        assert!(flat.dem.is_none());

        let mut with_dem = SceneConfig {
            dem: Some(DemConfig {
                url: "dem.tif".to_string(),
                fallback_crs: None,
                sampler: SamplerConfig::default(),
            }),
            ..flat.clone()
        };
        with_dem.apply_env_overrides().unwrap();
        assert_eq!(with_dem.dem.unwrap().sampler.vertical_scale, 4.0);

        std::env::set_var("SCENE_VERTICAL_SCALE", "steep");
        assert!(flat.apply_env_overrides().unwrap_err().contains("SCENE_VERTICAL_SCALE"));
        std::env::remove_var("SCENE_VERTICAL_SCALE");
    }

    #[test]
    fn test_duplicate_layer_ids_rejected() {
        let config = SceneConfig {
            layers: vec![layer("water"), layer("water")],
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("duplicate"));
    }

    #[test]
    fn test_registry_includes_custom_definitions() {
        let mut config = SceneConfig::default();
        config.crs_definitions.insert(
            "EPSG:31467".to_string(),
            "+proj=tmerc +lat_0=0 +lon_0=9 +k=1 +x_0=3500000 +y_0=0 +ellps=bessel +units=m +no_defs"
                .to_string(),
        );
        let registry = config.registry().unwrap();
        assert!(registry.contains("EPSG:31467"));
        assert!(registry.contains("EPSG:25832"));
    }

    #[test]
    fn test_bad_terrain_rejected() {
        let mut config = SceneConfig {
            layers: vec![layer("a")],
            ..Default::default()
        };
        config.terrain.grid_size = 100;
        assert!(config.validate().is_err());
    }
}
