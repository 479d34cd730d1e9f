//! Configuration for elevation sampling.

use serde::{Deserialize, Serialize};

use crate::interpolation::InterpolationMethod;

/// Configuration for the elevation sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Interpolation method for raster lookups.
    pub interpolation: InterpolationMethod,

    /// Divisor applied to raw elevations for display.
    pub vertical_scale: f64,

    /// Minimum elevation; lower raw values are raised to it.
    pub floor: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interpolation: InterpolationMethod::Bilinear,
            vertical_scale: 1.0,
            floor: 0.0,
        }
    }
}

impl SamplerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("DEM_INTERPOLATION") {
            config.interpolation = InterpolationMethod::from_str(&val);
        }

        if let Ok(val) = std::env::var("DEM_VERTICAL_SCALE") {
            if let Ok(scale) = val.parse() {
                config.vertical_scale = scale;
            }
        }

        if let Ok(val) = std::env::var("DEM_FLOOR") {
            if let Ok(floor) = val.parse() {
                config.floor = floor;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.vertical_scale.is_finite() && self.vertical_scale > 0.0) {
            return Err(format!(
                "vertical_scale must be > 0, got {}",
                self.vertical_scale
            ));
        }

        if !self.floor.is_finite() {
            return Err("floor must be finite".to_string());
        }

        Ok(())
    }

    /// Apply floor and vertical scale to a valid raw elevation.
    pub fn scale(&self, raw: f64) -> f64 {
        raw.max(self.floor) / self.vertical_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SamplerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.interpolation, InterpolationMethod::Bilinear);
    }

    #[test]
    fn test_zero_scale_rejected() {
        let config = SamplerConfig {
            vertical_scale: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scale_applies_floor_then_divisor() {
        let config = SamplerConfig {
            interpolation: InterpolationMethod::Nearest,
            vertical_scale: 2.0,
            floor: 1.0,
        };
        assert_eq!(config.scale(10.0), 5.0);
        assert_eq!(config.scale(-3.0), 0.5);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SamplerConfig =
            serde_json::from_str(r#"{"interpolation": "nearest"}"#).unwrap();
        assert_eq!(config.interpolation, InterpolationMethod::Nearest);
        assert_eq!(config.vertical_scale, 1.0);
    }
}
