//! Configuration for terrain generation.

use serde::{Deserialize, Serialize};

/// Terrain triangulation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainMode {
    /// Regular lattice, one vertex per lattice point.
    #[default]
    Grid,
    /// RTIN simplification bounded by `max_error`.
    Adaptive,
}

impl TerrainMode {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "adaptive" | "rtin" | "martini" => Self::Adaptive,
            _ => Self::Grid,
        }
    }
}

/// Configuration for terrain mesh generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub mode: TerrainMode,

    /// Lattice segments along x (grid mode).
    pub width_segments: usize,

    /// Lattice segments along y (grid mode). Derived from the aspect ratio
    /// when absent.
    pub height_segments: Option<usize>,

    /// Side length of the square raster fed to the RTIN; must be `2^k + 1`.
    pub grid_size: usize,

    /// Maximum tolerated height error per triangle (adaptive mode), in
    /// scaled elevation units.
    pub max_error: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            mode: TerrainMode::Grid,
            width_segments: 100,
            height_segments: None,
            grid_size: 257,
            max_error: 1.0,
        }
    }
}

impl TerrainConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.width_segments == 0 {
            return Err("width_segments must be > 0".to_string());
        }

        if self.height_segments == Some(0) {
            return Err("height_segments must be > 0".to_string());
        }

        if self.grid_size < 3 || !(self.grid_size - 1).is_power_of_two() {
            return Err(format!(
                "grid_size must be 2^k + 1 (e.g. 257), got {}",
                self.grid_size
            ));
        }

        if !(self.max_error.is_finite() && self.max_error >= 0.0) {
            return Err(format!("max_error must be >= 0, got {}", self.max_error));
        }

        Ok(())
    }

    /// Lattice segments along y for a given width/height ratio.
    pub fn height_segments_for(&self, ratio: f64) -> usize {
        self.height_segments
            .unwrap_or_else(|| (self.width_segments as f64 / ratio).round() as usize)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(TerrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_grid_size_must_be_power_of_two_plus_one() {
        let config = TerrainConfig {
            grid_size: 256,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TerrainConfig {
            grid_size: 65,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_height_segments_from_ratio() {
        let config = TerrainConfig::default();
        assert_eq!(config.height_segments_for(2.0), 50);
        assert_eq!(config.height_segments_for(1000.0), 1);

        let fixed = TerrainConfig {
            height_segments: Some(7),
            ..Default::default()
        };
        assert_eq!(fixed.height_segments_for(2.0), 7);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(TerrainMode::from_str("RTIN"), TerrainMode::Adaptive);
        assert_eq!(TerrainMode::from_str("grid"), TerrainMode::Grid);
    }
}
