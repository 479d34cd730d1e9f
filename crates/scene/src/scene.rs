//! The assembled scene.

use geo_common::{Bounds, GeoError};
use serde::Serialize;
use terrain_mesh::TerrainMesh;
use vector_layer::LayerGeometry;

/// One built vector layer.
#[derive(Debug, Clone, Serialize)]
pub struct SceneLayer {
    pub id: String,
    /// Position among the configured layers; later layers draw on top.
    pub render_order: usize,
    pub color: Option<String>,
    /// Layer extent in its own CRS.
    pub source_bounds: Bounds,
    pub draped: bool,
    pub geometry: LayerGeometry,
}

/// An asset that was excluded from the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerFailure {
    pub id: String,
    pub code: String,
    pub error: String,
}

impl LayerFailure {
    pub fn new(id: impl Into<String>, error: &GeoError) -> Self {
        Self {
            id: id.into(),
            code: error.code().to_string(),
            error: error.to_string(),
        }
    }
}

/// Layers and terrain sharing one local frame.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    /// Union of all surviving layer bounds in the target CRS.
    pub unified_bounds: Bounds,
    pub map_width: f64,
    pub map_height: f64,
    pub layers: Vec<SceneLayer>,
    pub terrain: Option<TerrainMesh>,
    pub failures: Vec<LayerFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerSummary {
    pub id: String,
    pub render_order: usize,
    pub crs: String,
    pub draped: bool,
    pub features: usize,
    pub skipped_features: usize,
    pub vertices: usize,
    pub triangles: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TerrainSummary {
    pub vertices: usize,
    pub triangles: usize,
    pub height_range: Option<(f32, f32)>,
}

/// Serializable statistics of a scene.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub target_crs: String,
    pub unified_bounds: [f64; 4],
    pub map_width: f64,
    pub map_height: f64,
    pub center_offset: [f64; 3],
    pub layers: Vec<LayerSummary>,
    pub terrain: Option<TerrainSummary>,
    pub failures: Vec<LayerFailure>,
}

impl Scene {
    /// xy extent of all layer vertices and terrain positions.
    pub fn content_extent(&self) -> Option<[f64; 4]> {
        let mut extent: Option<[f64; 4]> = None;
        let mut include = |x: f64, y: f64| {
            extent = Some(match extent {
                None => [x, y, x, y],
                Some([x0, y0, x1, y1]) => [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
            });
        };

        for layer in &self.layers {
            for feature in &layer.geometry.features {
                for v in feature.mesh.vertices() {
                    include(v[0], v[1]);
                }
            }
        }
        if let Some(terrain) = &self.terrain {
            for p in &terrain.positions {
                include(p[0] as f64, p[1] as f64);
            }
        }

        extent
    }

    /// Translation that centres the content on the origin in x and y.
    ///
    /// Heights are left untouched.
    pub fn center_offset(&self) -> [f64; 3] {
        match self.content_extent() {
            Some([x0, y0, x1, y1]) => [-(x0 + x1) / 2.0, -(y0 + y1) / 2.0, 0.0],
            None => [0.0, 0.0, 0.0],
        }
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            target_crs: self.unified_bounds.crs_name().to_string(),
            unified_bounds: self.unified_bounds.extent(),
            map_width: self.map_width,
            map_height: self.map_height,
            center_offset: self.center_offset(),
            layers: self
                .layers
                .iter()
                .map(|l| LayerSummary {
                    id: l.id.clone(),
                    render_order: l.render_order,
                    crs: l.source_bounds.crs_name().to_string(),
                    draped: l.draped,
                    features: l.geometry.features.len(),
                    skipped_features: l.geometry.skipped,
                    vertices: l.geometry.vertex_count(),
                    triangles: l.geometry.triangle_count(),
                })
                .collect(),
            terrain: self.terrain.as_ref().map(|t| TerrainSummary {
                vertices: t.vertex_count(),
                triangles: t.triangle_count(),
                height_range: t.height_range(),
            }),
            failures: self.failures.clone(),
        }
    }
}
