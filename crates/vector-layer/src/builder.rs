//! Vector Layer Geometry Builder.
//!
//! Turns source-CRS features into local scene positions `[x, y, z]`. `x, y`
//! come from the layer's projector; `z` comes from the elevation sampler
//! when the layer is draped and is 0 otherwise.

use elevation::{ElevationSampler, SamplerView};
use geo_common::{Coord, GeoError, GeoResult};
use projection::GeoProjector;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::document::{FeatureGeometry, VectorDocument, VectorFeature};
use crate::triangulate::{flatten_rings, triangulate};

/// 3D geometry of one feature in local scene space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeatureMesh {
    Point {
        position: [f64; 3],
    },
    Line {
        vertices: Vec<[f64; 3]>,
    },
    Polygon {
        /// Exterior ring vertices followed by hole vertices.
        vertices: Vec<[f64; 3]>,
        hole_indices: Vec<usize>,
        triangles: Vec<[u32; 3]>,
    },
}

impl FeatureMesh {
    pub fn vertices(&self) -> &[[f64; 3]] {
        match self {
            FeatureMesh::Point { position } => std::slice::from_ref(position),
            FeatureMesh::Line { vertices } | FeatureMesh::Polygon { vertices, .. } => vertices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    pub fn triangle_count(&self) -> usize {
        match self {
            FeatureMesh::Polygon { triangles, .. } => triangles.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuiltFeature {
    pub id: Option<String>,
    pub mesh: FeatureMesh,
    pub properties: Map<String, JsonValue>,
}

/// All built features of one layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayerGeometry {
    pub features: Vec<BuiltFeature>,
    /// Features skipped with a warning.
    pub skipped: usize,
}

impl LayerGeometry {
    pub fn vertex_count(&self) -> usize {
        self.features.iter().map(|f| f.mesh.vertex_count()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.features.iter().map(|f| f.mesh.triangle_count()).sum()
    }
}

/// Project one source coordinate into local space and attach its elevation.
///
/// Without an elevation view the vertex lies on `z = 0`. No-data under the
/// vertex resolves to the sampler floor.
pub fn build_vertex(
    coord: Coord,
    projector: &GeoProjector,
    elevation: Option<&SamplerView<'_>>,
) -> GeoResult<[f64; 3]> {
    let [x, y] = projector.forward_to_local(coord)?;
    let z = match elevation {
        Some(view) => view.sample_or_floor(coord)?,
        None => 0.0,
    };
    Ok([x, y, z])
}

/// Builds geometry for features in the projector's source CRS.
#[derive(Debug)]
pub struct GeometryBuilder<'a> {
    projector: &'a GeoProjector,
    elevation: Option<SamplerView<'a>>,
}

impl<'a> GeometryBuilder<'a> {
    /// Pass a sampler to drape the layer on terrain.
    pub fn new(projector: &'a GeoProjector, sampler: Option<&'a ElevationSampler>) -> GeoResult<Self> {
        let elevation = sampler
            .map(|s| s.view(projector.source_crs()))
            .transpose()?;
        Ok(Self {
            projector,
            elevation,
        })
    }

    pub fn is_draped(&self) -> bool {
        self.elevation.is_some()
    }

    pub fn vertex(&self, coord: Coord) -> GeoResult<[f64; 3]> {
        build_vertex(coord, self.projector, self.elevation.as_ref())
    }

    fn vertices(&self, coords: &[Coord]) -> GeoResult<Vec<[f64; 3]>> {
        coords.iter().map(|&c| self.vertex(c)).collect()
    }

    pub fn build_feature(&self, feature: &VectorFeature) -> GeoResult<FeatureMesh> {
        match &feature.geometry {
            FeatureGeometry::Point(coord) => Ok(FeatureMesh::Point {
                position: self.vertex(*coord)?,
            }),
            FeatureGeometry::LineString(coords) => {
                if coords.len() < 2 {
                    return Err(GeoError::UnsupportedGeometry(
                        "LineString with fewer than 2 positions".to_string(),
                    ));
                }
                Ok(FeatureMesh::Line {
                    vertices: self.vertices(coords)?,
                })
            }
            FeatureGeometry::Polygon(rings) => {
                let flat = flatten_rings(rings).ok_or_else(|| {
                    GeoError::UnsupportedGeometry(
                        "Polygon exterior ring has fewer than 3 vertices".to_string(),
                    )
                })?;
                let vertices = self.vertices(&flat.vertices)?;
                let planar: Vec<Coord> = vertices.iter().map(|v| [v[0], v[1]]).collect();
                let triangles = triangulate(&planar, &flat.hole_indices)?;
                Ok(FeatureMesh::Polygon {
                    vertices,
                    hole_indices: flat.hole_indices,
                    triangles,
                })
            }
            FeatureGeometry::Unsupported(kind) => Err(GeoError::UnsupportedGeometry(kind.clone())),
        }
    }

    /// Build every feature of a layer, skipping the ones that fail.
    ///
    /// The document must be in the projector's source CRS.
    pub fn build_layer(&self, document: &VectorDocument) -> GeoResult<LayerGeometry> {
        if document.crs_name() != self.projector.source_crs() {
            return Err(GeoError::projection(format!(
                "layer is in {} but its projector expects {}",
                document.crs_name(),
                self.projector.source_crs()
            )));
        }

        let mut layer = LayerGeometry::default();
        for (index, feature) in document.features().iter().enumerate() {
            match self.build_feature(feature) {
                Ok(mesh) => layer.features.push(BuiltFeature {
                    id: feature.id.clone(),
                    mesh,
                    properties: feature.properties.clone(),
                }),
                Err(e) if e.is_layer_local() || matches!(e, GeoError::Projection(_)) => {
                    warn!(
                        feature = index,
                        kind = feature.geometry.kind(),
                        error = %e,
                        "Skipping feature"
                    );
                    layer.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            crs = %document.crs_name(),
            features = layer.features.len(),
            skipped = layer.skipped,
            draped = self.is_draped(),
            "Built layer geometry"
        );

        Ok(layer)
    }
}
