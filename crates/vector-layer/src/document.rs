//! GeoJSON vector-layer documents.
//!
//! A document is parsed once into [`VectorFeature`]s whose coordinates stay
//! in the layer's declared CRS. Multi-part geometries are split into their
//! single parts so the builder only deals with points, line strings and
//! polygons.

use async_trait::async_trait;
use geojson::{GeoJson, Geometry, Value};
use geo_common::{normalize_crs_name, Bounds, Coord, GeoError, GeoResult};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

/// CRS assumed when a document declares none (RFC 7946).
pub const DEFAULT_VECTOR_CRS: &str = "EPSG:4326";

/// Source of vector-layer documents.
#[async_trait]
pub trait VectorSource: Send + Sync {
    async fn fetch_document(&self, url: &str) -> GeoResult<VectorDocument>;
}

/// Geometry of a single feature in source CRS coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(Coord),
    LineString(Vec<Coord>),
    /// Exterior ring first, then holes.
    Polygon(Vec<Vec<Coord>>),
    /// A geometry kind the builder cannot turn into a mesh.
    Unsupported(String),
}

impl FeatureGeometry {
    pub fn kind(&self) -> &str {
        match self {
            FeatureGeometry::Point(_) => "Point",
            FeatureGeometry::LineString(_) => "LineString",
            FeatureGeometry::Polygon(_) => "Polygon",
            FeatureGeometry::Unsupported(kind) => kind,
        }
    }

    fn for_each_coord(&self, mut f: impl FnMut(Coord)) {
        match self {
            FeatureGeometry::Point(c) => f(*c),
            FeatureGeometry::LineString(coords) => coords.iter().copied().for_each(f),
            FeatureGeometry::Polygon(rings) => rings.iter().flatten().copied().for_each(f),
            FeatureGeometry::Unsupported(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorFeature {
    pub id: Option<String>,
    pub geometry: FeatureGeometry,
    pub properties: Map<String, JsonValue>,
}

/// A parsed vector layer.
#[derive(Debug, Clone)]
pub struct VectorDocument {
    crs_name: String,
    bounds: Bounds,
    features: Vec<VectorFeature>,
}

impl VectorDocument {
    pub fn crs_name(&self) -> &str {
        &self.crs_name
    }

    /// Layer extent in the layer CRS.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn features(&self) -> &[VectorFeature] {
        &self.features
    }
}

/// Parse a GeoJSON document.
///
/// Accepts a FeatureCollection, a single Feature or a bare Geometry. The
/// layer CRS comes from `crs.properties.name`, the extent from `bbox` or,
/// when absent, from every feature coordinate.
pub fn parse_document(bytes: &[u8]) -> GeoResult<VectorDocument> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| GeoError::decode(format!("GeoJSON is not UTF-8: {}", e)))?;
    let geojson = text
        .parse::<GeoJson>()
        .map_err(|e| GeoError::decode(format!("Invalid GeoJSON: {}", e)))?;

    let (raw_features, bbox, foreign) = match geojson {
        GeoJson::FeatureCollection(fc) => (fc.features, fc.bbox, fc.foreign_members),
        GeoJson::Feature(f) => {
            let bbox = f.bbox.clone();
            let foreign = f.foreign_members.clone();
            (vec![f], bbox, foreign)
        }
        GeoJson::Geometry(g) => {
            let bbox = g.bbox.clone();
            let foreign = g.foreign_members.clone();
            let feature = geojson::Feature {
                bbox: None,
                geometry: Some(g),
                id: None,
                properties: None,
                foreign_members: None,
            };
            (vec![feature], bbox, foreign)
        }
    };

    let crs_name = foreign
        .as_ref()
        .and_then(crs_from_members)
        .unwrap_or_else(|| DEFAULT_VECTOR_CRS.to_string());

    let mut features = Vec::new();
    for feature in raw_features {
        let Some(geometry) = feature.geometry else {
            debug!("Skipping feature without geometry");
            continue;
        };
        let id = feature.id.map(|id| match id {
            geojson::feature::Id::String(s) => s,
            geojson::feature::Id::Number(n) => n.to_string(),
        });
        let properties = feature.properties.unwrap_or_default();
        for part in split_geometry(&geometry)? {
            features.push(VectorFeature {
                id: id.clone(),
                geometry: part,
                properties: properties.clone(),
            });
        }
    }

    let bounds = match bbox {
        Some(bbox) => bounds_from_bbox(&crs_name, &bbox)?,
        None => computed_bounds(&crs_name, &features)?,
    };

    debug!(
        crs = %crs_name,
        features = features.len(),
        "Parsed GeoJSON document"
    );

    Ok(VectorDocument {
        crs_name,
        bounds,
        features,
    })
}

/// Read `crs.properties.name` from the top-level foreign members.
fn crs_from_members(members: &Map<String, JsonValue>) -> Option<String> {
    members
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
        .map(normalize_crs_name)
}

fn coord(position: &[f64]) -> GeoResult<Coord> {
    match position {
        [x, y, ..] => Ok([*x, *y]),
        _ => Err(GeoError::decode(format!(
            "GeoJSON position needs 2 values, got {}",
            position.len()
        ))),
    }
}

fn coords(positions: &[Vec<f64>]) -> GeoResult<Vec<Coord>> {
    positions.iter().map(|p| coord(p)).collect()
}

fn rings(polygon: &[Vec<Vec<f64>>]) -> GeoResult<Vec<Vec<Coord>>> {
    polygon.iter().map(|ring| coords(ring)).collect()
}

fn split_geometry(geometry: &Geometry) -> GeoResult<Vec<FeatureGeometry>> {
    let parts = match &geometry.value {
        Value::Point(p) => vec![FeatureGeometry::Point(coord(p)?)],
        Value::MultiPoint(points) => points
            .iter()
            .map(|p| coord(p).map(FeatureGeometry::Point))
            .collect::<GeoResult<_>>()?,
        Value::LineString(line) => vec![FeatureGeometry::LineString(coords(line)?)],
        Value::MultiLineString(lines) => lines
            .iter()
            .map(|l| coords(l).map(FeatureGeometry::LineString))
            .collect::<GeoResult<_>>()?,
        Value::Polygon(polygon) => vec![FeatureGeometry::Polygon(rings(polygon)?)],
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .map(|p| rings(p).map(FeatureGeometry::Polygon))
            .collect::<GeoResult<_>>()?,
        Value::GeometryCollection(_) => {
            vec![FeatureGeometry::Unsupported("GeometryCollection".to_string())]
        }
    };
    Ok(parts)
}

fn bounds_from_bbox(crs_name: &str, bbox: &[f64]) -> GeoResult<Bounds> {
    let extent = match bbox.len() {
        4 => [bbox[0], bbox[1], bbox[2], bbox[3]],
        6 => [bbox[0], bbox[1], bbox[3], bbox[4]],
        n => {
            return Err(GeoError::decode(format!(
                "GeoJSON bbox needs 4 or 6 values, got {}",
                n
            )))
        }
    };
    Bounds::from_extent(crs_name, extent)
}

fn computed_bounds(crs_name: &str, features: &[VectorFeature]) -> GeoResult<Bounds> {
    let mut extent: Option<[f64; 4]> = None;
    for feature in features {
        feature.geometry.for_each_coord(|[x, y]| {
            extent = Some(match extent {
                None => [x, y, x, y],
                Some([x0, y0, x1, y1]) => [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
            });
        });
    }

    match extent {
        Some(extent) => Bounds::from_extent(crs_name, extent),
        None => Err(GeoError::invalid_bounds(
            crs_name,
            "layer has no coordinates to derive a bbox from",
        )),
    }
}
