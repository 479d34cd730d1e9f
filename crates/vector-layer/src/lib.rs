//! Vector layers: GeoJSON documents turned into 3D geometry in local scene
//! space.
//!
//! Parsing keeps coordinates in the layer's declared CRS. Building projects
//! every vertex through a [`GeoProjector`](projection::GeoProjector) and,
//! when the layer is draped, attaches elevation from an
//! [`ElevationSampler`](elevation::ElevationSampler).

pub mod builder;
pub mod document;
pub mod triangulate;

pub use builder::{build_vertex, BuiltFeature, FeatureMesh, GeometryBuilder, LayerGeometry};
pub use document::{parse_document, FeatureGeometry, VectorDocument, VectorFeature, VectorSource};
pub use triangulate::triangulate;
