//! Coordinate reference system transformations.
//!
//! Point conversion between named CRSs is delegated to proj4rs. On top of it
//! this crate reprojects bounding rectangles, unifies the extents of several
//! layers, and maps target-CRS coordinates onto a local scene plane.

pub mod bounds;
pub mod converter;
pub mod projector;
pub mod unify;

pub use bounds::reproject_bounds;
pub use converter::{convert, CrsConverter};
pub use projector::{GeoProjector, ProjectorTarget};
pub use unify::unify_bounds;
