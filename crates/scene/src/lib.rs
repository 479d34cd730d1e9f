//! Scene assembly.
//!
//! Loads the DEM and every vector layer, unifies layer bounds in the target
//! CRS, projects each layer against the unified frame and places the
//! terrain mesh in the same local space.

pub mod assembly;
pub mod config;
pub mod scene;
pub mod sources;

pub use assembly::assemble_scene;
pub use config::{DemConfig, LayerConfig, SceneConfig};
pub use scene::{LayerFailure, Scene, SceneLayer, SceneSummary};
pub use sources::{InMemorySource, SourceFetcher};
