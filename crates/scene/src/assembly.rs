//! Scene assembly.
//!
//! Order of operations:
//! 1. DEM load.
//! 2. All layer documents fetched concurrently, then joined.
//! 3. Each layer's bounds reprojected into the target CRS; failures drop
//!    the layer.
//! 4. Unification over the surviving layers.
//! 5. One projector per layer against the unified bounds, then geometry.
//! 6. Terrain placed through a projector with the same unified target.
//!
//! No projector exists before step 4 completes.

use std::sync::Arc;

use elevation::{load_elevation_grid, ElevationSampler, RasterSource};
use futures::future::join_all;
use geo_common::{normalize_crs_name, Bounds, CrsRegistry, GeoError, GeoResult};
use projection::{reproject_bounds, unify_bounds, GeoProjector, ProjectorTarget};
use terrain_mesh::{generate_terrain, LocalExtent, TerrainMesh};
use tracing::{debug, info, warn};
use vector_layer::{GeometryBuilder, VectorDocument, VectorSource};

use crate::config::{LayerConfig, SceneConfig};
use crate::scene::{LayerFailure, Scene, SceneLayer};

/// Failure id used for the DEM.
pub const DEM_ASSET_ID: &str = "dem";

struct LoadedLayer<'c> {
    render_order: usize,
    config: &'c LayerConfig,
    document: VectorDocument,
    target_bounds: Bounds,
}

fn is_recoverable(error: &GeoError) -> bool {
    error.is_layer_local() || matches!(error, GeoError::UnknownCrs(_) | GeoError::Projection(_))
}

/// Assemble a scene from its configuration.
///
/// Failing layers are excluded and listed in [`Scene::failures`]. A DEM that
/// fails to load leaves the scene without terrain and draped layers flat; one
/// that loads but cannot be placed only loses the terrain mesh. The scene
/// fails as a whole when the configuration is invalid, the target CRS is
/// unknown or no layer survives.
pub async fn assemble_scene(
    config: &SceneConfig,
    rasters: &dyn RasterSource,
    vectors: &dyn VectorSource,
) -> GeoResult<Scene> {
    config.validate().map_err(GeoError::Config)?;
    let registry = Arc::new(config.registry()?);
    let target_crs = normalize_crs_name(&config.target_crs);
    registry.get(&target_crs)?;

    info!(
        target_crs = %target_crs,
        layers = config.layers.len(),
        draped = config.draped_layers().count(),
        dem = config.dem.is_some(),
        "Assembling scene"
    );

    let mut failures = Vec::new();

    let sampler = match &config.dem {
        Some(dem) => {
            match load_elevation_grid(rasters, &registry, &dem.url, dem.fallback_crs.as_deref()).await {
                Ok(grid) => Some(ElevationSampler::new(
                    Arc::new(grid),
                    registry.clone(),
                    dem.sampler.clone(),
                )?),
                Err(e) if is_recoverable(&e) => {
                    warn!(url = %dem.url, error = %e, "DEM unavailable, scene stays flat");
                    failures.push(LayerFailure::new(DEM_ASSET_ID, &e));
                    None
                }
                Err(e) => return Err(e),
            }
        }
        None => None,
    };

    // Barrier: every fetch settles before unification.
    let fetched = join_all(config.layers.iter().map(|layer| async move {
        (layer, vectors.fetch_document(&layer.url).await)
    }))
    .await;

    let mut loaded = Vec::with_capacity(fetched.len());
    for (render_order, (layer, result)) in fetched.into_iter().enumerate() {
        let reprojected = result.and_then(|document| {
            let target_bounds = reproject_bounds(&registry, document.bounds(), &target_crs)?;
            Ok((document, target_bounds))
        });
        match reprojected {
            Ok((document, target_bounds)) => {
                debug!(
                    layer = %layer.id,
                    crs = %document.crs_name(),
                    features = document.features().len(),
                    "Layer loaded"
                );
                loaded.push(LoadedLayer {
                    render_order,
                    config: layer,
                    document,
                    target_bounds,
                });
            }
            Err(e) if is_recoverable(&e) => {
                warn!(layer = %layer.id, url = %layer.url, error = %e, "Excluding layer");
                failures.push(LayerFailure::new(&layer.id, &e));
            }
            Err(e) => return Err(e),
        }
    }

    let layer_bounds: Vec<Bounds> = loaded.iter().map(|l| l.target_bounds.clone()).collect();
    let unified = unify_bounds(&registry, &layer_bounds, &target_crs).map_err(|e| match e {
        GeoError::EmptyInput(_) => GeoError::EmptyInput(format!(
            "none of the {} configured layers could be loaded",
            config.layers.len()
        )),
        other => other,
    })?;

    let mut layers = Vec::with_capacity(loaded.len());
    for layer in loaded {
        let id = layer.config.id.clone();
        match build_scene_layer(&registry, &unified, config.map_width, layer, sampler.as_ref()) {
            Ok(built) => layers.push(built),
            Err(e) if is_recoverable(&e) => {
                warn!(layer = %id, error = %e, "Excluding layer");
                failures.push(LayerFailure::new(id, &e));
            }
            Err(e) => return Err(e),
        }
    }

    let terrain = match &sampler {
        Some(sampler) => match place_terrain(&registry, &unified, config, sampler) {
            Ok(mesh) => Some(mesh),
            Err(e) if is_recoverable(&e) => {
                warn!(error = %e, "Terrain could not be placed, scene stays flat");
                failures.push(LayerFailure::new(DEM_ASSET_ID, &e));
                None
            }
            Err(e) => return Err(e),
        },
        None => None,
    };

    let scene = Scene {
        map_width: config.map_width,
        map_height: config.map_width / unified.ratio(),
        unified_bounds: unified,
        layers,
        terrain,
        failures,
    };

    info!(
        layers = scene.layers.len(),
        failures = scene.failures.len(),
        terrain_triangles = scene.terrain.as_ref().map(|t| t.triangle_count()).unwrap_or(0),
        "Scene assembled"
    );

    Ok(scene)
}

fn build_scene_layer(
    registry: &CrsRegistry,
    unified: &Bounds,
    map_width: f64,
    layer: LoadedLayer<'_>,
    sampler: Option<&ElevationSampler>,
) -> GeoResult<SceneLayer> {
    let projector = GeoProjector::new(
        registry,
        layer.document.bounds().clone(),
        ProjectorTarget::Bounds(unified.clone()),
        map_width,
    )?;

    let drape = if layer.config.drape_on_terrain {
        if sampler.is_none() {
            warn!(layer = %layer.config.id, "Layer asks for draping but no DEM is loaded");
        }
        sampler
    } else {
        None
    };

    let builder = GeometryBuilder::new(&projector, drape)?;
    let geometry = builder.build_layer(&layer.document)?;

    Ok(SceneLayer {
        id: layer.config.id.clone(),
        render_order: layer.render_order,
        color: layer.config.color.clone(),
        source_bounds: layer.document.bounds().clone(),
        draped: builder.is_draped(),
        geometry,
    })
}

/// Generate the terrain and place it in the unified local frame.
fn place_terrain(
    registry: &CrsRegistry,
    unified: &Bounds,
    config: &SceneConfig,
    sampler: &ElevationSampler,
) -> GeoResult<TerrainMesh> {
    let grid = sampler.grid();
    let projector = GeoProjector::new(
        registry,
        grid.bounds().clone(),
        ProjectorTarget::Bounds(unified.clone()),
        config.map_width,
    )?;

    let min = projector.forward_to_local(grid.bounds().min_corner())?;
    let max = projector.forward_to_local(grid.bounds().max_corner())?;
    let extent = LocalExtent::new(min, max);

    debug!(
        min_x = min[0],
        min_y = min[1],
        max_x = max[0],
        max_y = max[1],
        "Placing terrain"
    );

    generate_terrain(grid, sampler.config(), &config.terrain, extent)
}
