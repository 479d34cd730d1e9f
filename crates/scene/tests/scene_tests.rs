//! End-to-end scene assembly over in-memory sources.

use geo_common::GeoError;
use scene::{assemble_scene, InMemorySource, LayerConfig, SceneConfig};
use terrain_mesh::TerrainConfig;
use test_utils::fixtures::geojson as fx;
use test_utils::{assert_approx_eq, create_constant_grid, encode_dem_for_extent};
use vector_layer::FeatureMesh;

fn layer(id: &str, url: &str, drape: bool) -> LayerConfig {
    LayerConfig {
        id: id.to_string(),
        url: url.to_string(),
        drape_on_terrain: drape,
        color: None,
    }
}

fn point_layer(extent: [f64; 4], point: [f64; 2]) -> String {
    fx::feature_collection(
        Some("EPSG:25832"),
        Some(extent),
        &[fx::feature(
            "p",
            &format!(r#"{{"type":"Point","coordinates":[{},{}]}}"#, point[0], point[1]),
        )],
    )
}

fn first_point(mesh: &FeatureMesh) -> [f64; 3] {
    match mesh {
        FeatureMesh::Point { position } => *position,
        other => panic!("expected point, got {:?}", other),
    }
}

fn two_layer_source() -> InMemorySource {
    InMemorySource::new()
        .with("a.geojson", point_layer([0.0, 0.0, 10.0, 10.0], [5.0, 5.0]))
        .with("b.geojson", point_layer([5.0, 5.0, 20.0, 20.0], [5.0, 5.0]))
}

fn two_layer_config() -> SceneConfig {
    SceneConfig {
        layers: vec![layer("a", "a.geojson", true), layer("b", "b.geojson", false)],
        terrain: TerrainConfig {
            width_segments: 10,
            ..Default::default()
        },
        ..Default::default()
    }
}

// ============================================================================
// Alignment
// ============================================================================

#[tokio::test]
async fn test_overlapping_layers_share_local_frame() {
    let source = two_layer_source();
    let scene = assemble_scene(&two_layer_config(), &source, &source).await.unwrap();

    assert_eq!(scene.unified_bounds.extent(), [0.0, 0.0, 20.0, 20.0]);
    assert_eq!(scene.map_height, 1000.0);
    assert!(scene.failures.is_empty());
    assert!(scene.terrain.is_none());

    let a = first_point(&scene.layers[0].geometry.features[0].mesh);
    let b = first_point(&scene.layers[1].geometry.features[0].mesh);
    assert_eq!(a, b);
    assert_eq!(a, [250.0, 250.0, 0.0]);

    assert_eq!(scene.layers[0].render_order, 0);
    assert_eq!(scene.layers[1].render_order, 1);
}

#[tokio::test]
async fn test_terrain_and_draped_layer_align() {
    let dem = encode_dem_for_extent(5, 5, &create_constant_grid(5, 5, 7.0), [0.0, 0.0, 20.0, 20.0], 25832);
    let source = two_layer_source().with("dem.tif", dem);
    let mut config = two_layer_config();
    config.dem = Some(scene::DemConfig {
        url: "dem.tif".to_string(),
        fallback_crs: None,
        sampler: Default::default(),
    });

    let scene = assemble_scene(&config, &source, &source).await.unwrap();

    let terrain = scene.terrain.as_ref().unwrap();
    assert_eq!(terrain.vertex_count(), 11 * 11);
    assert_approx_eq!(terrain.planar_area(), 1000.0 * 1000.0, 1e-2);
    assert_eq!(terrain.height_range(), Some((7.0, 7.0)));

    // Draped layer sits on the terrain, the other stays flat.
    assert!(scene.layers[0].draped);
    assert_eq!(first_point(&scene.layers[0].geometry.features[0].mesh)[2], 7.0);
    assert!(!scene.layers[1].draped);
    assert_eq!(first_point(&scene.layers[1].geometry.features[0].mesh)[2], 0.0);
}

#[tokio::test]
async fn test_center_offset_and_summary() {
    let source = two_layer_source();
    let scene = assemble_scene(&two_layer_config(), &source, &source).await.unwrap();

    // Only content is the shared point at (250, 250).
    assert_eq!(scene.center_offset(), [-250.0, -250.0, 0.0]);

    let summary = serde_json::to_value(scene.summary()).unwrap();
    assert_eq!(summary["target_crs"], "EPSG:25832");
    assert_eq!(summary["layers"][1]["id"], "b");
    assert_eq!(summary["layers"][0]["vertices"], 1);
    assert!(summary["terrain"].is_null());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_failed_layer_is_excluded_from_unification() {
    let source = two_layer_source();
    let mut config = two_layer_config();
    config.layers.push(layer("missing", "missing.geojson", false));

    let scene = assemble_scene(&config, &source, &source).await.unwrap();

    assert_eq!(scene.layers.len(), 2);
    assert_eq!(scene.failures.len(), 1);
    assert_eq!(scene.failures[0].id, "missing");
    assert_eq!(scene.failures[0].code, "Fetch");
    assert_eq!(scene.unified_bounds.extent(), [0.0, 0.0, 20.0, 20.0]);
}

#[tokio::test]
async fn test_unknown_layer_crs_is_excluded() {
    let odd = fx::feature_collection(
        Some("EPSG:99999"),
        Some([0.0, 0.0, 1000.0, 1000.0]),
        &[fx::feature("x", &fx::square_polygon(0.0, 0.0, 1.0, 1.0))],
    );
    let source = two_layer_source().with("odd.geojson", odd);
    let mut config = two_layer_config();
    config.layers.insert(0, layer("odd", "odd.geojson", false));

    let scene = assemble_scene(&config, &source, &source).await.unwrap();

    assert_eq!(scene.failures[0].code, "UnknownCrs");
    assert_eq!(scene.unified_bounds.extent(), [0.0, 0.0, 20.0, 20.0]);
    // Render order counts configured layers, including the dropped one.
    assert_eq!(scene.layers[0].id, "a");
    assert_eq!(scene.layers[0].render_order, 1);
}

#[tokio::test]
async fn test_no_surviving_layer_is_empty_input() {
    let source = InMemorySource::new();
    let config = SceneConfig {
        layers: vec![layer("a", "a.geojson", false)],
        ..Default::default()
    };
    let err = assemble_scene(&config, &source, &source).await.unwrap_err();
    assert!(matches!(err, GeoError::EmptyInput(_)));
}

#[tokio::test]
async fn test_missing_dem_leaves_scene_flat() {
    let source = two_layer_source();
    let mut config = two_layer_config();
    config.dem = Some(scene::DemConfig {
        url: "absent.tif".to_string(),
        fallback_crs: None,
        sampler: Default::default(),
    });

    let scene = assemble_scene(&config, &source, &source).await.unwrap();
    assert!(scene.terrain.is_none());
    assert_eq!(scene.failures[0].id, "dem");
    assert_eq!(first_point(&scene.layers[0].geometry.features[0].mesh)[2], 0.0);
}

#[tokio::test]
async fn test_unplaceable_dem_leaves_scene_flat() {
    // Loads fine, but its northern edge lies past the pole and has no
    // Mercator position.
    let dem = encode_dem_for_extent(3, 3, &create_constant_grid(3, 3, 5.0), [0.0, 80.0, 10.0, 100.0], 4326);
    let layer_doc = fx::feature_collection(
        Some("EPSG:3857"),
        Some([0.0, 0.0, 1000.0, 1000.0]),
        &[fx::feature("p", r#"{"type":"Point","coordinates":[500,500]}"#)],
    );
    let source = InMemorySource::new()
        .with("dem.tif", dem)
        .with("a.geojson", layer_doc);
    let config = SceneConfig {
        target_crs: "EPSG:3857".to_string(),
        dem: Some(scene::DemConfig {
            url: "dem.tif".to_string(),
            fallback_crs: None,
            sampler: Default::default(),
        }),
        layers: vec![layer("a", "a.geojson", false)],
        ..Default::default()
    };

    let scene = assemble_scene(&config, &source, &source).await.unwrap();

    assert!(scene.terrain.is_none());
    assert_eq!(scene.failures.len(), 1);
    assert_eq!(scene.failures[0].id, "dem");
    assert_eq!(scene.failures[0].code, "Projection");
    assert_eq!(
        first_point(&scene.layers[0].geometry.features[0].mesh),
        [500.0, 500.0, 0.0]
    );
}

#[tokio::test]
async fn test_unknown_target_crs_is_fatal() {
    let source = two_layer_source();
    let config = SceneConfig {
        target_crs: "EPSG:1".to_string(),
        ..two_layer_config()
    };
    let err = assemble_scene(&config, &source, &source).await.unwrap_err();
    assert!(matches!(err, GeoError::UnknownCrs(_)));
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_yaml_config_assembles() {
    let yaml = r##"
target_crs: epsg:25832
map_width: 500
terrain:
  mode: adaptive
  grid_size: 9
  max_error: 0.5
layers:
  - id: a
    url: a.geojson
    color: "#3366ff"
  - id: b
    url: b.geojson
"##;
    let config: SceneConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.layers[0].color.as_deref(), Some("#3366ff"));
    assert!(!config.layers[1].drape_on_terrain);

    let source = two_layer_source();
    let scene = assemble_scene(&config, &source, &source).await.unwrap();
    assert_eq!(scene.unified_bounds.crs_name(), "EPSG:25832");
    assert_eq!(
        first_point(&scene.layers[1].geometry.features[0].mesh),
        [125.0, 125.0, 0.0]
    );
}
