//! Tests for bounds reprojection, local projection and layer unification.

use geo_common::{Bounds, CrsRegistry, GeoError};
use projection::{reproject_bounds, unify_bounds, CrsConverter, GeoProjector, ProjectorTarget};
use test_utils::{assert_approx_eq, assert_coords_approx_eq};

fn relative_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

// ============================================================================
// Bounds round trip
// ============================================================================

#[test]
fn test_bounds_round_trip_wgs84_utm32() {
    let registry = CrsRegistry::with_defaults();
    let original = Bounds::from_extent("EPSG:4326", [6.9, 51.3, 7.3, 51.6]).unwrap();

    let utm = reproject_bounds(&registry, &original, "EPSG:25832").unwrap();
    let back = reproject_bounds(&registry, &utm, "EPSG:4326").unwrap();

    for (a, b) in original.extent().iter().zip(back.extent().iter()) {
        assert!(relative_eq(*a, *b), "{} vs {}", a, b);
    }
}

#[test]
fn test_bounds_round_trip_wgs84_mercator() {
    let registry = CrsRegistry::with_defaults();
    let original = Bounds::from_extent("EPSG:4326", [-10.0, 35.0, 30.0, 60.0]).unwrap();

    let merc = reproject_bounds(&registry, &original, "EPSG:3857").unwrap();
    let back = reproject_bounds(&registry, &merc, "EPSG:4326").unwrap();

    for (a, b) in original.extent().iter().zip(back.extent().iter()) {
        assert!(relative_eq(*a, *b), "{} vs {}", a, b);
    }
}

#[test]
fn test_reproject_unknown_target() {
    let registry = CrsRegistry::with_defaults();
    let b = Bounds::from_extent("EPSG:4326", [6.0, 51.0, 7.0, 52.0]).unwrap();
    let result = reproject_bounds(&registry, &b, "EPSG:31467");
    assert!(matches!(result, Err(GeoError::UnknownCrs(_))));
}

#[test]
fn test_custom_registered_crs() {
    let mut registry = CrsRegistry::new();
    registry
        .register("EPSG:4326", "+proj=longlat +datum=WGS84 +no_defs")
        .unwrap();
    registry
        .register(
            "EPSG:31467",
            "+proj=tmerc +lat_0=0 +lon_0=9 +k=1 +x_0=3500000 +y_0=0 +ellps=bessel +units=m +no_defs",
        )
        .unwrap();

    let conv = CrsConverter::new(&registry, "EPSG:4326", "EPSG:31467").unwrap();
    let out = conv.forward([9.0, 50.0]).unwrap();
    assert_approx_eq!(out[0], 3_500_000.0, 1e-3);
}

// ============================================================================
// Geo projector
// ============================================================================

#[test]
fn test_inside_points_map_into_plane_same_crs() {
    let registry = CrsRegistry::with_defaults();
    let source = Bounds::from_extent("EPSG:25832", [350000.0, 5640000.0, 352000.0, 5641000.0]).unwrap();
    let projector = GeoProjector::new(
        &registry,
        source.clone(),
        ProjectorTarget::Crs("EPSG:25832".into()),
        1000.0,
    )
    .unwrap();

    assert_approx_eq!(projector.map_height(), 500.0, 1e-9);

    for i in 1..10 {
        for j in 1..10 {
            let c = [
                source.x().min + source.x_range() * i as f64 / 10.0,
                source.y().min + source.y_range() * j as f64 / 10.0,
            ];
            let local = projector.forward_to_local(c).unwrap();
            assert!(local[0] >= 0.0 && local[0] <= projector.map_width());
            assert!(local[1] >= 0.0 && local[1] <= projector.map_height());
        }
    }
}

#[test]
fn test_inside_points_map_into_plane_geographic_source() {
    let registry = CrsRegistry::with_defaults();
    let source = Bounds::from_extent("EPSG:4326", [5.0, 47.0, 15.0, 55.0]).unwrap();
    let projector = GeoProjector::new(
        &registry,
        source,
        ProjectorTarget::Crs("EPSG:3857".into()),
        1000.0,
    )
    .unwrap();

    for lon in [5.5, 8.0, 10.0, 14.9] {
        for lat in [47.1, 50.0, 54.9] {
            let local = projector.forward_to_local([lon, lat]).unwrap();
            assert!(local[0] >= 0.0 && local[0] <= projector.map_width());
            assert!(local[1] >= 0.0 && local[1] <= projector.map_height());
        }
    }
}

#[test]
fn test_local_to_source_inverts_forward() {
    let registry = CrsRegistry::with_defaults();
    let source = Bounds::from_extent("EPSG:4326", [6.9, 51.3, 7.3, 51.6]).unwrap();
    let projector = GeoProjector::new(
        &registry,
        source,
        ProjectorTarget::Crs("EPSG:25832".into()),
        1000.0,
    )
    .unwrap();

    let local = projector.forward_to_local([7.0, 51.45]).unwrap();
    let back = projector.local_to_source(local).unwrap();
    assert_coords_approx_eq!((back[0], back[1]), (7.0, 51.45), 1e-7);
}

// ============================================================================
// Unification
// ============================================================================

#[test]
fn test_unify_two_overlapping_layers() {
    let registry = CrsRegistry::with_defaults();
    let a = Bounds::from_extent("EPSG:25832", [0.0, 0.0, 10.0, 10.0]).unwrap();
    let b = Bounds::from_extent("EPSG:25832", [5.0, 5.0, 20.0, 20.0]).unwrap();

    let unified = unify_bounds(&registry, &[a.clone(), b.clone()], "EPSG:25832").unwrap();
    assert_eq!(unified.extent(), [0.0, 0.0, 20.0, 20.0]);

    let pa = GeoProjector::new(&registry, a, ProjectorTarget::Bounds(unified.clone()), 1000.0).unwrap();
    let pb = GeoProjector::new(&registry, b, ProjectorTarget::Bounds(unified), 1000.0).unwrap();

    let la = pa.forward_to_local([5.0, 5.0]).unwrap();
    let lb = pb.forward_to_local([5.0, 5.0]).unwrap();
    assert_eq!(la, lb);
    assert_eq!(la, [250.0, 250.0]);
}

#[test]
fn test_unified_contains_every_layer() {
    let registry = CrsRegistry::with_defaults();
    let layers = vec![
        Bounds::from_extent("EPSG:4326", [6.9, 51.3, 7.1, 51.5]).unwrap(),
        Bounds::from_extent("EPSG:4326", [7.0, 51.4, 7.3, 51.6]).unwrap(),
        Bounds::from_extent("EPSG:25832", [350000.0, 5690000.0, 360000.0, 5700000.0]).unwrap(),
    ];

    let unified = unify_bounds(&registry, &layers, "EPSG:25832").unwrap();
    for layer in &layers {
        let r = reproject_bounds(&registry, layer, "EPSG:25832").unwrap();
        assert!(unified.x().min <= r.x().min);
        assert!(unified.x().max >= r.x().max);
        assert!(unified.y().min <= r.y().min);
        assert!(unified.y().max >= r.y().max);
    }
}

#[test]
fn test_unify_fails_on_unknown_layer_crs() {
    let registry = CrsRegistry::with_defaults();
    let layers = vec![Bounds::from_extent("EPSG:1234", [0.0, 0.0, 1.0, 1.0]).unwrap()];
    let result = unify_bounds(&registry, &layers, "EPSG:25832");
    assert!(matches!(result, Err(GeoError::UnknownCrs(_))));
}
