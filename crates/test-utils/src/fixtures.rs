//! Common fixtures: extents and GeoJSON layer documents.

/// Extents as `[min_x, min_y, max_x, max_y]`.
pub mod extent {
    /// Small area around Stuttgart in EPSG:4326 degrees.
    pub const STUTTGART_WGS84: [f64; 4] = [9.10, 48.70, 9.25, 48.82];

    /// 2 km x 2 km UTM 32N (EPSG:25832) tile.
    pub const UTM_TILE: [f64; 4] = [500_000.0, 5_400_000.0, 502_000.0, 5_402_000.0];

    /// Unit-free square used by alignment scenarios.
    pub const SQUARE_10: [f64; 4] = [0.0, 0.0, 10.0, 10.0];

    /// Overlaps `SQUARE_10` on `[5, 10] x [5, 10]`.
    pub const SQUARE_5_20: [f64; 4] = [5.0, 5.0, 20.0, 20.0];

    /// min > max on both axes.
    pub const INVALID: [f64; 4] = [10.0, 10.0, 5.0, 5.0];
}

/// GeoJSON documents.
pub mod geojson {
    /// `crs` member naming the given CRS.
    pub fn crs_member(name: &str) -> String {
        format!(r#""crs":{{"type":"name","properties":{{"name":"{}"}}}}"#, name)
    }

    /// A FeatureCollection with an optional CRS and bbox.
    pub fn feature_collection(crs: Option<&str>, bbox: Option<[f64; 4]>, features: &[String]) -> String {
        let mut members = vec![r#""type":"FeatureCollection""#.to_string()];
        if let Some(crs) = crs {
            members.push(crs_member(crs));
        }
        if let Some(b) = bbox {
            members.push(format!(r#""bbox":[{},{},{},{}]"#, b[0], b[1], b[2], b[3]));
        }
        members.push(format!(r#""features":[{}]"#, features.join(",")));
        format!("{{{}}}", members.join(","))
    }

    /// A feature wrapping `geometry` with a `name` property.
    pub fn feature(name: &str, geometry: &str) -> String {
        format!(
            r#"{{"type":"Feature","properties":{{"name":"{}"}},"geometry":{}}}"#,
            name, geometry
        )
    }

    /// Closed square ring polygon with corners `(x0, y0)` and `(x1, y1)`.
    pub fn square_polygon(x0: f64, y0: f64, x1: f64, y1: f64) -> String {
        format!(
            r#"{{"type":"Polygon","coordinates":[[[{x0},{y0}],[{x0},{y1}],[{x1},{y1}],[{x1},{y0}],[{x0},{y0}]]]}}"#
        )
    }

    /// 10 x 10 square with a 2 x 2 hole in the middle.
    pub const POLYGON_WITH_HOLE: &str = r#"{"type":"Polygon","coordinates":[
        [[0,0],[10,0],[10,10],[0,10],[0,0]],
        [[4,4],[4,6],[6,6],[6,4],[4,4]]
    ]}"#;

    /// One geometry of every kind, in local metres.
    pub fn mixed_layer(crs: &str) -> String {
        feature_collection(
            Some(crs),
            Some([0.0, 0.0, 100.0, 100.0]),
            &[
                feature("tower", r#"{"type":"Point","coordinates":[50,50]}"#),
                feature(
                    "wells",
                    r#"{"type":"MultiPoint","coordinates":[[10,10],[20,20]]}"#,
                ),
                feature(
                    "contours",
                    r#"{"type":"MultiLineString","coordinates":[[[0,0],[100,100]],[[0,100],[100,0]]]}"#,
                ),
                feature(
                    "buildings",
                    r#"{"type":"MultiPolygon","coordinates":[
                        [[[0,0],[10,0],[10,10],[0,10],[0,0]]],
                        [[[20,20],[30,20],[30,30],[20,30],[20,20]]]
                    ]}"#,
                ),
                feature(
                    "misc",
                    r#"{"type":"GeometryCollection","geometries":[{"type":"Point","coordinates":[1,1]}]}"#,
                ),
            ],
        )
    }
}
