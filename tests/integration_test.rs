use geojson::{FeatureCollection, Value};
use trip_geo_wasm::converter::to_feature_collection;
use trip_geo_wasm::location::Location;
use trip_geo_wasm::map_path::MapPathBuilder;
use trip_geo_wasm::options::{ConvertOptions, ElementType, Units};
use trip_geo_wasm::parser::parse_gpx;
use trip_geo_wasm::statistics::path_statistics;

fn load_fixture(path: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{path}")).unwrap()
}

fn convert(gpx: &str) -> FeatureCollection {
    let data = parse_gpx(gpx).unwrap();
    to_feature_collection(&data, &ConvertOptions::default())
}

fn convert_with_opts(gpx: &str, opts: &ConvertOptions) -> FeatureCollection {
    let data = parse_gpx(gpx).unwrap();
    to_feature_collection(&data, opts)
}

fn assert_close(actual: &serde_json::Value, expected: f64) {
    let actual = actual
        .as_f64()
        .unwrap_or_else(|| panic!("Expected a number, got {actual}"));
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {expected}, got {actual}"
    );
}

// ---- basic/ ----

#[test]
fn test_01_waypoint() {
    let fc = convert(&load_fixture("basic/01_waypoint.gpx"));
    assert_eq!(fc.features.len(), 1);

    let f = &fc.features[0];
    let geom = f.geometry.as_ref().unwrap();
    if let Value::Point(coords) = &geom.value {
        assert_eq!(coords, &vec![-1.5, 51.25, 123.5]);
    } else {
        panic!("Expected Point");
    }

    let props = f.properties.as_ref().unwrap();
    assert_eq!(props["gpxType"], "waypoint");
    assert_eq!(props["name"], "Trailhead");
    assert_eq!(props["time"], "2024-05-04T09:30:00Z");
    assert!(!props.contains_key("distance"));
}

#[test]
fn test_02_route_statistics() {
    let fc = convert(&load_fixture("basic/02_route.gpx"));
    assert_eq!(fc.features.len(), 1);

    let f = &fc.features[0];
    let props = f.properties.as_ref().unwrap();
    assert_eq!(props["gpxType"], "route");
    assert_eq!(props["name"], "Kansas City to St Louis");
    assert_eq!(props["desc"], "Along the Missouri");
    assert_eq!(props["type"], "driving");
    assert_eq!(props["units"], "metric");
    assert_close(&props["distance"], 382.900050);
    assert_close(&props["descent"], 128.0);
    assert_close(&props["lowest"], 142.0);
    assert_close(&props["highest"], 270.0);
    // Downhill only
    assert!(!props.contains_key("ascent"));

    let geom = f.geometry.as_ref().unwrap();
    if let Value::LineString(coords) = &geom.value {
        assert_eq!(coords.len(), 2);
        assert_eq!(coords[0], vec![-94.581213, 39.099912, 270.0]);
    } else {
        panic!("Expected LineString");
    }
}

#[test]
fn test_02_route_imperial() {
    let opts = ConvertOptions {
        units: Units::Imperial,
        ..Default::default()
    };
    let fc = convert_with_opts(&load_fixture("basic/02_route.gpx"), &opts);

    let props = fc.features[0].properties.as_ref().unwrap();
    assert_eq!(props["units"], "imperial");
    assert_close(&props["distance"], 237.923061);
    assert_close(&props["descent"], 419.947507);
}

#[test]
fn test_03_track_segment() {
    let fc = convert(&load_fixture("basic/03_track.gpx"));
    assert_eq!(fc.features.len(), 1);

    let props = fc.features[0].properties.as_ref().unwrap();
    assert_eq!(props["gpxType"], "track");
    assert_eq!(props["name"], "Ridge walk");
    assert_eq!(props["type"], "hiking");
    assert_eq!(props["segment"], 0);
    assert_close(&props["distance"], 16.679239);
    assert_close(&props["ascent"], 70.0);
    assert_close(&props["descent"], 10.0);
    assert_close(&props["lowest"], 100.0);
    assert_close(&props["highest"], 160.0);
    // Timing figures belong to the whole track
    assert!(!props.contains_key("averageSpeed"));

    let coord_props = props["coordinateProperties"].as_object().unwrap();
    let hdops = coord_props["hdops"].as_array().unwrap();
    assert_eq!(hdops.len(), 4);
    assert_close(&hdops[0], 1.5);
    assert!(hdops[1..].iter().all(|h| h.is_null()));

    let speeds = coord_props["speeds"].as_array().unwrap();
    assert!(speeds[0].is_null());
    for speed in &speeds[1..] {
        assert_close(speed, 22.238985);
    }
    assert_eq!(coord_props["times"][3], "2024-05-04T09:45:00Z");
}

#[test]
fn test_03_track_joined_motion() {
    let opts = ConvertOptions {
        join_track_segments: true,
        ..Default::default()
    };
    let fc = convert_with_opts(&load_fixture("basic/03_track.gpx"), &opts);
    assert_eq!(fc.features.len(), 1);

    let props = fc.features[0].properties.as_ref().unwrap();
    assert!(!props.contains_key("segment"));
    assert_close(&props["maximumSpeed"], 22.238985);
    assert_close(&props["averageSpeed"], 22.238985);
    assert_eq!(props["startTime"], "2024-05-04T09:00:00Z");
    assert_eq!(props["finishTime"], "2024-05-04T09:45:00Z");
}

#[test]
fn test_03_track_points() {
    let mut data = parse_gpx(&load_fixture("basic/03_track.gpx")).unwrap();
    let track = &mut data.tracks[0];
    assert_eq!(track.segments[0].points[0].hdop, Some(1.5));

    track.calculate_speed_and_bearing_values();
    let points = &track.segments[0].points;
    assert!(points[0].speed.is_none());
    assert!(points[0].bearing.is_none());
    for point in &points[1..] {
        assert!((point.speed.unwrap() - 22.238985).abs() < 1e-5);
        // Due north along the meridian
        assert!(point.bearing.unwrap().abs() < 1e-9);
    }

    let span = data.time_span().unwrap();
    assert_eq!(span.duration().num_minutes(), 45);
}

// ---- tracks/ ----

#[test]
fn test_04_multi_segment_separate() {
    let fc = convert(&load_fixture("tracks/04_multi_segment.gpx"));
    // The empty segment is dropped
    assert_eq!(fc.features.len(), 2);

    let first = fc.features[0].properties.as_ref().unwrap();
    assert_eq!(first["segment"], 0);
    assert_close(&first["distance"], 27.798732);
    assert_close(&first["ascent"], 10.0);
    assert!(!first.contains_key("descent"));

    let second = fc.features[1].properties.as_ref().unwrap();
    assert_eq!(second["segment"], 1);
    assert_close(&second["distance"], 27.798732);
    assert_close(&second["descent"], 10.0);
    assert!(!second.contains_key("ascent"));
}

#[test]
fn test_04_multi_segment_joined_totals() {
    let opts = ConvertOptions {
        join_track_segments: true,
        ..Default::default()
    };
    let fc = convert_with_opts(&load_fixture("tracks/04_multi_segment.gpx"), &opts);
    assert_eq!(fc.features.len(), 1);

    let f = &fc.features[0];
    let geom = f.geometry.as_ref().unwrap();
    if let Value::MultiLineString(lines) = &geom.value {
        assert_eq!(lines.len(), 2);
    } else {
        panic!("Expected MultiLineString");
    }

    // Totals include the gap between the segments
    let props = f.properties.as_ref().unwrap();
    assert_close(&props["distance"], 83.396195);
    assert_close(&props["ascent"], 10.0);
    assert_close(&props["descent"], 15.0);
    assert_close(&props["lowest"], 25.0);
    assert_close(&props["highest"], 40.0);
    assert_close(&props["maximumSpeed"], 55.597463);
    assert_close(&props["averageSpeed"], 41.698097);
}

// ---- antimeridian/ ----

#[test]
fn test_05_pacific_crossing() {
    let fc = convert(&load_fixture("antimeridian/05_pacific_crossing.gpx"));
    assert_eq!(fc.features.len(), 1);

    let f = &fc.features[0];
    let geom = f.geometry.as_ref().unwrap();
    if let Value::MultiLineString(lines) = &geom.value {
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].last().unwrap(), &vec![180.0, -17.0, 20.0]);
        assert_eq!(lines[1].first().unwrap(), &vec![-180.0, -17.0, 20.0]);
    } else {
        panic!("Expected MultiLineString");
    }

    // Measured over the recorded points, not the cut
    let props = f.properties.as_ref().unwrap();
    assert_close(&props["distance"], 230.106414);
}

#[test]
fn test_06_double_crossing_bbox() {
    let fc = convert(&load_fixture("antimeridian/06_double_crossing.gpx"));
    assert_eq!(fc.bbox, Some(vec![-170.0, 10.0, 170.0, 20.0]));

    let center = &fc.foreign_members.as_ref().unwrap()["center"];
    assert_eq!(center, &serde_json::json!([0.0, 15.0]));
}

// ---- edge_cases/ ----

#[test]
fn test_07_empty() {
    let data = parse_gpx(&load_fixture("edge_cases/07_empty.gpx")).unwrap();
    assert_eq!(data.tracks.len(), 1);
    assert!(data.tracks[0].segments.is_empty());

    let fc = to_feature_collection(&data, &ConvertOptions::default());
    assert!(fc.features.is_empty());
    assert!(fc.bbox.is_none());
    assert!(fc.foreign_members.is_none());
}

#[test]
fn test_08_invalid_points_skipped() {
    let fc = convert(&load_fixture("edge_cases/08_invalid_points.gpx"));
    assert_eq!(fc.features.len(), 1);

    let f = &fc.features[0];
    let props = f.properties.as_ref().unwrap();
    assert_eq!(props["name"], "Valid");
    assert!(!props.contains_key("ele"));
    assert!(!props.contains_key("time"));

    let geom = f.geometry.as_ref().unwrap();
    if let Value::Point(coords) = &geom.value {
        assert_eq!(coords, &vec![2.25, 48.75]);
    } else {
        panic!("Expected Point");
    }
}

#[test]
fn test_09_mixed_elevation_statistics() {
    let fc = convert(&load_fixture("edge_cases/09_mixed_elevation.gpx"));

    let props = fc.features[0].properties.as_ref().unwrap();
    assert_close(&props["distance"], 111.194927);
    // Measured from the last point that had an altitude
    assert_close(&props["descent"], 50.0);
    assert!(!props.contains_key("ascent"));
}

#[test]
fn test_09_mixed_elevation_padded_path() {
    let data = parse_gpx(&load_fixture("edge_cases/09_mixed_elevation.gpx")).unwrap();
    let mut builder = MapPathBuilder::new();
    builder.add_path(&data.routes[0].points);

    assert_eq!(
        builder.as_geojson(),
        serde_json::json!({
            "type": "LineString",
            "coordinates": [[2.0, 45.0, 500.0], [2.0, 45.5, null], [2.0, 46.0, 450.0]]
        })
    );
    assert_eq!(builder.min_height(), Some(450.0));
    assert_eq!(builder.max_height(), Some(500.0));
}

#[test]
fn test_malformed_xml() {
    let result = parse_gpx("<gpx><trk><name>Broken</trk></gpx>");
    assert!(result.is_err());
}

// ---- options ----

#[test]
fn test_no_elevation() {
    let opts = ConvertOptions {
        include_elevation: false,
        ..Default::default()
    };
    let fc = convert_with_opts(&load_fixture("basic/03_track.gpx"), &opts);

    let geom = fc.features[0].geometry.as_ref().unwrap();
    if let Value::LineString(coords) = &geom.value {
        assert!(coords.iter().all(|c| c.len() == 2));
    } else {
        panic!("Expected LineString");
    }
    // Statistics still use the recorded altitudes
    let props = fc.features[0].properties.as_ref().unwrap();
    assert_close(&props["ascent"], 70.0);
}

#[test]
fn test_type_filter() {
    let gpx = format!(
        "<gpx>{}{}</gpx>",
        r#"<wpt lat="1.0" lon="1.0"/>"#,
        r#"<rte><rtept lat="1.0" lon="1.0"/><rtept lat="2.0" lon="2.0"/></rte>"#
    );
    let opts = ConvertOptions {
        types: Some(vec![ElementType::Route]),
        ..Default::default()
    };
    let fc = convert_with_opts(&gpx, &opts);
    assert_eq!(fc.features.len(), 1);
    assert_eq!(
        fc.features[0].properties.as_ref().unwrap()["gpxType"],
        "route"
    );
}

// ---- paths ----

#[test]
fn test_path_statistics_from_locations() {
    let points = vec![
        Location::with_altitude(0.0, 0.0, 10.0),
        Location::new(0.0, 1.0),
        Location::with_altitude(0.0, 2.0, 30.0),
    ];
    let stats = path_statistics(&points);
    assert!((stats.distance.unwrap() - 222.389853).abs() < 1e-5);
    assert_eq!(stats.ascent, Some(20.0));
    assert_eq!(stats.descent, None);
    assert_eq!(stats.lowest, Some(10.0));
    assert_eq!(stats.highest, Some(30.0));
}
