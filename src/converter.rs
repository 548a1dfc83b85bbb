use chrono::{DateTime, SecondsFormat, Utc};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Number, Value as JsonValue, json};

use crate::itinerary::*;
use crate::location::Location;
use crate::map_path::{self, MapPathBuilder};
use crate::motion::TrackMotion;
use crate::options::{ConvertOptions, ElementType, Units};
use crate::statistics::PathStatistics;

type Properties = Map<String, JsonValue>;

/// Convert an itinerary to a GeoJSON FeatureCollection.
///
/// Routes and tracks are cut at the antimeridian. When the itinerary has any
/// points the collection carries its bounding box and a `center` member for
/// framing the map.
pub fn to_feature_collection(itinerary: &Itinerary, opts: &ConvertOptions) -> FeatureCollection {
    let mut features = Vec::new();

    if opts.should_include(ElementType::Waypoint) {
        for wpt in &itinerary.waypoints {
            features.push(waypoint_to_feature(wpt, opts));
        }
    }

    if opts.should_include(ElementType::Route) {
        for rte in &itinerary.routes {
            features.extend(route_to_feature(rte, opts));
        }
    }

    if opts.should_include(ElementType::Track) {
        for trk in &itinerary.tracks {
            features.extend(track_to_features(trk, opts));
        }
    }

    let bounding_box = itinerary.bounding_box();
    let foreign_members = bounding_box.map(|bbox| {
        let center = bbox.center();
        let mut members = Map::new();
        members.insert(
            "center".to_string(),
            json!([center.longitude, center.latitude]),
        );
        members
    });

    FeatureCollection {
        bbox: bounding_box.map(|bbox| bbox.bbox()),
        features,
        foreign_members,
    }
}

fn feature(geometry: Geometry, properties: Properties) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn display_location(loc: &Location, opts: &ConvertOptions) -> Location {
    if opts.include_elevation {
        *loc
    } else {
        Location {
            altitude: None,
            ..*loc
        }
    }
}

fn add_display_path<P: AsRef<Location>>(
    builder: &mut MapPathBuilder,
    points: &[P],
    opts: &ConvertOptions,
) {
    builder.add_path(points.iter().map(|p| display_location(p.as_ref(), opts)));
}

fn waypoint_to_feature(wpt: &Waypoint, opts: &ConvertOptions) -> Feature {
    let loc = display_location(&wpt.location, opts);
    let geometry = Geometry::new(Value::Point(map_path::position(&loc)));

    let mut props = gpx_type("waypoint");
    if opts.include_metadata {
        insert_optional(&mut props, "name", &wpt.name);
        insert_optional(&mut props, "cmt", &wpt.comment);
        insert_optional(&mut props, "desc", &wpt.description);
        insert_optional(&mut props, "sym", &wpt.symbol);
        insert_optional(&mut props, "type", &wpt.waypoint_type);
        insert_number(&mut props, "ele", wpt.location.altitude);
        insert_time(&mut props, "time", wpt.time);
    }

    feature(geometry, props)
}

fn route_to_feature(rte: &Route, opts: &ConvertOptions) -> Option<Feature> {
    let mut builder = MapPathBuilder::new();
    add_display_path(&mut builder, &rte.points, opts);
    let geometry = builder.to_geometry()?;

    let mut props = gpx_type("route");
    if opts.include_metadata {
        insert_optional(&mut props, "name", &rte.name);
        insert_optional(&mut props, "cmt", &rte.comment);
        insert_optional(&mut props, "desc", &rte.description);
        insert_optional(&mut props, "type", &rte.route_type);
    }
    if opts.include_statistics {
        insert_statistics(&mut props, &rte.calculate_statistics(), opts.units);
    }

    Some(feature(geometry, props))
}

fn track_to_features(trk: &Track, opts: &ConvertOptions) -> Vec<Feature> {
    let statistics = trk.calculate_statistics();
    let mut annotated = trk.clone();
    annotated.calculate_speed_and_bearing_values();

    if opts.join_track_segments {
        // All segments in one builder: LineString, MultiLineString or Point
        let mut builder = MapPathBuilder::new();
        for segment in &trk.segments {
            add_display_path(&mut builder, &segment.points, opts);
        }
        let Some(geometry) = builder.to_geometry() else {
            return Vec::new();
        };

        let mut props = track_props(trk, opts);
        if opts.include_statistics {
            insert_statistics(&mut props, &statistics.totals, opts.units);
            let motion = TrackMotion::from_track(trk, statistics.totals.distance);
            insert_motion(&mut props, &motion, opts.units);
        }
        let points: Vec<&TrackPoint> = annotated.points().collect();
        insert_coordinate_properties(&mut props, &points, opts);
        return vec![feature(geometry, props)];
    }

    annotated
        .segments
        .iter()
        .zip(&statistics.segments)
        .enumerate()
        .filter_map(|(index, (segment, segment_statistics))| {
            let mut builder = MapPathBuilder::new();
            add_display_path(&mut builder, &segment.points, opts);
            let geometry = builder.to_geometry()?;

            let mut props = track_props(trk, opts);
            props.insert("segment".to_string(), JsonValue::from(index));
            if opts.include_statistics {
                insert_statistics(&mut props, segment_statistics, opts.units);
            }
            let points: Vec<&TrackPoint> = segment.points.iter().collect();
            insert_coordinate_properties(&mut props, &points, opts);
            Some(feature(geometry, props))
        })
        .collect()
}

fn gpx_type(name: &str) -> Properties {
    let mut props = Map::new();
    props.insert("gpxType".to_string(), JsonValue::String(name.to_string()));
    props
}

fn track_props(trk: &Track, opts: &ConvertOptions) -> Properties {
    let mut props = gpx_type("track");
    if opts.include_metadata {
        insert_optional(&mut props, "name", &trk.name);
        insert_optional(&mut props, "cmt", &trk.comment);
        insert_optional(&mut props, "desc", &trk.description);
        insert_optional(&mut props, "type", &trk.track_type);
    }
    props
}

fn insert_statistics(props: &mut Properties, stats: &PathStatistics, units: Units) {
    insert_number(props, "distance", stats.distance.map(|d| units.distance(d)));
    insert_number(props, "ascent", stats.ascent.map(|h| units.height(h)));
    insert_number(props, "descent", stats.descent.map(|h| units.height(h)));
    insert_number(props, "lowest", stats.lowest.map(|h| units.height(h)));
    insert_number(props, "highest", stats.highest.map(|h| units.height(h)));
    props.insert(
        "units".to_string(),
        JsonValue::String(units.name().to_string()),
    );
}

fn insert_motion(props: &mut Properties, motion: &TrackMotion, units: Units) {
    insert_number(props, "maximumSpeed", motion.maximum_speed.map(|s| units.speed(s)));
    insert_number(props, "averageSpeed", motion.average_speed.map(|s| units.speed(s)));
    if let Some(span) = motion.time_span {
        insert_time(props, "startTime", Some(span.start));
        insert_time(props, "finishTime", Some(span.finish));
    }
}

/// Per-point `times`, `hdops`, `speeds` and `bearings` under
/// `coordinateProperties`, with `null` where a point has no value. There is
/// one entry per recorded point, so a path cut at the antimeridian has two
/// more coordinates per crossing than entries.
fn insert_coordinate_properties(
    props: &mut Properties,
    points: &[&TrackPoint],
    opts: &ConvertOptions,
) {
    let mut coordinate_props = Map::new();

    if opts.include_metadata {
        if points.iter().any(|p| p.time.is_some()) {
            let times = points
                .iter()
                .map(|p| p.time.map_or(JsonValue::Null, |t| JsonValue::String(format_time(t))))
                .collect();
            coordinate_props.insert("times".to_string(), JsonValue::Array(times));
        }
        if points.iter().any(|p| p.hdop.is_some()) {
            let hdops = points
                .iter()
                .map(|p| number_or_null(p.hdop.map(f64::from)))
                .collect();
            coordinate_props.insert("hdops".to_string(), JsonValue::Array(hdops));
        }
    }

    if opts.include_statistics {
        let speeds = points
            .iter()
            .map(|p| number_or_null(p.speed.map(|s| opts.units.speed(s))))
            .collect();
        let bearings = points.iter().map(|p| number_or_null(p.bearing)).collect();
        coordinate_props.insert("speeds".to_string(), JsonValue::Array(speeds));
        coordinate_props.insert("bearings".to_string(), JsonValue::Array(bearings));
    }

    if !coordinate_props.is_empty() {
        props.insert(
            "coordinateProperties".to_string(),
            JsonValue::Object(coordinate_props),
        );
    }
}

fn number_or_null(value: Option<f64>) -> JsonValue {
    value
        .and_then(Number::from_f64)
        .map_or(JsonValue::Null, JsonValue::Number)
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn insert_optional(props: &mut Properties, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        props.insert(key.to_string(), JsonValue::String(v.clone()));
    }
}

/// Non-finite values have no JSON representation and are left out.
fn insert_number(props: &mut Properties, key: &str, value: Option<f64>) {
    if let Some(n) = value.and_then(Number::from_f64) {
        props.insert(key.to_string(), JsonValue::Number(n));
    }
}

fn insert_time(props: &mut Properties, key: &str, time: Option<DateTime<Utc>>) {
    if let Some(time) = time {
        props.insert(key.to_string(), JsonValue::String(format_time(time)));
    }
}
