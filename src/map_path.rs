use geojson::{Geometry, Value};
use serde_json::{Value as JsonValue, json};

use crate::location::Location;
use crate::statistics::{accumulate_altitude_change, extend_extremes};

/// Builds map geometry from one or more paths.
///
/// Paths that cross the antimeridian are cut into separate sub-paths which
/// meet at, but do not cross, longitude ±180°, following the antimeridian
/// cutting section of RFC 7946. The overall altitude range and climb of every
/// point added is tracked along the way.
#[derive(Debug, Clone, Default)]
pub struct MapPathBuilder {
    paths: Vec<Vec<Location>>,
    min_height: Option<f64>,
    max_height: Option<f64>,
    ascent: Option<f64>,
    descent: Option<f64>,
    last_altitude: Option<f64>,
}

/// Treats a leg as crossing the antimeridian when one end is east of 90°E and
/// the other west of 90°W.
fn crosses_antimeridian(from: &Location, to: &Location) -> bool {
    (from.longitude > 90.0 && to.longitude < -90.0)
        || (from.longitude < -90.0 && to.longitude > 90.0)
}

/// The pair of points where a crossing leg leaves one side of the antimeridian
/// and enters the other. Latitude is interpolated linearly, which is only exact
/// for legs running along a parallel.
fn antimeridian_points(from: &Location, to: &Location) -> (Location, Location) {
    let side = if from.longitude > 0.0 { 180.0 } else { -180.0 };
    let latitude = (from.latitude + to.latitude) / 2.0;
    let leaving = Location {
        id: None,
        longitude: side,
        latitude,
        altitude: to.altitude,
    };
    let entering = Location {
        longitude: -side,
        ..leaving
    };
    (leaving, entering)
}

pub(crate) fn position(loc: &Location) -> Vec<f64> {
    match loc.altitude {
        Some(altitude) => vec![loc.longitude, loc.latitude, altitude],
        None => vec![loc.longitude, loc.latitude],
    }
}

fn position_json(loc: &Location) -> JsonValue {
    match loc.altitude {
        Some(altitude) => json!([loc.longitude, loc.latitude, altitude]),
        None => json!([loc.longitude, loc.latitude]),
    }
}

/// Gives every coordinate three elements once any of them has an altitude,
/// using `null` where the altitude is missing. Some map clients reject a
/// LineString whose positions differ in length.
fn pad_missing_altitudes(coordinates: &mut [JsonValue]) {
    let has_altitude = coordinates
        .iter()
        .any(|c| c.as_array().is_some_and(|a| a.len() == 3));
    if !has_altitude {
        return;
    }
    for coordinate in coordinates.iter_mut() {
        if let Some(values) = coordinate.as_array_mut() {
            if values.len() == 2 {
                values.push(JsonValue::Null);
            }
        }
    }
}

impl MapPathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn update_altitude_info(&mut self, loc: &Location) {
        if let Some(altitude) = loc.altitude {
            accumulate_altitude_change(
                &mut self.ascent,
                &mut self.descent,
                &mut self.last_altitude,
                altitude,
            );
            extend_extremes(&mut self.min_height, &mut self.max_height, altitude);
        }
    }

    /// Adds a path, splitting it wherever a leg crosses the antimeridian. A
    /// path with one crossing becomes two sub-paths, two crossings three, and
    /// so on.
    pub fn add_path<I>(&mut self, points: I)
    where
        I: IntoIterator,
        I::Item: AsRef<Location>,
    {
        let mut previous: Option<Location> = None;
        let mut current: Vec<Location> = Vec::new();

        for point in points {
            let loc = *point.as_ref();
            self.update_altitude_info(&loc);
            match previous {
                Some(prev) if crosses_antimeridian(&prev, &loc) => {
                    tracing::debug!(from = %prev, to = %loc, "path crosses the antimeridian");
                    let (leaving, entering) = antimeridian_points(&prev, &loc);
                    current.push(leaving);
                    self.paths.push(std::mem::take(&mut current));
                    current.push(entering);
                    current.push(loc);
                }
                _ => current.push(loc),
            }
            previous = Some(loc);
        }

        if !current.is_empty() {
            self.paths.push(current);
        }
    }

    pub fn paths(&self) -> &[Vec<Location>] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn min_height(&self) -> Option<f64> {
        self.min_height
    }

    pub fn max_height(&self) -> Option<f64> {
        self.max_height
    }

    pub fn ascent(&self) -> Option<f64> {
        self.ascent
    }

    pub fn descent(&self) -> Option<f64> {
        self.descent
    }

    /// Typed geometry of the paths added so far, or `None` when there are
    /// none. A single one-point path is a Point, a single longer path a
    /// LineString, and several paths a MultiLineString.
    pub fn to_geometry(&self) -> Option<Geometry> {
        let value = match self.paths.as_slice() {
            [] => return None,
            [path] => match path.as_slice() {
                [point] => Value::Point(position(point)),
                _ => Value::LineString(path.iter().map(position).collect()),
            },
            paths => Value::MultiLineString(
                paths
                    .iter()
                    .map(|path| path.iter().map(position).collect())
                    .collect(),
            ),
        };
        Some(Geometry::new(value))
    }

    /// GeoJSON geometry document for embedding in a page, `null` when no
    /// points have been added.
    ///
    /// Unlike [`to_geometry`](Self::to_geometry), the coordinates of a Point or
    /// LineString are padded to a uniform length.
    pub fn as_geojson(&self) -> JsonValue {
        match self.paths.as_slice() {
            [] => JsonValue::Null,
            [path] => {
                let mut coordinates: Vec<JsonValue> = path.iter().map(position_json).collect();
                pad_missing_altitudes(&mut coordinates);
                match coordinates.as_slice() {
                    [point] => json!({ "type": "Point", "coordinates": point }),
                    _ => json!({ "type": "LineString", "coordinates": coordinates }),
                }
            }
            paths => {
                tracing::debug!(count = paths.len(), "emitting MultiLineString geometry");
                let lines: Vec<Vec<JsonValue>> = paths
                    .iter()
                    .map(|path| path.iter().map(position_json).collect())
                    .collect();
                json!({ "type": "MultiLineString", "coordinates": lines })
            }
        }
    }
}
