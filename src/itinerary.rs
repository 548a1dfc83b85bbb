use chrono::{DateTime, Utc};

use crate::bounding_box::BoundingBox;
use crate::location::Location;
use crate::motion::TimeSpan;
use crate::statistics::{self, GeoStatistics, PathStatistics};

/// Waypoints, routes and tracks belonging to one trip.
#[derive(Debug, Default)]
pub struct Itinerary {
    pub waypoints: Vec<Waypoint>,
    pub routes: Vec<Route>,
    pub tracks: Vec<Track>,
}

/// A named point: either a standalone waypoint or a point on a route.
#[derive(Debug, Clone, Default)]
pub struct Waypoint {
    pub location: Location,
    pub time: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub symbol: Option<String>,
    pub waypoint_type: Option<String>,
}

impl Waypoint {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }
}

impl AsRef<Location> for Waypoint {
    fn as_ref(&self) -> &Location {
        &self.location
    }
}

#[derive(Debug, Clone, Default)]
pub struct Route {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub route_type: Option<String>,
    pub points: Vec<Waypoint>,
}

impl Route {
    pub fn calculate_statistics(&self) -> PathStatistics {
        statistics::path_statistics(&self.points)
    }
}

/// A recorded point. `speed` (km/h) and `bearing` (degrees) are derived from
/// the previous point of the same segment, see
/// [`Track::calculate_speed_and_bearing_values`].
#[derive(Debug, Clone, Default)]
pub struct TrackPoint {
    pub location: Location,
    pub time: Option<DateTime<Utc>>,
    pub hdop: Option<f32>,
    pub speed: Option<f64>,
    pub bearing: Option<f64>,
}

impl TrackPoint {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }

    pub fn at(location: Location, time: DateTime<Utc>) -> Self {
        Self {
            time: Some(time),
            ..Self::new(location)
        }
    }
}

impl AsRef<Location> for TrackPoint {
    fn as_ref(&self) -> &Location {
        &self.location
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrackSegment {
    pub points: Vec<TrackPoint>,
}

impl TrackSegment {
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Track {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub track_type: Option<String>,
    pub segments: Vec<TrackSegment>,
}

/// Statistics of each segment of a track, plus the track as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackStatistics {
    /// Includes the legs joining the end of each segment to the start of the
    /// next.
    pub totals: PathStatistics,
    pub segments: Vec<PathStatistics>,
}

impl Track {
    pub fn new(segments: Vec<TrackSegment>) -> Self {
        Self {
            segments,
            ..Default::default()
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> {
        self.segments.iter().flat_map(|s| s.points.iter())
    }

    pub fn calculate_statistics(&self) -> TrackStatistics {
        let mut engine = GeoStatistics::new();
        let segments = self
            .segments
            .iter()
            .map(|segment| engine.add_path(&segment.points))
            .collect();
        TrackStatistics {
            totals: engine.into_totals(),
            segments,
        }
    }
}

impl Itinerary {
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty() && self.routes.is_empty() && self.tracks.is_empty()
    }

    /// Every location in the itinerary: waypoints, then route points, then
    /// track points.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        let waypoints = self.waypoints.iter().map(|w| &w.location);
        let routes = self
            .routes
            .iter()
            .flat_map(|r| r.points.iter().map(|p| &p.location));
        let tracks = self
            .tracks
            .iter()
            .flat_map(|t| t.points().map(|p| &p.location));
        waypoints.chain(routes).chain(tracks)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_locations(self.locations())
    }

    /// Earliest and latest timestamps of the track points and waypoints.
    pub fn time_span(&self) -> Option<TimeSpan> {
        let track_times = self.tracks.iter().flat_map(|t| t.points().filter_map(|p| p.time));
        let waypoint_times = self.waypoints.iter().filter_map(|w| w.time);
        TimeSpan::from_times(track_times.chain(waypoint_times))
    }
}
