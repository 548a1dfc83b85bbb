use chrono::{DateTime, TimeDelta, Utc};

use crate::geo_math::{bearing_between, distance_between};
use crate::itinerary::{Track, TrackPoint};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

fn hours(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Earliest and latest of a set of timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: DateTime<Utc>,
    pub finish: DateTime<Utc>,
}

impl TimeSpan {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            start: time,
            finish: time,
        }
    }

    pub fn update(&mut self, time: DateTime<Utc>) {
        self.start = self.start.min(time);
        self.finish = self.finish.max(time);
    }

    pub fn from_times<I>(times: I) -> Option<Self>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut times = times.into_iter();
        let mut span = Self::new(times.next()?);
        for time in times {
            span.update(time);
        }
        Some(span)
    }

    pub fn duration(&self) -> TimeDelta {
        self.finish - self.start
    }
}

/// Average speed in km/h between two timestamped points, `None` unless both
/// have a time and the second is later than the first.
pub fn speed_kmh(from: &TrackPoint, to: &TrackPoint) -> Option<f64> {
    let elapsed = hours(to.time? - from.time?);
    if elapsed > 0.0 {
        Some(distance_between(&from.location, &to.location) / elapsed)
    } else {
        None
    }
}

impl Track {
    /// Sets each point's speed and bearing from the previous point in the same
    /// segment. The first point of a segment has neither.
    pub fn calculate_speed_and_bearing_values(&mut self) {
        for segment in &mut self.segments {
            let mut previous: Option<TrackPoint> = None;
            for point in &mut segment.points {
                match &previous {
                    Some(prev) => {
                        point.speed = speed_kmh(prev, point);
                        point.bearing = Some(bearing_between(&prev.location, &point.location));
                    }
                    None => {
                        point.speed = None;
                        point.bearing = None;
                    }
                }
                previous = Some(point.clone());
            }
        }
    }

    /// Highest speed between consecutive points of any segment.
    pub fn maximum_speed(&self) -> Option<f64> {
        self.segments
            .iter()
            .flat_map(|s| s.points.windows(2))
            .filter_map(|pair| speed_kmh(&pair[0], &pair[1]))
            .reduce(f64::max)
    }
}

/// Timing figures for a whole track.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackMotion {
    pub time_span: Option<TimeSpan>,
    /// km/h
    pub maximum_speed: Option<f64>,
    /// km/h over the whole time span
    pub average_speed: Option<f64>,
}

impl TrackMotion {
    /// `distance` is the track's total distance in kilometers.
    pub fn from_track(track: &Track, distance: Option<f64>) -> Self {
        let time_span = TimeSpan::from_times(track.points().filter_map(|p| p.time));
        let average_speed = match (time_span, distance) {
            (Some(span), Some(distance)) => {
                let elapsed = hours(span.duration());
                (elapsed > 0.0).then(|| distance / elapsed)
            }
            _ => None,
        };
        Self {
            time_span,
            maximum_speed: track.maximum_speed(),
            average_speed,
        }
    }
}
