use std::fmt;

use serde::Serialize;

use crate::geo_math;
use crate::location::Location;

/// Aggregate figures for a path. Distance is in kilometers, the altitude
/// figures in meters.
///
/// A field stays `None` until a point contributes to it, so an absent value is
/// distinct from a total of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PathStatistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest: Option<f64>,
}

impl PathStatistics {
    pub fn is_empty(&self) -> bool {
        self.distance.is_none()
            && self.ascent.is_none()
            && self.descent.is_none()
            && self.lowest.is_none()
            && self.highest.is_none()
    }
}

impl fmt::Display for PathStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("distance", self.distance),
            ("ascent", self.ascent),
            ("descent", self.descent),
            ("lowest", self.lowest),
            ("highest", self.highest),
        ];
        let mut first = true;
        for (name, value) in fields {
            if let Some(value) = value {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{name}: {value}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Running position within one logical path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathCursor {
    last_location: Option<Location>,
    /// Altitude of the most recent location that had one.
    last_altitude: Option<f64>,
}

impl PathCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_location(&self) -> Option<&Location> {
        self.last_location.as_ref()
    }

    pub fn last_altitude(&self) -> Option<f64> {
        self.last_altitude
    }
}

fn accumulate(total: &mut Option<f64>, amount: f64) {
    *total = Some(total.map_or(amount, |t| t + amount));
}

/// Folds the change in altitude from the cursor's last altitude into
/// `ascent`/`descent` and remembers `altitude` as the new last altitude.
pub(crate) fn accumulate_altitude_change(
    ascent: &mut Option<f64>,
    descent: &mut Option<f64>,
    last_altitude: &mut Option<f64>,
    altitude: f64,
) {
    if let Some(previous) = *last_altitude {
        let change = altitude - previous;
        if change > 0.0 {
            accumulate(ascent, change);
        } else if change < 0.0 {
            accumulate(descent, change.abs());
        }
    }
    *last_altitude = Some(altitude);
}

pub(crate) fn extend_extremes(lowest: &mut Option<f64>, highest: &mut Option<f64>, altitude: f64) {
    *lowest = Some(lowest.map_or(altitude, |l| l.min(altitude)));
    *highest = Some(highest.map_or(altitude, |h| h.max(altitude)));
}

/// Applies one location to `statistics`, using and advancing `cursor`.
///
/// A location without an altitude leaves the altitude figures and the
/// cursor's last altitude alone, so the next altitude change is measured
/// against the last location that had one.
pub fn update_statistics(
    statistics: &mut PathStatistics,
    cursor: &mut PathCursor,
    loc: &Location,
) {
    if let Some(last) = &cursor.last_location {
        accumulate(&mut statistics.distance, geo_math::distance_between(last, loc));
    }
    cursor.last_location = Some(*loc);

    if let Some(altitude) = loc.altitude {
        accumulate_altitude_change(
            &mut statistics.ascent,
            &mut statistics.descent,
            &mut cursor.last_altitude,
            altitude,
        );
        extend_extremes(&mut statistics.lowest, &mut statistics.highest, altitude);
    }
}

/// Accumulates statistics across a series of paths while also returning the
/// statistics of each individual path.
///
/// Every location is applied twice: once to the caller's path-local figures
/// and once to the running totals held here. The totals therefore include
/// the leg joining the end of one path to the start of the next.
#[derive(Debug, Clone, Default)]
pub struct GeoStatistics {
    totals: PathStatistics,
    cursor: PathCursor,
}

impl GeoStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_location(
        &mut self,
        local: &mut PathStatistics,
        local_cursor: &mut PathCursor,
        loc: &Location,
    ) {
        update_statistics(local, local_cursor, loc);
        update_statistics(&mut self.totals, &mut self.cursor, loc);
    }

    /// Adds the path to the running totals and returns its own statistics.
    pub fn add_path<I>(&mut self, points: I) -> PathStatistics
    where
        I: IntoIterator,
        I::Item: AsRef<Location>,
    {
        let mut local = PathStatistics::default();
        let mut local_cursor = PathCursor::new();
        for point in points {
            self.add_location(&mut local, &mut local_cursor, point.as_ref());
        }
        local
    }

    pub fn totals(&self) -> &PathStatistics {
        &self.totals
    }

    pub fn into_totals(self) -> PathStatistics {
        self.totals
    }

    pub fn distance(&self) -> Option<f64> {
        self.totals.distance
    }

    pub fn ascent(&self) -> Option<f64> {
        self.totals.ascent
    }

    pub fn descent(&self) -> Option<f64> {
        self.totals.descent
    }

    pub fn lowest(&self) -> Option<f64> {
        self.totals.lowest
    }

    pub fn highest(&self) -> Option<f64> {
        self.totals.highest
    }
}

/// Statistics for a single path, computed in one pass.
pub fn path_statistics<I>(points: I) -> PathStatistics
where
    I: IntoIterator,
    I::Item: AsRef<Location>,
{
    let mut statistics = PathStatistics::default();
    let mut cursor = PathCursor::new();
    for point in points {
        update_statistics(&mut statistics, &mut cursor, point.as_ref());
    }
    statistics
}
