use serde::Serialize;

use crate::location::Location;

/// Axis-aligned extent of a set of locations.
///
/// Extremes are tracked independently per axis, so a box whose points straddle
/// the antimeridian spans the whole globe and its center lies on the far side.
/// Map framing relies on this simple behaviour.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub top_left: Location,
    pub bottom_right: Location,
}

impl BoundingBox {
    pub fn new(seed: &Location) -> Self {
        let corner = Location::new(seed.longitude, seed.latitude);
        Self {
            top_left: corner,
            bottom_right: corner,
        }
    }

    pub fn extend(&mut self, loc: &Location) {
        self.top_left.longitude = self.top_left.longitude.min(loc.longitude);
        self.bottom_right.longitude = self.bottom_right.longitude.max(loc.longitude);
        self.top_left.latitude = self.top_left.latitude.max(loc.latitude);
        self.bottom_right.latitude = self.bottom_right.latitude.min(loc.latitude);
    }

    /// Box enclosing every location, or `None` when there are none.
    pub fn from_locations<'a, I>(locations: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Location>,
    {
        let mut iter = locations.into_iter();
        let mut bbox = Self::new(iter.next()?);
        for loc in iter {
            bbox.extend(loc);
        }
        Some(bbox)
    }

    pub fn center(&self) -> Location {
        Location::new(
            (self.top_left.longitude + self.bottom_right.longitude) / 2.0,
            (self.top_left.latitude + self.bottom_right.latitude) / 2.0,
        )
    }

    /// GeoJSON `[west, south, east, north]` form.
    pub fn bbox(&self) -> Vec<f64> {
        vec![
            self.top_left.longitude,
            self.bottom_right.latitude,
            self.bottom_right.longitude,
            self.top_left.latitude,
        ]
    }
}
