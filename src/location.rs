use std::fmt;

use serde::{Deserialize, Serialize};

/// A single geographic position in WGS84 degrees.
///
/// `id` is only present when the location was loaded from storage.
/// Coordinates are not range checked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
}

impl Location {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            id: None,
            longitude,
            latitude,
            altitude: None,
        }
    }

    pub fn with_altitude(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            altitude: Some(altitude),
            ..Self::new(longitude, latitude)
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

impl AsRef<Location> for Location {
    fn as_ref(&self) -> &Location {
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "id: {id}")?,
            None => write!(f, "id: [null]")?,
        }
        write!(
            f,
            ", longitude: {:.6}, latitude: {:.6}",
            self.longitude, self.latitude
        )?;
        if let Some(altitude) = self.altitude {
            write!(f, ", altitude: {altitude:.1}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_id_or_altitude() {
        let loc = Location::new(-1.5, 51.25);
        assert_eq!(
            loc.to_string(),
            "id: [null], longitude: -1.500000, latitude: 51.250000"
        );
    }

    #[test]
    fn test_display_with_id_and_altitude() {
        let loc = Location::with_altitude(10.0, 45.0, 123.45).with_id(7);
        assert_eq!(
            loc.to_string(),
            "id: 7, longitude: 10.000000, latitude: 45.000000, altitude: 123.5"
        );
    }

    #[test]
    fn test_deserialize_storage_form() {
        let loc: Location =
            serde_json::from_str(r#"{"id": 3, "lng": 170.5, "lat": -12.0, "altitude": null}"#)
                .unwrap();
        assert_eq!(loc.id, Some(3));
        assert!((loc.longitude - 170.5).abs() < 1e-10);
        assert!((loc.latitude + 12.0).abs() < 1e-10);
        assert!(loc.altitude.is_none());

        let loc: Location = serde_json::from_str(r#"{"lng": 1.0, "lat": 2.0}"#).unwrap();
        assert!(loc.id.is_none());
        assert!(loc.altitude.is_none());
    }
}
